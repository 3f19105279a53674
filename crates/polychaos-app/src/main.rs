use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use polychaos_core::{find_preset, AppSettings, ChaosEngine, ConfigForm, PRESETS};
use polychaos_platform::{FrameSink, PointRenderer};
use polychaos_render::{spawn_render_thread, AsciiRenderer, InlineSink, PngRenderer, SinkSet};

mod cli;
mod driver;
mod logging;

use crate::cli::Cli;
use crate::driver::FrameDriver;

const DEFAULT_OUTPUT: &str = "polychaos.png";
const RENDER_QUEUE_DEPTH: usize = 4;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    info!("Polychaos starting");
    if let Err(e) = run(cli) {
        eprintln!("Polychaos error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.list_presets {
        for preset in PRESETS {
            println!(
                "{:<22} {} vertices, jump ratio {}, {} selection. {}",
                preset.name, preset.vertices, preset.jump_ratio, preset.selection, preset.description
            );
        }
        return Ok(());
    }

    let mut settings = match &cli.config {
        Some(path) => AppSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => AppSettings::default(),
    };
    if let Some(name) = &cli.preset {
        let Some(preset) = find_preset(name) else {
            bail!("unknown preset `{name}` (try --list-presets)");
        };
        info!("using preset {}", preset.name);
        settings.game.vertices = preset.vertices;
        settings.game.jump_ratio = preset.jump_ratio;
        settings.game.selection = preset.selection;
    }
    cli.apply_overrides(&mut settings);

    // Invalid fields fall back to their defaults; the engine only ever sees a validated config.
    let mut form = ConfigForm::default();
    let (config, rejected) = form.submit_or_reset(settings.game.clone());
    if let Some(err) = rejected {
        eprintln!("{err}");
        warn!("continuing with {config}");
    }
    settings.game = form.fields().clone();

    if let Some(path) = &cli.save_config {
        settings
            .save(path)
            .with_context(|| format!("saving settings to {}", path.display()))?;
    }

    let mut engine = match cli.seed {
        Some(seed) => ChaosEngine::seeded(config, seed),
        None => ChaosEngine::from_entropy(config),
    };

    let mut sinks = build_sinks(&cli, &settings);
    let driver = FrameDriver::new(settings.render.steps_per_frame).with_max_frames(cli.max_frames);
    if let Err(e) = ctrlc::set_handler(driver.interrupt_handler()) {
        warn!("Ctrl-C will not stop the run cleanly: {e}");
    }
    let outcome = driver.run(&mut engine, &mut sinks);
    let closed = sinks.close();

    let stats = outcome.map_err(|e| anyhow::anyhow!(e)).context("running the chaos game")?;
    closed.map_err(|e| anyhow::anyhow!(e)).context("finishing renderers")?;
    info!(
        "done: {} points from {} steps over {} frames (exhausted: {}, stopped: {})",
        engine.len(),
        stats.steps,
        stats.frames,
        stats.exhausted,
        stats.stopped
    );
    Ok(())
}

fn build_sinks(cli: &Cli, settings: &AppSettings) -> SinkSet {
    let mut sinks = SinkSet::default();
    let mut renderers: Vec<Box<dyn PointRenderer>> = Vec::new();

    if cli.wants_png() || !cli.ascii {
        let mut png = PngRenderer::new(&settings.render);
        if let Some(dir) = &cli.frames_dir {
            png = png.with_frames_dir(dir);
        }
        let output = match (&cli.output, &cli.frames_dir) {
            (Some(path), _) => Some(path.clone()),
            (None, None) => Some(PathBuf::from(DEFAULT_OUTPUT)),
            (None, Some(_)) => None,
        };
        if let Some(path) = output {
            png = png.with_final_image(path);
        }
        renderers.push(Box::new(png));
    }
    if cli.ascii {
        renderers.push(Box::new(
            AsciiRenderer::new(cli.ascii_columns, cli.ascii_rows, &settings.render)
                .with_writer(Box::new(std::io::stdout())),
        ));
    }

    for renderer in renderers {
        info!(
            "renderer {} on {}",
            renderer.name(),
            if cli.inline { "driver thread" } else { "worker thread" }
        );
        let sink: Box<dyn FrameSink> = if cli.inline {
            Box::new(InlineSink::new(renderer))
        } else {
            Box::new(spawn_render_thread(renderer, RENDER_QUEUE_DEPTH))
        };
        sinks.push(sink);
    }
    sinks
}
