use std::path::PathBuf;

use clap::Parser;
use polychaos_core::{AppSettings, SelectionRule};

#[derive(Parser, Debug)]
#[command(name = "polychaos")]
#[command(version)]
#[command(about = "Polygon chaos-game generator", long_about = None)]
pub struct Cli {
    /// Settings file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start from a named preset (see --list-presets)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Print the built-in presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Number of polygon vertices, 3 to 12
    #[arg(short = 'n', long)]
    pub vertices: Option<i64>,

    /// Divisor applied on every jump, 2 to 12
    #[arg(short = 'j', long)]
    pub jump_ratio: Option<i64>,

    /// Number of points to generate before stopping
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Radius of the circle the vertices sit on
    #[arg(long)]
    pub radius: Option<f64>,

    /// Vertex selection rule: uniform, no-repeat or no-neighbor
    #[arg(long)]
    pub selection: Option<SelectionRule>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Engine steps between two rendered frames
    #[arg(long)]
    pub steps_per_frame: Option<usize>,

    /// Stop after this many frames even if the engine is still running
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Ticks until a point fades out, 0 disables fading
    #[arg(long)]
    pub fade_window: Option<u32>,

    /// Alpha kept by fully faded points, useful for still images
    #[arg(long)]
    pub residual_alpha: Option<f32>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Final PNG image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory receiving one PNG per frame
    #[arg(long)]
    pub frames_dir: Option<PathBuf>,

    /// Print every frame to the terminal
    #[arg(long)]
    pub ascii: bool,

    #[arg(long, default_value = "64")]
    pub ascii_columns: u32,

    #[arg(long, default_value = "32")]
    pub ascii_rows: u32,

    /// Render on the driver thread instead of a worker thread
    #[arg(long)]
    pub inline: bool,

    /// Write the effective settings to this file
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Flags given on the command line override file and preset values.
    pub fn apply_overrides(&self, settings: &mut AppSettings) {
        let game = &mut settings.game;
        if let Some(vertices) = self.vertices {
            game.vertices = vertices;
        }
        if let Some(jump_ratio) = self.jump_ratio {
            game.jump_ratio = jump_ratio as f64;
        }
        if let Some(capacity) = self.capacity {
            game.capacity = capacity;
        }
        if let Some(radius) = self.radius {
            game.radius = radius;
        }
        if let Some(selection) = self.selection {
            game.selection = selection;
        }

        let render = &mut settings.render;
        if let Some(steps) = self.steps_per_frame {
            render.steps_per_frame = steps;
        }
        if let Some(fade_window) = self.fade_window {
            render.fade_window = fade_window;
        }
        if let Some(residual_alpha) = self.residual_alpha {
            render.residual_alpha = residual_alpha;
        }
        if let Some(width) = self.width {
            render.width = width;
        }
        if let Some(height) = self.height {
            render.height = height;
        }
    }

    pub fn wants_png(&self) -> bool {
        self.output.is_some() || self.frames_dir.is_some()
    }
}
