//! Runs a renderer on its own thread. The driver only ever sends owned snapshots,
//! so the renderer never observes the engine mid-step.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use polychaos_core::FrameSnapshot;
use polychaos_platform::{FrameSink, PointRenderer, Result};
use tracing::{info, warn};

pub enum RenderCommand {
    Frame(FrameSnapshot),
    Finish,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    FrameRendered { tick: u64, points: usize },
    Failed { renderer: String, message: String },
    Finished { frames: usize },
}

pub struct RenderThread {
    command_sender: Sender<RenderCommand>,
    event_receiver: Receiver<RenderEvent>,
    handle: Option<JoinHandle<()>>,
    frames_rendered: usize,
    failure: Option<String>,
}

/// Spawns `renderer` on a worker thread. At most `queue_depth` frames wait in
/// the queue; submitting beyond that blocks the driver.
pub fn spawn_render_thread(mut renderer: Box<dyn PointRenderer>, queue_depth: usize) -> RenderThread {
    let (command_sender, command_receiver) = crossbeam_channel::bounded::<RenderCommand>(queue_depth.max(1));
    let (event_sender, event_receiver) = crossbeam_channel::unbounded::<RenderEvent>();

    let handle = std::thread::spawn(move || {
        let name = renderer.name().to_string();
        if let Err(e) = renderer.init() {
            let _ = event_sender.send(RenderEvent::Failed {
                renderer: name,
                message: e.to_string(),
            });
            return;
        }
        info!("render thread: {name} ready");
        let mut frames = 0;
        while let Ok(command) = command_receiver.recv() {
            match command {
                RenderCommand::Frame(frame) => match renderer.render_frame(&frame) {
                    Ok(()) => {
                        frames += 1;
                        let _ = event_sender.send(RenderEvent::FrameRendered {
                            tick: frame.tick,
                            points: frame.len(),
                        });
                    }
                    Err(e) => {
                        warn!("render thread: {name} failed on tick {}: {e}", frame.tick);
                        let _ = event_sender.send(RenderEvent::Failed {
                            renderer: name,
                            message: e.to_string(),
                        });
                        return;
                    }
                },
                RenderCommand::Finish => break,
            }
        }
        match renderer.finish() {
            Ok(()) => {
                info!("render thread: {name} finished after {frames} frames");
                let _ = event_sender.send(RenderEvent::Finished { frames });
            }
            Err(e) => {
                let _ = event_sender.send(RenderEvent::Failed {
                    renderer: name,
                    message: e.to_string(),
                });
            }
        }
    });

    RenderThread {
        command_sender,
        event_receiver,
        handle: Some(handle),
        frames_rendered: 0,
        failure: None,
    }
}

impl RenderThread {
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    fn drain_events(&mut self) {
        for event in self.event_receiver.try_iter() {
            match event {
                RenderEvent::FrameRendered { .. } => self.frames_rendered += 1,
                RenderEvent::Failed { renderer, message } => {
                    self.failure = Some(format!("{renderer} renderer failed: {message}"));
                }
                RenderEvent::Finished { frames } => self.frames_rendered = frames,
            }
        }
    }

    fn failure_result(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

impl FrameSink for RenderThread {
    fn submit(&mut self, frame: &FrameSnapshot) -> Result<()> {
        self.drain_events();
        self.failure_result()?;
        if self
            .command_sender
            .send(RenderCommand::Frame(frame.clone()))
            .is_err()
        {
            self.drain_events();
            self.failure_result()?;
            return Err("render thread stopped".into());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return self.failure_result();
        };
        let _ = self.command_sender.send(RenderCommand::Finish);
        if handle.join().is_err() {
            self.failure = Some("render thread panicked".to_string());
        }
        self.drain_events();
        self.failure_result()
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.close() {
                warn!("render thread closed with error: {e}");
            }
        }
    }
}
