//! Renderers for polychaos snapshots: PNG frames, terminal preview, and a threaded runner.

mod ascii;
mod fade;
mod png;
mod thread;

pub use ascii::AsciiRenderer;
pub use fade::{fade_alpha, FadeStyle};
pub use png::PngRenderer;
pub use thread::{spawn_render_thread, RenderCommand, RenderEvent, RenderThread};

use polychaos_core::FrameSnapshot;
use polychaos_platform::{FrameSink, PointRenderer, Result};
use tracing::debug;

/// Drives a renderer on the caller's thread.
pub struct InlineSink {
    renderer: Box<dyn PointRenderer>,
    initialized: bool,
}

impl InlineSink {
    pub fn new(renderer: Box<dyn PointRenderer>) -> Self {
        Self {
            renderer,
            initialized: false,
        }
    }
}

impl FrameSink for InlineSink {
    fn submit(&mut self, frame: &FrameSnapshot) -> Result<()> {
        if !self.initialized {
            self.renderer.init()?;
            self.initialized = true;
        }
        self.renderer.render_frame(frame)
    }

    fn close(&mut self) -> Result<()> {
        if !self.initialized {
            self.renderer.init()?;
            self.initialized = true;
        }
        debug!("closing inline {} renderer", self.renderer.name());
        self.renderer.finish()
    }
}

/// Fans every frame out to several sinks, stopping at the first error.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn FrameSink>>,
}

impl SinkSet {
    pub fn push(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl FrameSink for SinkSet {
    fn submit(&mut self, frame: &FrameSnapshot) -> Result<()> {
        for sink in &mut self.sinks {
            sink.submit(frame)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
