//! Renderer abstraction traits so `polychaos-core` stays output-agnostic.

use polychaos_core::FrameSnapshot;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Pixel area a renderer draws into. World space is the square `[-radius, radius]²`
/// centred on the origin, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Maps a world point onto a pixel, or `None` if it falls outside.
    pub fn project(&self, point: [f32; 2], radius: f64) -> Option<(u32, u32)> {
        if self.width == 0 || self.height == 0 || radius <= 0.0 {
            return None;
        }
        let radius = radius as f32;
        let u = (point[0] + radius) / (2.0 * radius);
        let v = (radius - point[1]) / (2.0 * radius);
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        Some((x, y))
    }
}

/// Draws engine snapshots. Implementations own their output (files, terminal, GPU).
pub trait PointRenderer: Send {
    fn name(&self) -> &str;
    fn init(&mut self) -> Result<()> {
        Ok(())
    }
    fn render_frame(&mut self, frame: &FrameSnapshot) -> Result<()>;
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Where the frame driver hands snapshots at step boundaries.
pub trait FrameSink {
    fn submit(&mut self, frame: &FrameSnapshot) -> Result<()>;
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_maps_corners_and_centre() {
        let viewport = Viewport::new(100, 50);
        assert_eq!(viewport.project([-1.0, 1.0], 1.0), Some((0, 0)));
        assert_eq!(viewport.project([1.0, -1.0], 1.0), Some((99, 49)));
        assert_eq!(viewport.project([0.0, 0.0], 1.0), Some((50, 25)));
    }

    #[test]
    fn project_rejects_outside_points() {
        let viewport = Viewport::new(10, 10);
        assert_eq!(viewport.project([1.5, 0.0], 1.0), None);
        assert_eq!(viewport.project([0.0, 0.0], 0.0), None);
        assert_eq!(Viewport::new(0, 10).project([0.0, 0.0], 1.0), None);
    }
}
