//! Raster output through the `image` crate.

use std::fs;
use std::path::PathBuf;

use glam::Vec4;
use image::{Rgba, RgbaImage};
use polychaos_core::{FrameSnapshot, RenderSettings};
use polychaos_platform::{PointRenderer, Result, Viewport};
use tracing::{debug, info};

use crate::fade::FadeStyle;

const VERTEX_MARKER_HALF: i64 = 2;

pub struct PngRenderer {
    viewport: Viewport,
    fade: FadeStyle,
    point_color: Rgba<u8>,
    vertex_color: Rgba<u8>,
    background: Rgba<u8>,
    frames_dir: Option<PathBuf>,
    final_path: Option<PathBuf>,
    canvas: RgbaImage,
    frames: usize,
}

impl PngRenderer {
    pub fn new(settings: &RenderSettings) -> Self {
        let viewport = Viewport::new(settings.width.max(1), settings.height.max(1));
        Self {
            viewport,
            fade: FadeStyle::from_settings(settings),
            point_color: to_rgba(settings.point_color),
            vertex_color: to_rgba(settings.vertex_color),
            background: to_rgba(settings.background),
            frames_dir: None,
            final_path: None,
            canvas: RgbaImage::new(viewport.width, viewport.height),
            frames: 0,
        }
    }

    /// Writes every frame as `frame_00000.png`, `frame_00001.png`, ... into `dir`.
    pub fn with_frames_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.frames_dir = Some(dir.into());
        self
    }

    /// Writes the last rendered frame to `path` on finish.
    pub fn with_final_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.final_path = Some(path.into());
        self
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames
    }

    fn rasterize(&mut self, frame: &FrameSnapshot) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = self.background;
        }
        for instance in &frame.instances {
            let alpha = self.fade.alpha(instance.age);
            if alpha <= 0.0 {
                continue;
            }
            if let Some((x, y)) = self.viewport.project(instance.position, frame.radius) {
                let pixel = self.canvas.get_pixel_mut(x, y);
                blend(pixel, self.point_color, alpha);
            }
        }
        for vertex in &frame.vertices {
            if let Some((x, y)) = self.viewport.project(*vertex, frame.radius) {
                self.draw_marker(x, y);
            }
        }
    }

    fn draw_marker(&mut self, x: u32, y: u32) {
        let (width, height) = (i64::from(self.viewport.width), i64::from(self.viewport.height));
        for dy in -VERTEX_MARKER_HALF..=VERTEX_MARKER_HALF {
            for dx in -VERTEX_MARKER_HALF..=VERTEX_MARKER_HALF {
                let (px, py) = (i64::from(x) + dx, i64::from(y) + dy);
                if (0..width).contains(&px) && (0..height).contains(&py) {
                    self.canvas.put_pixel(px as u32, py as u32, self.vertex_color);
                }
            }
        }
    }
}

impl PointRenderer for PngRenderer {
    fn name(&self) -> &str {
        "png"
    }

    fn init(&mut self) -> Result<()> {
        if let Some(dir) = &self.frames_dir {
            fs::create_dir_all(dir)?;
            info!("writing frames to {}", dir.display());
        }
        Ok(())
    }

    fn render_frame(&mut self, frame: &FrameSnapshot) -> Result<()> {
        self.rasterize(frame);
        if let Some(dir) = &self.frames_dir {
            let path = dir.join(format!("frame_{:05}.png", self.frames));
            self.canvas.save(&path)?;
            debug!("wrote {}", path.display());
        }
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(path) = &self.final_path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            self.canvas.save(path)?;
            info!("wrote final image {} after {} frames", path.display(), self.frames);
        }
        Ok(())
    }
}

fn to_rgba(color: Vec4) -> Rgba<u8> {
    let scaled = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    Rgba([scaled.x as u8, scaled.y as u8, scaled.z as u8, scaled.w as u8])
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, alpha: f32) {
    let alpha = alpha * f32::from(color[3]) / 255.0;
    for channel in 0..3 {
        let dst = f32::from(pixel[channel]);
        let src = f32::from(color[channel]);
        pixel[channel] = (dst + (src - dst) * alpha).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychaos_core::PointInstance;

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 20,
            height: 20,
            fade_window: 10,
            residual_alpha: 0.0,
            point_color: Vec4::ONE,
            vertex_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            ..RenderSettings::default()
        }
    }

    fn frame(instances: Vec<PointInstance>) -> FrameSnapshot {
        FrameSnapshot {
            tick: 1,
            radius: 1.0,
            exhausted: false,
            vertices: Vec::new(),
            instances,
        }
    }

    #[test]
    fn fresh_points_are_opaque_and_old_ones_vanish() {
        let mut renderer = PngRenderer::new(&settings());
        renderer
            .render_frame(&frame(vec![
                PointInstance { position: [0.0, 0.0], age: 0 },
                PointInstance { position: [0.5, 0.5], age: 5 },
                PointInstance { position: [-0.5, -0.5], age: 50 },
            ]))
            .unwrap();
        assert_eq!(renderer.canvas().get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
        // age 5 of 10 -> half brightness
        assert_eq!(renderer.canvas().get_pixel(15, 5), &Rgba([128, 128, 128, 255]));
        assert_eq!(renderer.canvas().get_pixel(5, 15), &Rgba([0, 0, 0, 255]));
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn vertices_get_markers() {
        let mut renderer = PngRenderer::new(&settings());
        let mut snapshot = frame(Vec::new());
        snapshot.vertices.push([0.0, 0.0]);
        renderer.render_frame(&snapshot).unwrap();
        assert_eq!(renderer.canvas().get_pixel(11, 9), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn writes_frames_and_final_image() {
        let dir = tempfile::tempdir().unwrap();
        let frames_dir = dir.path().join("frames");
        let final_path = dir.path().join("out").join("final.png");
        let mut renderer = PngRenderer::new(&settings())
            .with_frames_dir(&frames_dir)
            .with_final_image(&final_path);
        renderer.init().unwrap();
        renderer.render_frame(&frame(Vec::new())).unwrap();
        renderer.render_frame(&frame(Vec::new())).unwrap();
        renderer.finish().unwrap();
        assert!(frames_dir.join("frame_00000.png").exists());
        assert!(frames_dir.join("frame_00001.png").exists());
        assert!(final_path.exists());
    }
}
