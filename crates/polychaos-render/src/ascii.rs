//! Terminal preview: one character cell per block of the viewport.

use std::io::Write;

use polychaos_core::{FrameSnapshot, RenderSettings};
use polychaos_platform::{PointRenderer, Result, Viewport};

use crate::fade::FadeStyle;

const RAMP: &[u8] = b" .:-=+*#%@";
const VERTEX_GLYPH: char = 'O';
const MAX_GRID_SIDE: u32 = 1024;

pub struct AsciiRenderer {
    grid: Viewport,
    fade: FadeStyle,
    cells: Vec<f32>,
    last_frame: String,
    out: Option<Box<dyn Write + Send>>,
}

impl AsciiRenderer {
    pub fn new(columns: u32, rows: u32, settings: &RenderSettings) -> Self {
        let grid = Viewport::new(
            columns.clamp(1, MAX_GRID_SIDE),
            rows.clamp(1, MAX_GRID_SIDE),
        );
        Self {
            grid,
            fade: FadeStyle::from_settings(settings),
            cells: vec![0.0; grid.width as usize * grid.height as usize],
            last_frame: String::new(),
            out: None,
        }
    }

    /// Also print every frame to `out`.
    pub fn with_writer(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = Some(out);
        self
    }

    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }

    fn compose(&mut self, frame: &FrameSnapshot) {
        self.cells.iter_mut().for_each(|cell| *cell = 0.0);
        let columns = self.grid.width as usize;
        for instance in &frame.instances {
            if let Some((x, y)) = self.grid.project(instance.position, frame.radius) {
                let cell = &mut self.cells[y as usize * columns + x as usize];
                *cell = cell.max(self.fade.alpha(instance.age));
            }
        }

        let mut vertex_cells = Vec::with_capacity(frame.vertices.len());
        for vertex in &frame.vertices {
            if let Some((x, y)) = self.grid.project(*vertex, frame.radius) {
                vertex_cells.push(y as usize * columns + x as usize);
            }
        }

        self.last_frame.clear();
        for (index, alpha) in self.cells.iter().enumerate() {
            if vertex_cells.contains(&index) {
                self.last_frame.push(VERTEX_GLYPH);
            } else {
                let level = (alpha * (RAMP.len() - 1) as f32).round() as usize;
                self.last_frame.push(RAMP[level.min(RAMP.len() - 1)] as char);
            }
            if (index + 1) % columns == 0 {
                self.last_frame.push('\n');
            }
        }
    }
}

impl PointRenderer for AsciiRenderer {
    fn name(&self) -> &str {
        "ascii"
    }

    fn render_frame(&mut self, frame: &FrameSnapshot) -> Result<()> {
        self.compose(frame);
        if let Some(out) = self.out.as_mut() {
            writeln!(out, "tick {} ({} points)", frame.tick, frame.len())?;
            out.write_all(self.last_frame.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }
}
