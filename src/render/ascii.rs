//! Character-grid surface.
//!
//! Rasterizes frames by sampling each cell's center against the draw list,
//! last command wins. Useful for terminals and snapshot tests.

use std::io::Write;

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use super::{Frame, Paint, RenderError, Renderer};

/// Default grid width in cells.
pub const DEFAULT_COLUMNS: usize = 96;

/// Default grid height in cells.
pub const DEFAULT_ROWS: usize = 24;

fn glyph(paint: Paint) -> char {
    match paint {
        Paint::Background => ' ',
        Paint::Sky => '.',
        Paint::Ground => '#',
        Paint::Platform => '=',
        Paint::FlagPole => '|',
        Paint::Banner => '>',
        Paint::Coin => 'o',
        Paint::Body | Paint::Leg => 'M',
        Paint::Face => '@',
        Paint::Eye => '*',
        Paint::Shadow => '_',
        Paint::Glow => '+',
    }
}

/// Writes frames as text to any `io::Write`.
pub struct AsciiRenderer<W: Write + Send> {
    out: W,
    columns: usize,
    rows: usize,
    clear_screen: bool,
}

impl<W: Write + Send> AsciiRenderer<W> {
    pub fn new(out: W) -> Self {
        Self::with_size(out, DEFAULT_COLUMNS, DEFAULT_ROWS)
    }

    pub fn with_size(out: W, columns: usize, rows: usize) -> Self {
        Self {
            out,
            columns: columns.max(1),
            rows: rows.max(1),
            clear_screen: false,
        }
    }

    /// Home the cursor and clear the terminal before each frame.
    pub fn clear_screen(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Rasterize a frame into rows of characters.
    pub fn rasterize(&self, frame: &Frame) -> Vec<String> {
        let cell_w = frame.width / self.columns as Fixed;
        let cell_h = frame.height / self.rows as Fixed;
        let mut grid = vec![vec![' '; self.columns]; self.rows];

        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let sample = FixedVec2::new(
                    col as Fixed * cell_w + cell_w / 2,
                    row as Fixed * cell_h + cell_h / 2,
                );
                for cmd in &frame.commands {
                    if !cmd.shape.covers(sample) {
                        continue;
                    }
                    if cmd.paint.is_overlay() && *cell != ' ' && *cell != '.' {
                        continue;
                    }
                    *cell = glyph(cmd.paint);
                }
            }
        }

        grid.into_iter().map(|line| line.into_iter().collect()).collect()
    }

    fn status_line(frame: &Frame) -> String {
        let hud = &frame.hud;
        let flag = if hud.flag_reached { "reached" } else { "ahead" };
        format!(
            "tick {:>6}  coins {}/{}  flag {}",
            hud.tick, hud.coins, hud.total_coins, flag
        )
    }
}

impl<W: Write + Send> Renderer for AsciiRenderer<W> {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let lines = self.rasterize(frame);
        if self.clear_screen {
            write!(self.out, "\x1b[H\x1b[2J")?;
        }
        for line in &lines {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "{}", Self::status_line(frame))?;
        self.out.flush()?;
        Ok(())
    }
}
