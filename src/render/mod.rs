//! Frame composition for the LED panel.
//!
//! Every frame is a full bitmap of the panel. Renderers build one from
//! scratch each step and hand it to a [`crate::display::Display`]; nothing is
//! drawn incrementally.

pub mod font;
pub mod idle;
pub mod scroll;

use std::fmt;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use serde::{Deserialize, Serialize};

pub use font::{Font, MonoFace};
pub use idle::IdleRenderer;
pub use scroll::{AnimationEngine, ScrollOutcome, ScrollPlan};

/// Geometry of a row of cascaded matrix modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Panel {
    /// Number of cascaded modules.
    pub modules: u32,
    /// Pixel columns per module.
    pub module_width: u32,
    /// Pixel rows.
    pub height: u32,
}

impl Panel {
    pub const fn new(modules: u32, module_width: u32, height: u32) -> Self {
        Self {
            modules,
            module_width,
            height,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.modules * self.module_width
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new(4, 8, 8)
    }
}

/// A full bitmap snapshot of the panel.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Frame {
    /// All-off frame covering the panel.
    pub fn new(panel: Panel) -> Self {
        Self::blank(panel.width(), panel.height)
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }

    /// Off-panel coordinates read as unlit.
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Off-panel coordinates are clipped.
    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = on;
        }
    }

    pub fn is_blank(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    /// Number of lit pixels.
    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Whether any pixel in columns `x0..x1` is lit.
    pub fn any_lit_in_columns(&self, x0: i32, x1: i32) -> bool {
        (x0..x1).any(|x| (0..self.height as i32).any(|y| self.get(x, y)))
    }

    /// Leftmost and rightmost lit columns.
    pub fn lit_column_span(&self) -> Option<(i32, i32)> {
        let lit: Vec<i32> = (0..self.width as i32)
            .filter(|&x| self.any_lit_in_columns(x, x + 1))
            .collect();
        Some((*lit.first()?, *lit.last()?))
    }

    /// Topmost and bottommost lit rows.
    pub fn lit_row_span(&self) -> Option<(i32, i32)> {
        let lit: Vec<i32> = (0..self.height as i32)
            .filter(|&y| (0..self.width as i32).any(|x| self.get(x, y)))
            .collect();
        Some((*lit.first()?, *lit.last()?))
    }
}

/// One text row per pixel row, `#` for lit and `.` for dark.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                f.write_str(if self.get(x, y) { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frame {}x{}", self.width, self.height)?;
        fmt::Display::fmt(self, f)
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}
