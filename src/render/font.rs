//! Bitmap fonts for the panel.
//!
//! Glyph data comes from the `embedded-graphics` mono fonts. The renderers
//! only see the [`Font`] trait: glyph advances for measuring, a coverage
//! check for substitution, and a draw call onto a [`Frame`].

use std::borrow::Cow;

use embedded_graphics::mono_font::{ascii, iso_8859_1, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use super::Frame;

/// Width assumed for a glyph whose metrics are unknown.
pub const FALLBACK_ADVANCE: u32 = 8;

/// Default font name.
pub const DEFAULT_FONT: &str = "4x6";

/// Characters that read as a degree sign.
const DEGREE_LIKE: &[char] = &['°', '˚', 'º', '⁰'];

/// Replacements for a degree sign, best first.
const DEGREE_FALLBACKS: &[char] = &['°', 'o'];

pub trait Font: Send + Sync {
    /// Glyph cell height in pixels.
    fn height(&self) -> u32;

    /// Horizontal advance of `c`, or `None` when the font has no metrics for it.
    fn advance(&self, c: char) -> Option<u32>;

    fn has_glyph(&self, c: char) -> bool;

    /// Draw `text` with its top-left corner at `(x, y)`. Pixels off the frame are clipped.
    fn draw(&self, frame: &mut Frame, x: i32, y: i32, text: &str);
}

/// Pixel width of `text`: the sum of per-glyph advances.
pub fn text_width(font: &dyn Font, text: &str) -> u32 {
    text.chars()
        .map(|c| font.advance(c).unwrap_or(FALLBACK_ADVANCE))
        .sum()
}

/// Flatten `text` onto one row: line breaks and other control characters
/// become spaces.
pub fn single_line(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Replace degree-like characters the font cannot draw with one it can.
///
/// Other unsupported characters are left alone; the font draws its own
/// replacement glyph for those.
pub fn substitute_unsupported<'a>(font: &dyn Font, text: &'a str) -> Cow<'a, str> {
    if text.chars().all(|c| font.has_glyph(c)) {
        return Cow::Borrowed(text);
    }

    let degree = DEGREE_FALLBACKS
        .iter()
        .copied()
        .find(|&c| font.has_glyph(c))
        .unwrap_or('o');

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if font.has_glyph(c) => out.push(c),
            c if DEGREE_LIKE.contains(&c) => out.push(degree),
            '℃' => {
                out.push(degree);
                out.push('C');
            }
            '℉' => {
                out.push(degree);
                out.push('F');
            }
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// A monospaced `embedded-graphics` font.
#[derive(Clone, Copy)]
pub struct MonoFace {
    name: &'static str,
    font: &'static MonoFont<'static>,
}

impl std::fmt::Debug for MonoFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonoFace")
            .field("name", &self.name)
            .field("size", &self.font.character_size)
            .finish()
    }
}

impl MonoFace {
    /// Names accepted by [`MonoFace::by_name`].
    pub const NAMES: &'static [&'static str] =
        &["4x6", "5x7", "5x8", "6x9", "ascii-4x6", "ascii-5x8"];

    /// Look up a font by config name. The plain names cover ISO-8859-1,
    /// the `ascii-` ones only printable ASCII.
    pub fn by_name(name: &str) -> Option<Self> {
        let font: &'static MonoFont<'static> = match name {
            "4x6" => &iso_8859_1::FONT_4X6,
            "5x7" => &iso_8859_1::FONT_5X7,
            "5x8" => &iso_8859_1::FONT_5X8,
            "6x9" => &iso_8859_1::FONT_6X9,
            "ascii-4x6" => &ascii::FONT_4X6,
            "ascii-5x8" => &ascii::FONT_5X8,
            _ => return None,
        };
        let name = Self::NAMES.iter().copied().find(|n| *n == name)?;
        Some(Self { name, font })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for MonoFace {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT,
            font: &iso_8859_1::FONT_4X6,
        }
    }
}

impl Font for MonoFace {
    fn height(&self) -> u32 {
        self.font.character_size.height
    }

    fn advance(&self, _c: char) -> Option<u32> {
        Some(self.font.character_size.width + self.font.character_spacing)
    }

    fn has_glyph(&self, c: char) -> bool {
        // Unmapped characters share the index of the replacement glyph `?`.
        let mapping = self.font.glyph_mapping;
        c == '?' || mapping.index(c) != mapping.index('?')
    }

    fn draw(&self, frame: &mut Frame, x: i32, y: i32, text: &str) {
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(frame);
    }
}
