//! The clock face shown while no message is queued.

use std::sync::Arc;
use std::time::Duration;

use super::font::{self, Font};
use super::{Frame, Panel};
use crate::clock::{Clock, Pacer};
use crate::display::{Display, DisplayError};
use crate::settings::{Mode, Settings};

/// Dwell after each idle frame; this sets the blink rate of the separator.
pub const DEFAULT_IDLE_DWELL: Duration = Duration::from_millis(500);

/// Column positions of the clock face, derived from the font advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockLayout {
    pub hour_x: i32,
    pub separator_x: i32,
    pub minute_x: i32,
    pub y: i32,
    /// First column available to the status line.
    pub status_x: i32,
}

impl ClockLayout {
    pub fn new(font: &dyn Font, panel: Panel) -> Self {
        let advance = font.advance('0').unwrap_or(font::FALLBACK_ADVANCE) as i32;
        let y = (panel.height.saturating_sub(font.height()) / 2) as i32;
        Self {
            hour_x: 0,
            separator_x: 2 * advance,
            minute_x: 3 * advance,
            y,
            status_x: 5 * advance + 1,
        }
    }
}

pub struct IdleRenderer {
    font: Arc<dyn Font>,
    clock: Arc<dyn Clock>,
    pacer: Arc<dyn Pacer>,
    dwell: Duration,
}

impl IdleRenderer {
    pub fn new(font: Arc<dyn Font>, clock: Arc<dyn Clock>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            font,
            clock,
            pacer,
            dwell: DEFAULT_IDLE_DWELL,
        }
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }

    /// Compose the idle frame. `None` means the panel should be blank.
    ///
    /// `settings` is only read; an unsupported degree glyph in the status
    /// line is substituted for this frame and the stored text is untouched.
    pub fn compose(&self, panel: Panel, toggle: bool, settings: &Settings) -> Option<Frame> {
        if settings.mode == Mode::Off {
            return None;
        }

        let font = self.font.as_ref();
        let layout = ClockLayout::new(font, panel);
        let (hour, minute) = self.clock.hour_minute();

        let mut frame = Frame::new(panel);
        font.draw(&mut frame, layout.hour_x, layout.y, &format!("{hour:02}"));
        if toggle {
            font.draw(&mut frame, layout.separator_x, layout.y, ":");
        }
        font.draw(&mut frame, layout.minute_x, layout.y, &format!("{minute:02}"));

        if let Some(status) = settings.status_message.as_deref() {
            let region = panel.width() as i32 - layout.status_x;
            if region > 0 {
                let status = font::single_line(status);
                let text = font::substitute_unsupported(font, &status);
                let width = font::text_width(font, &text) as i32;
                // Centered when it fits, otherwise left-aligned and clipped.
                let x = layout.status_x + ((region - width) / 2).max(0);
                font.draw(&mut frame, x, layout.y, &text);
            }
        }
        Some(frame)
    }

    /// Draw one idle frame, then dwell.
    ///
    /// The dwell happens even when the sink fails, so a broken panel is
    /// retried at the normal idle rate.
    pub fn render<D: Display>(
        &self,
        display: &mut D,
        toggle: bool,
        settings: &Settings,
    ) -> Result<(), DisplayError> {
        let result = self.draw(display, toggle, settings);
        self.pacer.pause(self.dwell);
        result
    }

    fn draw<D: Display>(
        &self,
        display: &mut D,
        toggle: bool,
        settings: &Settings,
    ) -> Result<(), DisplayError> {
        display.set_contrast(settings.contrast)?;
        match self.compose(display.panel(), toggle, settings) {
            Some(frame) => display.flush(&frame),
            None => display.clear(),
        }
    }
}
