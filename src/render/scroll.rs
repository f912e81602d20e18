//! Scrolling-message animation.
//!
//! A command is turned into a [`ScrollPlan`]: the decorated text, the
//! resolved delay/contrast/direction, a start position and a step count.
//! [`AnimationEngine::render`] then walks the plan one pixel per step,
//! pausing `delay` after each frame. There is no frame dropping; a slow sink
//! simply makes the scroll take longer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{trace, warn};

use super::font::{self, Font};
use super::Panel;
use crate::clock::Pacer;
use crate::command::Command;
use crate::display::Display;
use crate::settings::{ScrollDirection, Settings};

/// Steps for a bottom-to-top scroll, independent of the text length.
pub const VERTICAL_SCROLL_STEPS: u32 = 17;

/// Everything needed to animate one command.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollPlan {
    pub text: String,
    pub direction: ScrollDirection,
    pub delay: Duration,
    pub contrast: u8,
    pub text_width: u32,
    /// Position of the text's top-left corner on the first step.
    pub start: (i32, i32),
    pub steps: u32,
}

impl ScrollPlan {
    /// Top-left corner of the text on `step` (0-based).
    pub fn position(&self, step: u32) -> (i32, i32) {
        let (x, y) = self.start;
        match self.direction {
            ScrollDirection::LeftToRight => (x - step as i32, y),
            ScrollDirection::BottomToTop => (x, y - step as i32),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOutcome {
    /// Frames the sink accepted.
    pub frames: u32,
    /// Frames the sink rejected; these were skipped.
    pub failed_frames: u32,
    /// The command to queue again, if it has repeats left.
    pub repeat: Option<Command>,
}

pub struct AnimationEngine {
    font: Arc<dyn Font>,
    pacer: Arc<dyn Pacer>,
    decorate: bool,
}

impl AnimationEngine {
    pub fn new(font: Arc<dyn Font>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            font,
            pacer,
            decorate: true,
        }
    }

    /// Whether messages are framed as `+ message +`.
    pub fn with_decoration(mut self, decorate: bool) -> Self {
        self.decorate = decorate;
        self
    }

    /// Resolve a command against the settings snapshot taken when it is drawn.
    pub fn plan(&self, panel: Panel, command: &Command, settings: &Settings) -> ScrollPlan {
        let font = self.font.as_ref();
        let delay_secs = command.scroll_delay.unwrap_or(settings.scroll_delay);
        let contrast = command.contrast.unwrap_or(settings.contrast);
        let direction = command.scroll_direction.unwrap_or(settings.scroll_direction);

        let message = font::single_line(&command.message);
        let trimmed = message.trim();
        let text = if self.decorate {
            format!("+ {trimmed} +")
        } else {
            trimmed.to_string()
        };
        let text = font::substitute_unsupported(font, &text).into_owned();
        let text_width = font::text_width(font, &text);

        let width = panel.width();
        let height = panel.height;
        let (start, steps) = match direction {
            ScrollDirection::LeftToRight => {
                let y = (height.saturating_sub(font.height()) / 2) as i32;
                ((width as i32, y), text_width + width)
            }
            ScrollDirection::BottomToTop => {
                let x = (width.saturating_sub(text_width) / 2) as i32;
                ((x, height as i32 - 1), VERTICAL_SCROLL_STEPS)
            }
        };

        ScrollPlan {
            text,
            direction,
            delay: Duration::try_from_secs_f64(delay_secs).unwrap_or_default(),
            contrast,
            text_width,
            start,
            steps,
        }
    }

    /// Animate `command` to completion on `display`.
    ///
    /// A frame the sink rejects is logged and skipped; the animation carries
    /// on with the next step.
    pub fn render<D: Display>(
        &self,
        display: &mut D,
        command: &Command,
        settings: &Settings,
    ) -> ScrollOutcome {
        let plan = self.plan(display.panel(), command, settings);
        trace!(
            "Scrolling {:?} {} over {} steps at {:?}",
            plan.text,
            plan.direction.as_str(),
            plan.steps,
            plan.delay
        );

        if let Err(e) = display.set_contrast(plan.contrast) {
            warn!("Failed to set contrast {}: {}", plan.contrast, e);
        }

        let mut frames = 0;
        let mut failed_frames = 0;
        for step in 0..plan.steps {
            let (x, y) = plan.position(step);
            match display.canvas(|frame| self.font.draw(frame, x, y, &plan.text)) {
                Ok(()) => frames += 1,
                Err(e) => {
                    failed_frames += 1;
                    warn!("Skipped scroll frame {}/{}: {}", step + 1, plan.steps, e);
                }
            }
            self.pacer.pause(plan.delay);
        }

        ScrollOutcome {
            frames,
            failed_frames,
            repeat: command.next_repeat(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::RecordingPacer;
    use crate::display::{DisplayEvent, RecordingDisplay};
    use crate::render::MonoFace;

    fn engine(pacer: &RecordingPacer) -> AnimationEngine {
        AnimationEngine::new(Arc::new(MonoFace::default()), Arc::new(pacer.clone()))
    }

    #[test]
    fn left_to_right_plan() {
        let e = engine(&RecordingPacer::new());
        let plan = e.plan(Panel::default(), &Command::new("Hi"), &Settings::default());
        assert_eq!(plan.text, "+ Hi +");
        assert_eq!(plan.text_width, 24);
        assert_eq!(plan.start, (32, 1));
        assert_eq!(plan.steps, 24 + 32);
        assert_eq!(plan.delay, Duration::from_millis(50));
        assert_eq!(plan.contrast, Settings::default().contrast);
        assert_eq!(plan.position(0), (32, 1));
        assert_eq!(plan.position(55), (-23, 1));
    }

    #[test]
    fn overrides_win_over_settings() {
        let e = engine(&RecordingPacer::new());
        let mut cmd = Command::new("x");
        cmd.scroll_delay = Some(0.2);
        cmd.contrast = Some(9);
        cmd.scroll_direction = Some(ScrollDirection::BottomToTop);
        let plan = e.plan(Panel::default(), &cmd, &Settings::default());
        assert_eq!(plan.delay, Duration::from_millis(200));
        assert_eq!(plan.contrast, 9);
        assert_eq!(plan.direction, ScrollDirection::BottomToTop);
    }

    #[test]
    fn bottom_to_top_is_centered_with_fixed_steps() {
        let e = engine(&RecordingPacer::new());
        let settings = Settings {
            scroll_direction: ScrollDirection::BottomToTop,
            ..Settings::default()
        };
        let short = e.plan(Panel::default(), &Command::new("Hi"), &settings);
        assert_eq!(short.start, (4, 7));
        assert_eq!(short.steps, VERTICAL_SCROLL_STEPS);
        assert_eq!(short.position(16), (4, -9));

        let long = e.plan(Panel::default(), &Command::new("a much longer message"), &settings);
        assert_eq!(long.steps, VERTICAL_SCROLL_STEPS);
        assert_eq!(long.start.0, 0);
    }

    #[test]
    fn empty_message_keeps_markers() {
        let e = engine(&RecordingPacer::new());
        let plan = e.plan(Panel::default(), &Command::new("   "), &Settings::default());
        assert_eq!(plan.text, "+  +");
    }

    #[test]
    fn multi_line_message_scrolls_on_one_row() {
        let e = engine(&RecordingPacer::new());
        let cmd = Command::new("Hello\r\nWorld");
        let plan = e.plan(Panel::default(), &cmd, &Settings::default());
        assert_eq!(plan.text, "+ Hello  World +");

        let mut display = RecordingDisplay::default();
        e.render(&mut display, &cmd, &Settings::default());
        let (top, bottom) = (plan.start.1, plan.start.1 + 6 - 1);
        for frame in display.frames() {
            if let Some((first, last)) = frame.lit_row_span() {
                assert!(first >= top && last <= bottom, "rows {first}..={last}");
            }
        }
    }

    #[test]
    fn decoration_can_be_disabled() {
        let e = engine(&RecordingPacer::new()).with_decoration(false);
        let plan = e.plan(Panel::default(), &Command::new(" Hi "), &Settings::default());
        assert_eq!(plan.text, "Hi");
        assert_eq!(plan.steps, 8 + 32);
    }

    #[test]
    fn render_draws_every_step_and_paces() {
        let pacer = RecordingPacer::new();
        let e = engine(&pacer);
        let mut display = RecordingDisplay::default();
        let outcome = e.render(&mut display, &Command::new("Hi"), &Settings::default());

        assert_eq!(outcome.frames, 56);
        assert_eq!(outcome.failed_frames, 0);
        assert!(outcome.repeat.is_none());

        let events = display.events();
        assert_eq!(events[0], DisplayEvent::Contrast(Settings::default().contrast));
        assert_eq!(events.len(), 57);
        assert_eq!(pacer.pauses(), vec![Duration::from_millis(50); 56]);

        // Enters from the right edge, leaves past the left edge.
        let frames = display.frames();
        assert!(frames[0].is_blank());
        assert!(frames[1].any_lit_in_columns(31, 32) || frames[2].any_lit_in_columns(30, 32));
        assert!(frames[55].is_blank() || !frames[55].any_lit_in_columns(2, 32));
    }

    #[test]
    fn text_moves_left_one_pixel_per_step() {
        let e = engine(&RecordingPacer::new());
        let mut display = RecordingDisplay::default();
        e.render(&mut display, &Command::new("Hi"), &Settings::default());
        let frames = display.frames();
        let (a, _) = frames[20].lit_column_span().unwrap();
        let (b, _) = frames[21].lit_column_span().unwrap();
        assert_eq!(b, a - 1);
    }

    #[test]
    fn zero_delay_never_sleeps() {
        let pacer = RecordingPacer::new();
        let e = engine(&pacer);
        let mut cmd = Command::new("Hi");
        cmd.scroll_delay = Some(0.0);
        e.render(&mut RecordingDisplay::default(), &cmd, &Settings::default());
        assert_eq!(pacer.total(), Duration::ZERO);
    }

    #[test]
    fn failed_frames_are_skipped() {
        let pacer = RecordingPacer::new();
        let e = engine(&pacer);
        let mut display = RecordingDisplay::default();
        display.fail_next_flushes(3);
        let outcome = e.render(&mut display, &Command::new("Hi"), &Settings::default());
        assert_eq!(outcome.failed_frames, 3);
        assert_eq!(outcome.frames, 53);
        assert_eq!(pacer.pauses().len(), 56);
    }

    #[test]
    fn repeat_is_returned_decremented() {
        let e = engine(&RecordingPacer::new());
        let mut cmd = Command::new("Hi");
        cmd.repeat = 2;
        let outcome = e.render(&mut RecordingDisplay::default(), &cmd, &Settings::default());
        let again = outcome.repeat.unwrap();
        assert_eq!(again.repeat, 1);
        assert_eq!(again.message, "Hi");
    }
}
