//! Draws frames as block characters on a terminal.

use std::io::{self, Write};

use super::{check_size, Display, DisplayError};
use crate::render::{Frame, Panel};

/// Contrast at or above which lit pixels use the full block.
const BRIGHT_THRESHOLD: u8 = 128;

pub struct TerminalSink<W: Write = io::Stdout> {
    out: W,
    panel: Panel,
    contrast: u8,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(panel: Panel) -> Self {
        Self::new(io::stdout(), panel)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, panel: Panel) -> Self {
        Self {
            out,
            panel,
            contrast: u8::MAX,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, frame: &Frame) -> String {
        let lit = if self.contrast >= BRIGHT_THRESHOLD { '█' } else { '▒' };
        // Cursor home so each frame overwrites the last.
        let mut out = String::from("\x1b[H");
        for y in 0..frame.height() as i32 {
            out.extend((0..frame.width() as i32).map(|x| if frame.get(x, y) { lit } else { ' ' }));
            out.push('\n');
        }
        out
    }
}

impl<W: Write> Display for TerminalSink<W> {
    fn panel(&self) -> Panel {
        self.panel
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.contrast = level;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.flush(&Frame::new(self.panel))
    }

    fn flush(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        check_size(self.panel, frame)?;
        let text = self.render(frame);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
