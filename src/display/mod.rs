//! Output sinks.
//!
//! The scheduler thread is the only caller of a [`Display`], so
//! implementations need no internal locking.

pub mod png;
pub mod recording;
pub mod terminal;

use thiserror::Error;

use crate::render::{Frame, Panel};

pub use png::PngSink;
pub use recording::{DisplayEvent, RecordingDisplay};
pub use terminal::TerminalSink;

/// A single failed draw, flush or contrast change.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Frame is {actual:?}, panel is {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("{0}")]
    Rejected(String),
}

pub trait Display {
    fn panel(&self) -> Panel;

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Blank the panel.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Push a complete frame to the panel.
    fn flush(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Draw into a fresh blank frame, then flush it as one unit.
    ///
    /// The frame is flushed once the closure returns, whatever it drew.
    fn canvas<F>(&mut self, draw: F) -> Result<(), DisplayError>
    where
        F: FnOnce(&mut Frame),
        Self: Sized,
    {
        let mut frame = Frame::new(self.panel());
        draw(&mut frame);
        self.flush(&frame)
    }
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn panel(&self) -> Panel {
        (**self).panel()
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        (**self).set_contrast(level)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn flush(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        (**self).flush(frame)
    }
}

pub(crate) fn check_size(panel: Panel, frame: &Frame) -> Result<(), DisplayError> {
    let expected = (panel.width(), panel.height);
    let actual = (frame.width(), frame.height());
    if expected != actual {
        return Err(DisplayError::SizeMismatch { expected, actual });
    }
    Ok(())
}
