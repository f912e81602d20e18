//! In-memory sink that records every call.
//!
//! Clones share one log, so a test can hand a clone to the scheduler and
//! inspect what was drawn afterwards.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{check_size, Display, DisplayError};
use crate::render::{Frame, Panel};

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Contrast(u8),
    Clear,
    Frame(Frame),
}

#[derive(Debug, Clone)]
pub struct RecordingDisplay {
    panel: Panel,
    events: Arc<Mutex<Vec<DisplayEvent>>>,
    failing_flushes: Arc<AtomicU32>,
}

impl RecordingDisplay {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            events: Arc::new(Mutex::new(Vec::new())),
            failing_flushes: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Frame(frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    /// Make the next `count` flushes fail without recording anything.
    pub fn fail_next_flushes(&self, count: u32) {
        self.failing_flushes.store(count, Ordering::SeqCst);
    }

    fn record(&self, event: DisplayEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::new(Panel::default())
    }
}

impl Display for RecordingDisplay {
    fn panel(&self) -> Panel {
        self.panel
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.record(DisplayEvent::Contrast(level));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.record(DisplayEvent::Clear);
        Ok(())
    }

    fn flush(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        check_size(self.panel, frame)?;
        let failing = self
            .failing_flushes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(DisplayError::Rejected("injected flush failure".into()));
        }
        self.record(DisplayEvent::Frame(frame.clone()));
        Ok(())
    }
}
