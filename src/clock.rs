//! Wall-clock and pacing primitives used by the renderers.
//!
//! Both are traits so the scheduler can be driven in tests without reading
//! the real time or sleeping.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Local, Timelike};

pub trait Clock: Send + Sync {
    /// Current local hour (0-23) and minute.
    fn hour_minute(&self) -> (u32, u32);
}

/// The host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn hour_minute(&self) -> (u32, u32) {
        let now = Local::now();
        (now.hour(), now.minute())
    }
}

/// A clock that shows whatever it was last set to. Clones share the time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: Arc<Mutex<(u32, u32)>>,
}

impl FixedClock {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            time: Arc::new(Mutex::new((hour, minute))),
        }
    }

    pub fn set(&self, hour: u32, minute: u32) {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner) = (hour, minute);
    }
}

impl Clock for FixedClock {
    fn hour_minute(&self) -> (u32, u32) {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Suspends the scheduler thread between frames.
pub trait Pacer: Send + Sync {
    fn pause(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Records requested pauses instead of sleeping. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total(&self) -> Duration {
        self.pauses().iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
