//! The display control loop.
//!
//! One scheduler runs on its own thread and is the only code that touches
//! the sink. Each tick flips the blink toggle and polls the command queue
//! without blocking: a pending command is scrolled to completion, otherwise
//! one idle frame is drawn and the idle dwell paces the loop.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::command::{Command, CommandQueue};
use crate::display::Display;
use crate::render::{AnimationEngine, IdleRenderer};
use crate::settings::SettingsStore;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// A queued command was scrolled.
    Drained { message: String, frames: u32, requeued: bool },
    /// Nothing was queued; an idle frame was drawn.
    Idled,
}

pub struct Scheduler<D: Display> {
    display: D,
    settings: Arc<SettingsStore>,
    queue: CommandQueue,
    idle: IdleRenderer,
    engine: AnimationEngine,
    toggle: bool,
}

impl<D: Display> Scheduler<D> {
    pub fn new(
        display: D,
        settings: Arc<SettingsStore>,
        queue: CommandQueue,
        idle: IdleRenderer,
        engine: AnimationEngine,
    ) -> Self {
        Self {
            display,
            settings,
            queue,
            idle,
            engine,
            toggle: false,
        }
    }

    /// Queue a command before the loop starts, e.g. a welcome message.
    pub fn seed(&self, command: Command) {
        self.queue.push(command);
    }

    /// State of the blink toggle after the last tick.
    pub fn toggle(&self) -> bool {
        self.toggle
    }

    /// Run one iteration of the loop.
    pub fn tick(&mut self) -> Tick {
        self.toggle = !self.toggle;

        match self.queue.try_pop() {
            Some(command) => {
                let settings = self.settings.read();
                debug!("Drawing message {:?} (repeat {})", command.message, command.repeat);
                let outcome = self.engine.render(&mut self.display, &command, &settings);
                if outcome.failed_frames > 0 {
                    warn!(
                        "{} of {} frames failed for {:?}",
                        outcome.failed_frames,
                        outcome.frames + outcome.failed_frames,
                        command.message
                    );
                }
                let requeued = outcome.repeat.is_some();
                if let Some(repeat) = outcome.repeat {
                    // Tail, not head: other senders get their turn first.
                    self.queue.push(repeat);
                }
                Tick::Drained {
                    message: command.message,
                    frames: outcome.frames,
                    requeued,
                }
            }
            None => {
                let settings = self.settings.read();
                if let Err(e) = self.idle.render(&mut self.display, self.toggle, &settings) {
                    warn!("Idle frame failed: {}", e);
                }
                Tick::Idled
            }
        }
    }

    /// Loop forever.
    pub fn run(mut self) {
        loop {
            self.tick();
        }
    }
}

impl<D: Display + Send + 'static> Scheduler<D> {
    /// Start the loop on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("display-scheduler".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, RecordingPacer};
    use crate::command;
    use crate::display::RecordingDisplay;
    use crate::render::MonoFace;
    use crate::settings::{Mode, SettingsUpdate};

    fn scheduler(
        display: &RecordingDisplay,
        settings: Arc<SettingsStore>,
    ) -> (Scheduler<RecordingDisplay>, command::CommandSender) {
        let (sender, queue) = command::queue();
        let font = Arc::new(MonoFace::default());
        let pacer = Arc::new(RecordingPacer::new());
        let idle = IdleRenderer::new(font.clone(), Arc::new(FixedClock::new(12, 0)), pacer.clone());
        let engine = AnimationEngine::new(font, pacer);
        let s = Scheduler::new(display.clone(), settings, queue, idle, engine);
        (s, sender)
    }

    #[test]
    fn idles_when_queue_is_empty() {
        let display = RecordingDisplay::default();
        let (mut s, _tx) = scheduler(&display, Arc::new(SettingsStore::default()));
        assert_eq!(s.tick(), Tick::Idled);
        assert!(s.toggle());
        assert_eq!(s.tick(), Tick::Idled);
        assert!(!s.toggle());
        assert_eq!(display.frames().len(), 2);
    }

    #[test]
    fn drains_before_idling() {
        let display = RecordingDisplay::default();
        let (mut s, tx) = scheduler(&display, Arc::new(SettingsStore::default()));
        tx.push(Command::new("Hi")).unwrap();
        assert_eq!(
            s.tick(),
            Tick::Drained {
                message: "Hi".into(),
                frames: 56,
                requeued: false
            }
        );
        assert_eq!(s.tick(), Tick::Idled);
    }

    #[test]
    fn snapshot_is_taken_when_drawn() {
        let display = RecordingDisplay::default();
        let settings = Arc::new(SettingsStore::default());
        let (mut s, tx) = scheduler(&display, settings.clone());
        tx.push(Command::new("Hi")).unwrap();
        settings
            .apply_update(&SettingsUpdate {
                contrast: Some(17),
                ..Default::default()
            })
            .unwrap();
        s.tick();
        assert_eq!(display.events()[0], crate::display::DisplayEvent::Contrast(17));
    }

    #[test]
    fn survives_failing_sink() {
        let display = RecordingDisplay::default();
        let settings = Arc::new(SettingsStore::default());
        settings
            .apply_update(&SettingsUpdate {
                mode: Some(Mode::Time),
                ..Default::default()
            })
            .unwrap();
        let (mut s, _tx) = scheduler(&display, settings);
        display.fail_next_flushes(1);
        assert_eq!(s.tick(), Tick::Idled);
        assert!(display.frames().is_empty());
        assert_eq!(s.tick(), Tick::Idled);
        assert_eq!(display.frames().len(), 1);
    }
}
