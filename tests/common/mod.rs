//! Shared test helpers.

#![allow(dead_code)]

use std::sync::Arc;

use ledmatrix::clock::{FixedClock, RecordingPacer};
use ledmatrix::command::{self, CommandSender};
use ledmatrix::display::{Display, RecordingDisplay};
use ledmatrix::render::{AnimationEngine, IdleRenderer, MonoFace, Panel};
use ledmatrix::scheduler::Scheduler;
use ledmatrix::settings::SettingsStore;

/// A scheduler wired to test doubles: nothing sleeps and every draw is recorded.
pub struct Rig {
    pub scheduler: Scheduler<RecordingDisplay>,
    pub display: RecordingDisplay,
    pub settings: Arc<SettingsStore>,
    pub sender: CommandSender,
    pub clock: FixedClock,
    pub pacer: RecordingPacer,
}

impl Rig {
    pub fn new() -> Self {
        let display = RecordingDisplay::default();
        let settings = Arc::new(SettingsStore::default());
        let clock = FixedClock::new(12, 34);
        let pacer = RecordingPacer::new();
        let (sender, queue) = command::queue();

        let font = Arc::new(MonoFace::default());
        let idle = IdleRenderer::new(font.clone(), Arc::new(clock.clone()), Arc::new(pacer.clone()));
        let engine = AnimationEngine::new(font, Arc::new(pacer.clone()));
        let scheduler = Scheduler::new(display.clone(), settings.clone(), queue, idle, engine);

        Self {
            scheduler,
            display,
            settings,
            sender,
            clock,
            pacer,
        }
    }

    pub fn panel(&self) -> Panel {
        self.display.panel()
    }
}
