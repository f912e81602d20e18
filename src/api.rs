//! Operations exposed to the request layer.
//!
//! Validation happens here, on the caller's thread. Nothing that fails
//! validation reaches the queue or the settings store, and none of these
//! calls ever waits on the scheduler.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::command::{Command, CommandSender};
use crate::error::{Error, ValidationError};
use crate::settings::{Settings, SettingsStore, SettingsUpdate};

/// Acknowledgement returned for an accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub result: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            result: "ok".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Api {
    settings: Arc<SettingsStore>,
    commands: CommandSender,
}

impl Api {
    pub fn new(settings: Arc<SettingsStore>, commands: CommandSender) -> Self {
        Self { settings, commands }
    }

    /// Validate a message request and queue it.
    pub fn submit_command(&self, payload: &Map<String, Value>) -> Result<Ack, Error> {
        let command = Command::from_json(payload)?;
        debug!("Queueing message {:?} (repeat {})", command.message, command.repeat);
        self.commands.push(command)?;
        Ok(Ack::ok())
    }

    /// Apply a partial settings change and return the full result.
    pub fn update_settings(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<Settings, ValidationError> {
        let update = SettingsUpdate::from_json(payload)?;
        let settings = self.settings.apply_update(&update)?;
        info!(
            "Settings now mode={} contrast={} delay={} direction={}",
            settings.mode.as_str(),
            settings.contrast,
            settings.scroll_delay,
            settings.scroll_direction.as_str()
        );
        Ok(settings)
    }

    pub fn read_settings(&self) -> Settings {
        self.settings.read()
    }
}
