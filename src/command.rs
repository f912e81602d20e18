//! Scroll commands and the queue that carries them to the scheduler.
//!
//! The queue is an unbounded FIFO. Any number of [`CommandSender`] clones may
//! push from request threads; the single [`CommandQueue`] owned by the
//! scheduler pops without blocking and re-appends repeats at the tail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{Error, ValidationError};
use crate::payload;
use crate::settings::{self, ScrollDirection};

/// One request to scroll a message across the panel.
///
/// Unset overrides fall back to the settings in force when the command is
/// rendered, not when it was queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_direction: Option<ScrollDirection>,
    /// Additional runs after the first.
    #[serde(default)]
    pub repeat: u32,
}

impl Command {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            scroll_delay: None,
            contrast: None,
            scroll_direction: None,
            repeat: 0,
        }
    }

    /// Build a command from a request body.
    ///
    /// `message` is required. Keys the renderer does not know about are
    /// ignored.
    pub fn from_json(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let message = match map.get("message") {
            None | Some(Value::Null) => {
                return Err(ValidationError::new("message", "is required"));
            }
            Some(value) => payload::string("message", value)?.to_string(),
        };

        let mut command = Self::new(message);
        if let Some(value) = present(map, "scroll_delay") {
            command.scroll_delay = Some(settings::check_scroll_delay(
                "scroll_delay",
                payload::number("scroll_delay", value)?,
            )?);
        }
        if let Some(value) = present(map, "contrast") {
            command.contrast = Some(settings::check_contrast(
                "contrast",
                payload::integer("contrast", value)?,
            )?);
        }
        if let Some(value) = present(map, "scroll_direction") {
            command.scroll_direction = Some(settings::parse_direction("scroll_direction", value)?);
        }
        if let Some(value) = present(map, "repeat") {
            let repeat = payload::integer("repeat", value)?;
            command.repeat = u32::try_from(repeat).map_err(|_| {
                ValidationError::new("repeat", format!("must be a non-negative count, got {repeat}"))
            })?;
        }
        command.validate()?;
        Ok(command)
    }

    /// Domain checks for commands built in code or loaded from config.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.is_empty() {
            return Err(ValidationError::new("message", "must not be empty"));
        }
        if let Some(delay) = self.scroll_delay {
            settings::check_scroll_delay("scroll_delay", delay)?;
        }
        Ok(())
    }

    /// The copy to re-queue after this command has been shown, if any runs remain.
    pub fn next_repeat(&self) -> Option<Command> {
        (self.repeat > 0).then(|| Command {
            repeat: self.repeat - 1,
            ..self.clone()
        })
    }
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

/// Create a connected sender/queue pair.
pub fn queue() -> (CommandSender, CommandQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sender = CommandSender { tx: tx.clone() };
    (sender, CommandQueue { rx, requeue: tx })
}

/// Producer half, cloned into every request handler.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: UnboundedSender<Command>,
}

impl CommandSender {
    /// Append to the tail. Never blocks.
    pub fn push(&self, command: Command) -> Result<(), Error> {
        self.tx.send(command).map_err(|_| Error::QueueClosed)
    }
}

/// Consumer half, owned by the scheduler.
#[derive(Debug)]
pub struct CommandQueue {
    rx: UnboundedReceiver<Command>,
    requeue: UnboundedSender<Command>,
}

impl CommandQueue {
    /// Remove and return the head, or `None` straight away if the queue is empty.
    pub fn try_pop(&mut self) -> Option<Command> {
        self.rx.try_recv().ok()
    }

    /// Append to the tail from the consumer side.
    pub fn push(&self, command: Command) {
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.requeue.send(command);
    }
}
