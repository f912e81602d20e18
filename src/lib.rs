//! LED matrix display daemon
//!
//! Drives a row of cascaded 8x8 LED matrix modules: a blinking clock with an
//! optional status line while idle, and queued messages that scroll across
//! the panel. Requests arrive over a JSON-lines TCP protocol and only touch
//! the settings store and the command queue; a single scheduler thread owns
//! the display.

pub mod api;
pub mod clock;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod payload;
pub mod render;
pub mod scheduler;
pub mod server;
pub mod settings;

pub use error::{Error, Result, ValidationError};
