//! Daemon configuration.
//!
//! Read once at startup from JSON, by default at
//! `~/.config/ledmatrix/config.json`. Every field has a default, so a missing
//! default file just means stock settings. Anything that would leave the
//! daemon unable to draw (bad panel geometry, unknown font, out-of-range
//! initial settings) is a configuration error and stops startup.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::render::font::DEFAULT_FONT;
use crate::render::{MonoFace, Panel};
use crate::settings::{self, Mode, ScrollDirection, Settings};

/// Largest panel the daemon will drive, in pixels.
const MAX_PANEL_PIXELS: u32 = 1 << 20;

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ledmatrix")
        .join("config.json")
}

/// Where frames go.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkConfig {
    #[default]
    Terminal,
    Png(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub panel: Panel,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_scroll_delay")]
    pub scroll_delay: f64,
    #[serde(default = "default_contrast")]
    pub contrast: u8,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub scroll_direction: ScrollDirection,
    #[serde(default = "default_idle_dwell_ms")]
    pub idle_dwell_ms: u64,
    /// Shown once before the first idle frame. `null` disables it.
    #[serde(default = "default_welcome")]
    pub welcome: Option<Command>,
    /// Frame scrolled messages as `+ message +`.
    #[serde(default = "default_true")]
    pub decorate: bool,
    #[serde(default)]
    pub sink: SinkConfig,
}

fn default_listen() -> String { "0.0.0.0:5000".into() }
fn default_font() -> String { DEFAULT_FONT.into() }
fn default_scroll_delay() -> f64 { settings::DEFAULT_SCROLL_DELAY }
fn default_contrast() -> u8 { settings::DEFAULT_CONTRAST }
fn default_idle_dwell_ms() -> u64 { 500 }
fn default_true() -> bool { true }

fn default_welcome() -> Option<Command> {
    Some(Command {
        scroll_delay: Some(0.01),
        ..Command::new("Hello World")
    })
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            panel: Panel::default(),
            font: default_font(),
            scroll_delay: default_scroll_delay(),
            contrast: default_contrast(),
            mode: Mode::default(),
            scroll_direction: ScrollDirection::default(),
            idle_dwell_ms: default_idle_dwell_ms(),
            welcome: default_welcome(),
            decorate: true,
            sink: SinkConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from `path`, or from [`default_path`] when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    /// The result is validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let path = default_path();
                if path.exists() {
                    Self::read(&path)?
                } else {
                    tracing::debug!("No config at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        let panel = self.panel;
        if panel.modules == 0 || panel.module_width == 0 || panel.height == 0 {
            return Err(Error::Config(format!("panel dimensions must be non-zero: {panel:?}")));
        }
        let pixels = panel
            .modules
            .checked_mul(panel.module_width)
            .and_then(|width| width.checked_mul(panel.height));
        if !pixels.is_some_and(|n| n <= MAX_PANEL_PIXELS) {
            return Err(Error::Config(format!(
                "panel too large: {panel:?} (at most {MAX_PANEL_PIXELS} pixels)"
            )));
        }
        self.font_face()?;
        self.listen_addr()?;
        settings::check_scroll_delay("scroll_delay", self.scroll_delay)
            .map_err(|e| Error::Config(e.to_string()))?;
        if let Some(welcome) = &self.welcome {
            welcome
                .validate()
                .map_err(|e| Error::Config(format!("welcome message: {e}")))?;
        }
        Ok(())
    }

    /// Replace the port of `listen`, as done by the `PORT` environment variable.
    pub fn override_port(&mut self, port: &str) -> Result<()> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid port {port:?}")))?;
        let mut addr = self.listen_addr()?;
        addr.set_port(port);
        self.listen = addr.to_string();
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| Error::Config(format!("invalid listen address {:?}", self.listen)))
    }

    pub fn font_face(&self) -> Result<MonoFace> {
        MonoFace::by_name(&self.font).ok_or_else(|| {
            Error::Config(format!(
                "unknown font {:?} (available: {})",
                self.font,
                MonoFace::NAMES.join(", ")
            ))
        })
    }

    pub fn idle_dwell(&self) -> Duration {
        Duration::from_millis(self.idle_dwell_ms)
    }

    /// Settings the store starts with.
    pub fn initial_settings(&self) -> Settings {
        Settings {
            scroll_delay: self.scroll_delay,
            contrast: self.contrast,
            mode: self.mode,
            scroll_direction: self.scroll_direction,
            status_message: None,
        }
    }
}
