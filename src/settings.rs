//! Shared display settings.
//!
//! One [`SettingsStore`] is built at startup and shared by reference between
//! the request layer and the scheduler thread. Readers always get an owned
//! snapshot; writers go through [`SettingsStore::apply_update`], which
//! validates the whole batch and applies it under a single write lock.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::payload;

pub const DEFAULT_SCROLL_DELAY: f64 = 0.05;
pub const MAX_SCROLL_DELAY: f64 = 1.0;
pub const DEFAULT_CONTRAST: u8 = 255;

/// What the idle renderer shows when no message is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Time,
    Off,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Some(Self::Time),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    LeftToRight,
    BottomToTop,
}

impl ScrollDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "left_to_right" => Some(Self::LeftToRight),
            "bottom_to_top" => Some(Self::BottomToTop),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftToRight => "left_to_right",
            Self::BottomToTop => "bottom_to_top",
        }
    }
}

/// Point-in-time copy of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub scroll_delay: f64,
    pub contrast: u8,
    pub mode: Mode,
    pub scroll_direction: ScrollDirection,
    pub status_message: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_delay: DEFAULT_SCROLL_DELAY,
            contrast: DEFAULT_CONTRAST,
            mode: Mode::Time,
            scroll_direction: ScrollDirection::LeftToRight,
            status_message: None,
        }
    }
}

/// Check a scroll delay in seconds against `[0, 1]`.
pub fn check_scroll_delay(field: &str, seconds: f64) -> Result<f64, ValidationError> {
    if !seconds.is_finite() || !(0.0..=MAX_SCROLL_DELAY).contains(&seconds) {
        return Err(ValidationError::new(
            field,
            format!("must be between 0 and {MAX_SCROLL_DELAY} seconds, got {seconds}"),
        ));
    }
    Ok(seconds)
}

/// Check a contrast level against `[0, 255]`.
pub fn check_contrast(field: &str, level: i64) -> Result<u8, ValidationError> {
    u8::try_from(level).map_err(|_| {
        ValidationError::new(field, format!("must be between 0 and 255, got {level}"))
    })
}

pub fn parse_mode(field: &str, value: &Value) -> Result<Mode, ValidationError> {
    let s = payload::string(field, value)?;
    Mode::parse(s).ok_or_else(|| {
        ValidationError::new(field, format!("expected \"time\" or \"off\", got {s:?}"))
    })
}

pub fn parse_direction(field: &str, value: &Value) -> Result<ScrollDirection, ValidationError> {
    let s = payload::string(field, value)?;
    ScrollDirection::parse(s).ok_or_else(|| {
        ValidationError::new(
            field,
            format!("expected \"left_to_right\" or \"bottom_to_top\", got {s:?}"),
        )
    })
}

/// A partial settings change. Absent fields keep their current value.
///
/// Numeric fields hold the raw client value; range checks happen in
/// [`SettingsStore::apply_update`] so that the check and the write share one
/// critical section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub scroll_delay: Option<f64>,
    pub contrast: Option<i64>,
    pub mode: Option<Mode>,
    pub scroll_direction: Option<ScrollDirection>,
    /// `Some(None)` clears the status line.
    pub status_message: Option<Option<String>>,
}

impl SettingsUpdate {
    /// Parse a JSON object. Unknown keys and wrongly typed values are rejected.
    pub fn from_json(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut update = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "scroll_delay" => update.scroll_delay = Some(payload::number(key, value)?),
                "contrast" => update.contrast = Some(payload::integer(key, value)?),
                // `state` is the name older clients use for the idle mode.
                "mode" | "state" => update.mode = Some(parse_mode(key, value)?),
                "scroll_direction" => {
                    update.scroll_direction = Some(parse_direction(key, value)?)
                }
                "status_message" => {
                    update.status_message = Some(match value {
                        Value::Null => None,
                        other => {
                            let text = payload::string(key, other)?.trim();
                            (!text.is_empty()).then(|| text.to_string())
                        }
                    })
                }
                _ => return Err(ValidationError::new(key.as_str(), "unknown setting")),
            }
        }
        Ok(update)
    }
}

pub struct SettingsStore {
    inner: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Owned snapshot taken under one read lock.
    pub fn read(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate every provided field, then apply them all or none.
    ///
    /// Returns the resulting snapshot on success.
    pub fn apply_update(&self, update: &SettingsUpdate) -> Result<Settings, ValidationError> {
        let mut settings = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let scroll_delay = update
            .scroll_delay
            .map(|d| check_scroll_delay("scroll_delay", d))
            .transpose()?;
        let contrast = update
            .contrast
            .map(|c| check_contrast("contrast", c))
            .transpose()?;

        if let Some(delay) = scroll_delay {
            settings.scroll_delay = delay;
        }
        if let Some(contrast) = contrast {
            settings.contrast = contrast;
        }
        if let Some(mode) = update.mode {
            settings.mode = mode;
        }
        if let Some(direction) = update.scroll_direction {
            settings.scroll_direction = direction;
        }
        if let Some(status) = &update.status_message {
            settings.status_message = status.clone();
        }
        Ok(settings.clone())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: Value) -> Result<SettingsUpdate, ValidationError> {
        SettingsUpdate::from_json(value.as_object().unwrap())
    }

    #[test]
    fn defaults() {
        let s = SettingsStore::default().read();
        assert_eq!(s.scroll_delay, 0.05);
        assert_eq!(s.contrast, DEFAULT_CONTRAST);
        assert_eq!(s.mode, Mode::Time);
        assert_eq!(s.scroll_direction, ScrollDirection::LeftToRight);
        assert_eq!(s.status_message, None);
    }

    #[test]
    fn applies_only_provided_fields() {
        let store = SettingsStore::default();
        let before = store.read();
        let after = store
            .apply_update(&update(json!({"contrast": 10, "mode": "off"})).unwrap())
            .unwrap();
        assert_eq!(after.contrast, 10);
        assert_eq!(after.mode, Mode::Off);
        assert_eq!(after.scroll_delay, before.scroll_delay);
        assert_eq!(after.scroll_direction, before.scroll_direction);
        assert_eq!(store.read(), after);
    }

    #[test]
    fn rejects_whole_batch_on_one_bad_field() {
        let store = SettingsStore::default();
        let before = store.read();
        let err = store
            .apply_update(&update(json!({"mode": "off", "scroll_delay": 2.0})).unwrap())
            .unwrap_err();
        assert_eq!(err.field, "scroll_delay");
        assert_eq!(store.read(), before);
    }

    #[test]
    fn contrast_out_of_range() {
        let store = SettingsStore::default();
        for bad in [256, 300, -1] {
            let err = store
                .apply_update(&update(json!({ "contrast": bad })).unwrap())
                .unwrap_err();
            assert_eq!(err.field, "contrast");
        }
        assert_eq!(store.read().contrast, DEFAULT_CONTRAST);
    }

    #[test]
    fn delay_bounds_are_inclusive() {
        let store = SettingsStore::default();
        let delay = |d: f64| SettingsUpdate {
            scroll_delay: Some(d),
            ..Default::default()
        };
        assert_eq!(store.apply_update(&delay(0.0)).unwrap().scroll_delay, 0.0);
        assert_eq!(store.apply_update(&delay(1.0)).unwrap().scroll_delay, 1.0);
        assert!(store.apply_update(&delay(f64::NAN)).is_err());
        assert!(store.apply_update(&delay(-0.01)).is_err());
    }

    #[test]
    fn status_message_can_be_cleared() {
        let store = SettingsStore::default();
        store
            .apply_update(&update(json!({"status_message": "21°"})).unwrap())
            .unwrap();
        assert_eq!(store.read().status_message.as_deref(), Some("21°"));

        store
            .apply_update(&update(json!({"status_message": null})).unwrap())
            .unwrap();
        assert_eq!(store.read().status_message, None);

        let blank = update(json!({"status_message": "  "})).unwrap();
        assert_eq!(blank.status_message, Some(None));
    }

    #[test]
    fn state_is_an_alias_for_mode() {
        let u = update(json!({"state": "OFF"})).unwrap();
        assert_eq!(u.mode, Some(Mode::Off));
    }

    #[test]
    fn parse_rejects_unknown_and_mistyped_keys() {
        assert_eq!(update(json!({"brightness": 3})).unwrap_err().field, "brightness");
        assert_eq!(update(json!({"mode": "clock"})).unwrap_err().field, "mode");
        assert_eq!(update(json!({"contrast": "high"})).unwrap_err().field, "contrast");
        assert_eq!(
            update(json!({"scroll_direction": true})).unwrap_err().field,
            "scroll_direction"
        );
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["mode"], "time");
        assert_eq!(json["scroll_direction"], "left_to_right");
        assert!(json["status_message"].is_null());
    }
}
