//! Settings model and persistence glue.
//!
//! The host stores one opaque JSON object for the extension. Loading merges
//! that object shallowly over the defaults (missing or unknown fields are
//! fine), then clamps anything a hand-edited or stale file could have pushed
//! out of range. Every mutation is persisted immediately.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::defaults;
use crate::host::Host;

/// How the cursor comes back after it was hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReappearMode {
    /// Scroll hides immediately; pointer movement past the threshold shows,
    /// then the cursor re-hides once movement settles
    Movement,
    /// Scroll hides immediately; the cursor reappears a fixed delay after
    /// the last scroll event, ignoring pointer movement
    Delay,
}

impl ReappearMode {
    /// Stable key used by the settings dropdown and the persisted JSON
    pub fn key(&self) -> &'static str {
        match self {
            ReappearMode::Movement => "movement",
            ReappearMode::Delay => "delay",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "movement" => Some(ReappearMode::Movement),
            "delay" => Some(ReappearMode::Delay),
            _ => None,
        }
    }
}

/// User-facing configuration.
///
/// Values are normally within the slider bounds in `constants::limits`, but
/// nothing downstream may rely on that: any non-negative number must work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorSettings {
    /// Minimum movement on either axis, in pixels, before the cursor
    /// reappears (movement mode only)
    pub movement_threshold: f64,

    /// Debounce delay in milliseconds
    pub delay_time: f64,

    pub reappear_mode: ReappearMode,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            movement_threshold: defaults::MOVEMENT_THRESHOLD,
            delay_time: defaults::DELAY_TIME_MS,
            reappear_mode: ReappearMode::Movement,
        }
    }
}

impl CursorSettings {
    /// Build settings from whatever the host persisted. Missing fields take
    /// defaults; an object that fails to parse entirely is discarded.
    pub fn from_persisted(data: Option<Value>) -> Self {
        let mut settings = match data {
            None => Self::default(),
            Some(value) => match serde_json::from_value(value) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(error = %e, "persisted settings unreadable, using defaults");
                    Self::default()
                }
            },
        };
        settings.clamp();
        settings
    }

    /// Clamp values a stale or hand-edited settings file could have pushed
    /// out of range. Negative numbers floor at zero; non-finite numbers
    /// fall back to the default.
    pub fn clamp(&mut self) {
        if !self.movement_threshold.is_finite() {
            warn!(
                movement_threshold = self.movement_threshold,
                "movementThreshold is not a finite number, using default"
            );
            self.movement_threshold = defaults::MOVEMENT_THRESHOLD;
        } else if self.movement_threshold < 0.0 {
            warn!(
                movement_threshold = self.movement_threshold,
                "movementThreshold is negative, clamping to 0"
            );
            self.movement_threshold = 0.0;
        }

        if !self.delay_time.is_finite() {
            warn!(
                delay_time = self.delay_time,
                "delayTime is not a finite number, using default"
            );
            self.delay_time = defaults::DELAY_TIME_MS;
        } else if self.delay_time < 0.0 {
            warn!(delay_time = self.delay_time, "delayTime is negative, clamping to 0");
            self.delay_time = 0.0;
        }
    }

    /// Debounce delay as a duration; negative values act as zero
    pub fn delay(&self) -> Duration {
        let ms = if self.delay_time.is_finite() && self.delay_time > 0.0 {
            self.delay_time
        } else {
            0.0
        };
        Duration::from_millis(ms as u64)
    }
}

/// Shared settings storage: one configuration object for the whole
/// extension, persisted through the host on every change.
pub struct SettingsStore {
    host: Arc<dyn Host>,
    current: RwLock<CursorSettings>,
}

impl SettingsStore {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            current: RwLock::new(CursorSettings::default()),
        }
    }

    /// Replace the in-memory settings with the persisted ones. A host that
    /// fails to load leaves the defaults in place; activation never fails
    /// over settings.
    pub fn load(&self) {
        let data = match self.host.load_data() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "failed to load persisted settings, using defaults");
                None
            }
        };
        let settings = CursorSettings::from_persisted(data);
        debug!(settings = ?settings, "settings loaded");
        *self.current.write() = settings;
    }

    pub fn get(&self) -> CursorSettings {
        *self.current.read()
    }

    /// Mutate the settings and persist the result immediately
    pub fn update(&self, mutate: impl FnOnce(&mut CursorSettings)) -> Result<()> {
        let settings = {
            let mut current = self.current.write();
            mutate(&mut current);
            current.clamp();
            *current
        };
        let value = serde_json::to_value(settings).context("failed to serialize settings")?;
        self.host
            .save_data(&value)
            .context("failed to persist settings")?;
        debug!(settings = ?settings, "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::TestHost;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = CursorSettings::default();
        assert_eq!(settings.movement_threshold, 3.0);
        assert_eq!(settings.delay_time, 500.0);
        assert_eq!(settings.reappear_mode, ReappearMode::Movement);
    }

    #[test]
    fn test_missing_fields_merge_over_defaults() {
        let settings = CursorSettings::from_persisted(Some(json!({ "delayTime": 750.0 })));
        assert_eq!(settings.movement_threshold, 3.0);
        assert_eq!(settings.delay_time, 750.0);
        assert_eq!(settings.reappear_mode, ReappearMode::Movement);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let settings = CursorSettings::from_persisted(Some(json!({
            "movementThreshold": 5.0,
            "someFutureField": { "nested": true },
        })));
        assert_eq!(settings.movement_threshold, 5.0);
    }

    #[test]
    fn test_unreadable_object_falls_back_to_defaults() {
        let settings = CursorSettings::from_persisted(Some(json!("not an object")));
        assert_eq!(settings, CursorSettings::default());
    }

    #[test]
    fn test_absent_data_is_defaults() {
        assert_eq!(CursorSettings::from_persisted(None), CursorSettings::default());
    }

    #[test]
    fn test_mode_parses_from_persisted_key() {
        let settings = CursorSettings::from_persisted(Some(json!({ "reappearMode": "delay" })));
        assert_eq!(settings.reappear_mode, ReappearMode::Delay);
    }

    #[test]
    fn test_negative_values_clamped() {
        let settings = CursorSettings::from_persisted(Some(json!({
            "movementThreshold": -2.0,
            "delayTime": -100.0,
        })));
        assert_eq!(settings.movement_threshold, 0.0);
        assert_eq!(settings.delay_time, 0.0);
        assert_eq!(settings.delay(), Duration::ZERO);
    }

    #[test]
    fn test_out_of_ui_bounds_values_tolerated() {
        // Above the slider maxima is unusual but legal for the core
        let settings = CursorSettings::from_persisted(Some(json!({
            "movementThreshold": 250.0,
            "delayTime": 60000.0,
        })));
        assert_eq!(settings.movement_threshold, 250.0);
        assert_eq!(settings.delay(), Duration::from_millis(60000));
    }

    #[test]
    fn test_round_trip_through_host() {
        let host = TestHost::new();
        let store = SettingsStore::new(host.clone());
        store
            .update(|s| {
                s.movement_threshold = 7.0;
                s.delay_time = 325.0;
                s.reappear_mode = ReappearMode::Delay;
            })
            .unwrap();

        // A fresh store sees exactly what was saved
        let reloaded = SettingsStore::new(host);
        reloaded.load();
        assert_eq!(
            reloaded.get(),
            CursorSettings {
                movement_threshold: 7.0,
                delay_time: 325.0,
                reappear_mode: ReappearMode::Delay,
            }
        );
    }

    #[test]
    fn test_persisted_field_names_are_stable() {
        let host = TestHost::new();
        let store = SettingsStore::new(host.clone());
        store.update(|_| {}).unwrap();

        let value = host.persisted().unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("movementThreshold"));
        assert!(object.contains_key("delayTime"));
        assert_eq!(object["reappearMode"], json!("movement"));
    }

    #[test]
    fn test_update_persists_immediately() {
        let host = TestHost::new();
        let store = SettingsStore::new(host.clone());
        assert!(host.persisted().is_none());

        store.update(|s| s.delay_time = 225.0).unwrap();
        let value = host.persisted().unwrap();
        assert_eq!(value["delayTime"], json!(225.0));
    }

    #[test]
    fn test_mode_keys_round_trip() {
        for mode in [ReappearMode::Movement, ReappearMode::Delay] {
            assert_eq!(ReappearMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(ReappearMode::from_key("bogus"), None);
    }
}
