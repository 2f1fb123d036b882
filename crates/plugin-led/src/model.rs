//! Wire types for the LED routes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A controllable LED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedInfo {
    /// Directory name, e.g. `led0`.
    pub name: String,
    /// Full path of the LED directory.
    pub path: PathBuf,
    /// Last brightness read.
    pub brightness: u32,
}

/// Aggregate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedStatus {
    Enabled,
    Disabled,
}

/// State of all LEDs at `last_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedState {
    /// `enabled` when strictly more LEDs are lit than dark.
    pub status: LedStatus,
    /// Number of LEDs discovered.
    pub total_leds: usize,
    /// LEDs with non-zero brightness.
    pub enabled_count: usize,
    /// LEDs at brightness 0.
    pub disabled_count: usize,
    /// When the LEDs were last read or written.
    pub last_update: DateTime<Utc>,
}

impl LedState {
    /// Computes the majority status of `leds`.
    pub fn from_leds(leds: &[LedInfo]) -> Self {
        let enabled_count = leds.iter().filter(|led| led.brightness > 0).count();
        let disabled_count = leds.len() - enabled_count;
        Self {
            status: if enabled_count > disabled_count {
                LedStatus::Enabled
            } else {
                LedStatus::Disabled
            },
            total_leds: leds.len(),
            enabled_count,
            disabled_count,
            last_update: Utc::now(),
        }
    }
}

/// User-editable plugin settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedSettings {
    /// Switch every LED off during `init`.
    #[serde(default)]
    pub auto_disable_on_startup: bool,
}

/// Body of `POST /api/plugins/led/leds`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToggleLedsRequest {
    /// `true` lights every LED, `false` turns them all off.
    pub enable: bool,
}

/// Response of `GET /api/plugins/led/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Aggregate state.
    pub state: LedState,
    /// Current persisted settings.
    pub settings: LedSettings,
    /// Per-LED detail, sorted by name.
    pub leds: Vec<LedInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn led(name: &str, brightness: u32) -> LedInfo {
        LedInfo {
            name: name.to_string(),
            path: PathBuf::from(name),
            brightness,
        }
    }

    #[test]
    fn test_majority_status() {
        let state = LedState::from_leds(&[led("a", 1), led("b", 255), led("c", 0)]);
        assert_eq!(state.status, LedStatus::Enabled);
        assert_eq!(state.enabled_count, 2);

        let tie = LedState::from_leds(&[led("a", 1), led("b", 0)]);
        assert_eq!(tie.status, LedStatus::Disabled);

        let none = LedState::from_leds(&[]);
        assert_eq!(none.status, LedStatus::Disabled);
        assert_eq!(none.total_leds, 0);
    }

    #[test]
    fn test_settings_wire_names() {
        let json = serde_json::to_value(LedSettings {
            auto_disable_on_startup: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "autoDisableOnStartup": true }));
    }

    #[test]
    fn test_status_response_wire_shape() {
        let response = StatusResponse {
            state: LedState::from_leds(&[led("led0", 1)]),
            settings: LedSettings::default(),
            leds: vec![led("led0", 1)],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["state"]["status"], "enabled");
        assert_eq!(json["state"]["totalLeds"], 1);
        assert_eq!(json["state"]["enabledCount"], 1);
        assert_eq!(json["state"]["disabledCount"], 0);
        assert!(json["state"]["lastUpdate"].is_string());
        assert_eq!(json["settings"]["autoDisableOnStartup"], false);
        assert_eq!(json["leds"][0]["name"], "led0");

        let request: ToggleLedsRequest = serde_json::from_str(r#"{"enable": true}"#).unwrap();
        assert!(request.enable);
    }
}
