//! Device configuration parameters
//!
//! All tunable parameters for the watch: network credentials, backend
//! endpoints, identity, sensor thresholds, power management and timing.
//! Defaults are the factory values; they can be overridden via NVS.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- WiFi ---
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,
    /// Give up on a connection attempt after this long (milliseconds)
    pub wifi_timeout_ms: u32,

    // --- Backend API ---
    /// Base URL of the classroom API server
    pub api_server: String<64>,
    pub api_endpoint_attendance: String<32>,
    pub api_endpoint_analytics: String<32>,
    pub api_endpoint_emergency: String<32>,

    // --- Identity ---
    pub device_id: String<16>,
    pub student_id: String<16>,

    // --- Sensor thresholds ---
    /// Heart rate below this (bpm) is flagged
    pub heart_rate_min_bpm: u8,
    /// Heart rate above this (bpm) is flagged
    pub heart_rate_max_bpm: u8,
    pub focus_movement_threshold: u8,
    pub distraction_threshold: u8,

    // --- Power ---
    /// Inactivity before the display sleeps (milliseconds)
    pub sleep_timeout_ms: u32,
    /// Battery percentage considered low (0-100%)
    pub battery_low_threshold_percent: u8,

    // --- Timing ---
    pub sensor_read_interval_ms: u32,
    pub display_update_interval_ms: u32,
    /// Uplink cadence; pending alerts are re-offered at this rate
    pub server_sync_interval_ms: u32,
    /// Main loop / FSM tick period (milliseconds)
    pub control_loop_interval_ms: u32,

    // --- Emergency ---
    /// Emergency button hold time before an alert is raised (milliseconds)
    pub emergency_hold_ms: u32,
    /// Reminder buzz period while an alert is active (seconds)
    pub alert_reminder_interval_secs: u16,

    // --- Debug ---
    pub debug_mode: bool,
    pub serial_baud: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // WiFi
            wifi_ssid: fixed("YourSchoolWiFi"),
            wifi_password: fixed("YourPassword"),
            wifi_timeout_ms: 20_000, // 20 s

            // Backend
            api_server: fixed("http://192.168.1.100:5000"),
            api_endpoint_attendance: fixed("/api/attendance/mark"),
            api_endpoint_analytics: fixed("/api/analytics/process"),
            api_endpoint_emergency: fixed("/api/emergency/alert"),

            // Identity
            device_id: fixed("WATCH_001"),
            student_id: fixed("STU_2024_001"),

            // Thresholds
            heart_rate_min_bpm: 50,
            heart_rate_max_bpm: 120,
            focus_movement_threshold: 5,
            distraction_threshold: 10,

            // Power
            sleep_timeout_ms: 120_000, // 2 min
            battery_low_threshold_percent: 20,

            // Timing
            sensor_read_interval_ms: 2_000,
            display_update_interval_ms: 1_000,
            server_sync_interval_ms: 30_000,
            control_loop_interval_ms: 50, // 20 Hz, fast enough for button gestures

            // Emergency
            emergency_hold_ms: 2_000,
            alert_reminder_interval_secs: 30,

            // Debug
            debug_mode: true,
            serial_baud: 115_200,
        }
    }
}

impl DeviceConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped,
    /// so a bad provisioning payload cannot disable the emergency path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() || !is_printable_ascii(&self.wifi_ssid) {
            return Err(ConfigError::ValidationFailed(
                "wifi_ssid must be non-empty printable ASCII",
            ));
        }
        if !is_printable_ascii(&self.wifi_password) {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be printable ASCII",
            ));
        }
        if !(self.api_server.starts_with("http://") || self.api_server.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(
                "api_server must start with http:// or https://",
            ));
        }
        for endpoint in [
            &self.api_endpoint_attendance,
            &self.api_endpoint_analytics,
            &self.api_endpoint_emergency,
        ] {
            if !endpoint.starts_with('/') {
                return Err(ConfigError::ValidationFailed(
                    "api endpoints must start with '/'",
                ));
            }
        }
        if self.device_id.is_empty() || self.student_id.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "device_id and student_id must be set",
            ));
        }
        if self.heart_rate_min_bpm >= self.heart_rate_max_bpm {
            return Err(ConfigError::ValidationFailed(
                "heart_rate_min_bpm must be < heart_rate_max_bpm",
            ));
        }
        if self.battery_low_threshold_percent > 100 {
            return Err(ConfigError::ValidationFailed(
                "battery_low_threshold_percent must be 0–100",
            ));
        }
        if !(10..=1_000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 10–1000",
            ));
        }
        if !(500..=10_000).contains(&self.emergency_hold_ms) {
            return Err(ConfigError::ValidationFailed(
                "emergency_hold_ms must be 500–10000",
            ));
        }
        if !(1_000..=3_600_000).contains(&self.server_sync_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "server_sync_interval_ms must be 1000–3600000",
            ));
        }
        if !(5..=600).contains(&self.alert_reminder_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "alert_reminder_interval_secs must be 5–600",
            ));
        }
        if self.sensor_read_interval_ms == 0 || self.display_update_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "sensor and display intervals must be non-zero",
            ));
        }
        Ok(())
    }

    /// Number of control ticks covering `ms` milliseconds (at least one).
    pub fn ticks_for_ms(&self, ms: u32) -> u64 {
        let period = self.control_loop_interval_ms.max(1);
        (u64::from(ms) / u64::from(period)).max(1)
    }

    /// Full URL of the emergency alert endpoint.
    pub fn emergency_url(&self) -> String<96> {
        let mut url = String::new();
        // Both halves are bounded (64 + 32), so this cannot overflow.
        let _ = url.push_str(&self.api_server);
        let _ = url.push_str(&self.api_endpoint_emergency);
        url
    }
}

/// Every byte in `0x20..=0x7E` (space through tilde).
fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Copy `s` into a fixed-capacity string, truncating at a char boundary.
pub(crate) fn fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
