//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ EmergencyController (domain)
//! ```
//!
//! Driven adapters (buttons, vibration motor, alert uplink, event sinks,
//! storage) implement these traits.  The
//! [`EmergencyController`](super::service::EmergencyController) consumes
//! them via generics, so the domain core never touches hardware directly.

use crate::config::DeviceConfig;
use crate::drivers::button::ButtonId;
use crate::drivers::haptic::HapticPattern;
use crate::error::CommsError;

use super::events::{AppEvent, EmergencyAlert};

// ───────────────────────────────────────────────────────────────
// Button port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the physical buttons.
pub trait ButtonPort {
    /// Raw current level of `button`, `true` = pressed.  Implementations
    /// report a failed read as not pressed.
    fn is_pressed(&mut self, button: ButtonId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Haptic port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the vibration motor.  Every call is infallible
/// and blocks for the requested time.
pub trait HapticPort {
    /// Run the motor for `duration_ms`.
    fn vibrate(&mut self, duration_ms: u32);

    /// Motor off for `duration_ms`.
    fn pause(&mut self, duration_ms: u32);

    /// Play a named pattern.
    fn play(&mut self, pattern: HapticPattern) {
        for &(on_ms, off_ms) in pattern.steps() {
            self.vibrate(on_ms);
            if off_ms > 0 {
                self.pause(off_ms);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Alert delivery port (driven adapter: domain → uplink)
// ───────────────────────────────────────────────────────────────

/// Hands a raised alert towards the backend emergency endpoint.
///
/// `Ok` means the adapter has taken responsibility for the alert; an
/// `Err` leaves it with the controller, which re-offers it at the
/// server-sync cadence.
pub trait AlertDeliveryPort {
    fn deliver(&mut self, alert: &EmergencyAlert) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists device configuration.
///
/// Implementations MUST call [`DeviceConfig::validate`] before persisting
/// and reject invalid values rather than clamping them.
pub trait ConfigPort {
    /// Load configuration; [`DeviceConfig::default()`] when nothing is stored.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
