//! Inbound commands to the emergency controller.
//!
//! These represent actions requested by the outside world (buttons,
//! paired app, backend) that the
//! [`EmergencyController`](super::service::EmergencyController)
//! interprets and acts upon.

use crate::config::DeviceConfig;

use super::events::AlertSource;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Raise an emergency alert.
    TriggerEmergency(AlertSource),

    /// Return to normal, dropping any undelivered alert.
    ResetEmergency,

    /// Run the vibration motor once.
    Vibrate { duration_ms: u32 },

    /// Hot-reload configuration (validated before it is applied).
    UpdateConfig(DeviceConfig),
}
