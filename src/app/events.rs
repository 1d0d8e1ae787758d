//! Outbound application events and the alert record.
//!
//! The [`EmergencyController`](super::service::EmergencyController) emits
//! [`AppEvent`]s through the [`EventSink`](super::ports::EventSink) port
//! and hands [`EmergencyAlert`]s to the
//! [`AlertDeliveryPort`](super::ports::AlertDeliveryPort).

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::DeviceConfig;
use crate::error::{AlertError, CommsError};
use crate::fsm::EmergencyState;

/// What raised the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSource {
    /// Wearer held the emergency button.
    Button,
    /// Command from a paired app or the backend.
    Remote,
}

/// One raised emergency, as handed to the uplink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAlert {
    /// Per-boot counter, starts at 1.
    pub sequence: u32,
    pub device_id: String<16>,
    pub student_id: String<16>,
    pub source: AlertSource,
    /// Controller uptime when the alert was raised.
    pub raised_at_ms: u64,
}

impl EmergencyAlert {
    pub fn new(config: &DeviceConfig, sequence: u32, source: AlertSource, raised_at_ms: u64) -> Self {
        Self {
            sequence,
            device_id: config.device_id.clone(),
            student_id: config.student_id.clone(),
            source,
            raised_at_ms,
        }
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller was (re)initialised in the given state.
    Started(EmergencyState),

    /// The emergency state changed.
    StateChanged {
        from: EmergencyState,
        to: EmergencyState,
    },

    /// A new alert was raised.
    AlertRaised(EmergencyAlert),

    /// A trigger was refused; state is unchanged.
    AlertRefused(AlertError),

    /// The uplink accepted the alert.
    AlertDelivered { sequence: u32 },

    /// The uplink rejected the alert; it stays pending.
    AlertDeliveryFailed { sequence: u32, error: CommsError },

    /// Runtime configuration replaced.
    ConfigUpdated,
}
