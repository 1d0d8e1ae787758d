//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::AlertRaised(alert) => {
                warn!(
                    "ALERT | #{} raised by {:?} | device={} student={} | t={}ms",
                    alert.sequence, alert.source, alert.device_id, alert.student_id, alert.raised_at_ms,
                );
            }
            AppEvent::AlertRefused(reason) => {
                info!("ALERT | refused: {}", reason);
            }
            AppEvent::AlertDelivered { sequence } => {
                info!("ALERT | #{} queued for uplink", sequence);
            }
            AppEvent::AlertDeliveryFailed { sequence, error } => {
                warn!("ALERT | #{} not queued ({}), will retry", sequence, error);
            }
            AppEvent::ConfigUpdated => {
                info!("CONFIG | updated");
            }
        }
    }
}
