//! Shared mutable context threaded through every FSM handler.
//!
//! `EmergencyContext` is the blackboard state handlers read from and
//! write to: timing, configuration, and the haptic request that the
//! controller plays after each step.

use crate::config::DeviceConfig;
use crate::drivers::haptic::HapticPattern;

/// The shared context passed to every state handler function.
pub struct EmergencyContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Configuration --
    pub config: DeviceConfig,

    // -- Outputs --
    /// Haptic pattern requested by the last handler, consumed by the
    /// controller after the FSM step.
    haptic: Option<HapticPattern>,
}

impl EmergencyContext {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            config,
            haptic: None,
        }
    }

    /// Request a haptic pattern.  A pending request of higher priority is
    /// kept, so a reminder never masks the alert-raised buzz.
    pub fn request_haptic(&mut self, pattern: HapticPattern) {
        match self.haptic {
            Some(pending) if pending.priority() > pattern.priority() => {}
            _ => self.haptic = Some(pattern),
        }
    }

    /// Take the pending haptic request, leaving none.
    pub fn take_haptic(&mut self) -> Option<HapticPattern> {
        self.haptic.take()
    }

    /// Control ticks between reminder buzzes while alerting.
    pub fn reminder_period_ticks(&self) -> u64 {
        let ms = u32::from(self.config.alert_reminder_interval_secs).saturating_mul(1000);
        self.config.ticks_for_ms(ms)
    }
}
