//! Vibration motor driver.
//!
//! A coin ERM motor switched by an N-MOSFET on a digital output.  Pulses
//! are blocking: the motor pin is driven HIGH, the caller's delay provider
//! sleeps for the pulse length, and the pin is driven LOW again.
//!
//! ## Safety contract
//!
//! A pulse never fails from the caller's point of view.  GPIO write errors
//! are logged, the pulse is skipped, and a best-effort LOW is written so a
//! stuck-on motor does not drain the battery.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use log::{debug, warn};

/// Longest single pulse; longer requests are clamped.
pub const MAX_VIBRATION_MS: u32 = 5_000;

/// Named vibration patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    /// Emergency raised: three strong pulses.
    AlertRaised,
    /// Periodic nudge while an alert stays active.
    Reminder,
    /// Emergency reset: one short tick.
    Cleared,
}

impl HapticPattern {
    /// `(on_ms, off_ms)` steps.
    pub fn steps(self) -> &'static [(u32, u32)] {
        match self {
            Self::AlertRaised => &[(300, 150), (300, 150), (300, 0)],
            Self::Reminder => &[(150, 0)],
            Self::Cleared => &[(80, 0)],
        }
    }

    /// Relative importance when two requests collide.
    pub fn priority(self) -> u8 {
        match self {
            Self::AlertRaised => 2,
            Self::Cleared => 1,
            Self::Reminder => 0,
        }
    }
}

pub struct HapticMotor<P, D> {
    pin: P,
    delay: D,
    /// Total on-time driven since construction (milliseconds).
    on_time_ms: u64,
}

impl<P: OutputPin, D: DelayNs> HapticMotor<P, D> {
    /// Take ownership of the motor pin and force it LOW.
    pub fn new(mut pin: P, delay: D) -> Self {
        if let Err(e) = pin.set_low() {
            warn!("haptic: initial set_low failed ({:?})", e.kind());
        }
        Self {
            pin,
            delay,
            on_time_ms: 0,
        }
    }

    /// Run the motor for `duration_ms` (clamped to [`MAX_VIBRATION_MS`]),
    /// blocking for the pulse length.  Zero is a no-op.
    pub fn pulse(&mut self, duration_ms: u32) {
        if duration_ms == 0 {
            return;
        }
        let duration_ms = duration_ms.min(MAX_VIBRATION_MS);

        if let Err(e) = self.pin.set_high() {
            warn!("haptic: set_high failed ({:?}), pulse skipped", e.kind());
            let _ = self.pin.set_low();
            return;
        }
        self.delay.delay_ms(duration_ms);
        if let Err(e) = self.pin.set_low() {
            warn!("haptic: set_low failed ({:?})", e.kind());
        }

        self.on_time_ms += u64::from(duration_ms);
        debug!("haptic: {} ms pulse", duration_ms);
    }

    /// Motor off for `duration_ms`.
    pub fn rest(&mut self, duration_ms: u32) {
        if duration_ms > 0 {
            self.delay.delay_ms(duration_ms);
        }
    }

    pub fn play(&mut self, pattern: HapticPattern) {
        for &(on_ms, off_ms) in pattern.steps() {
            self.pulse(on_ms);
            self.rest(off_ms);
        }
    }

    pub fn on_time_ms(&self) -> u64 {
        self.on_time_ms
    }
}
