//! Hardware adapter: bridges the watch peripherals to domain port traits.
//!
//! Owns the three buttons and the vibration motor, exposing them through
//! [`ButtonPort`] and [`HapticPort`].  Generic over `embedded-hal` pins so
//! the same adapter runs on ESP-IDF `PinDriver`s and on host mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ButtonPort, HapticPort};
use crate::drivers::button::{Button, ButtonId};
use crate::drivers::haptic::{HapticMotor, HapticPattern};

pub struct HardwareAdapter<I, O, D> {
    emergency: Button<I>,
    select: Button<I>,
    back: Button<I>,
    motor: HapticMotor<O, D>,
}

impl<I: InputPin, O: OutputPin, D: DelayNs> HardwareAdapter<I, O, D> {
    pub fn new(emergency: Button<I>, select: Button<I>, back: Button<I>, motor: HapticMotor<O, D>) -> Self {
        Self {
            emergency,
            select,
            back,
            motor,
        }
    }

    /// Total motor on-time since boot.
    pub fn motor_on_time_ms(&self) -> u64 {
        self.motor.on_time_ms()
    }
}

// ── ButtonPort implementation ─────────────────────────────────

impl<I: InputPin, O: OutputPin, D: DelayNs> ButtonPort for HardwareAdapter<I, O, D> {
    fn is_pressed(&mut self, button: ButtonId) -> bool {
        match button {
            ButtonId::Emergency => self.emergency.is_pressed(),
            ButtonId::Select => self.select.is_pressed(),
            ButtonId::Back => self.back.is_pressed(),
        }
    }
}

// ── HapticPort implementation ─────────────────────────────────

impl<I: InputPin, O: OutputPin, D: DelayNs> HapticPort for HardwareAdapter<I, O, D> {
    fn vibrate(&mut self, duration_ms: u32) {
        self.motor.pulse(duration_ms);
    }

    fn pause(&mut self, duration_ms: u32) {
        self.motor.rest(duration_ms);
    }

    fn play(&mut self, pattern: HapticPattern) {
        self.motor.play(pattern);
    }
}
