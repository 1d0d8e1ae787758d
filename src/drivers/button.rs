//! Push-button driver with polled debounce and short/long press detection.
//!
//! ## Hardware
//!
//! All watch buttons are momentary switches to ground with the internal
//! pull-up enabled, so the idle line reads HIGH and a press reads LOW.
//! [`Button`] wraps any `embedded-hal` [`InputPin`] and reports the raw
//! level; [`GestureDetector`] is fed one sample per control tick and
//! classifies presses.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                                 | Event        |
//! |-------------|-------------------------------------------|--------------|
//! | Short press | Stable press, released before hold time   | `ShortPress` |
//! | Long press  | Held continuously for the hold time       | `LongPress`  |
//!
//! A long press fires while the button is still held (the wearer feels the
//! alert buzz without having to let go) and fires only once per hold.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::error::HwError;

/// Minimum stable time before a press is believed.
pub const DEBOUNCE_MS: u32 = 30;

/// Logical button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Emergency,
    Select,
    Back,
}

// ---------------------------------------------------------------------------
// Level reader
// ---------------------------------------------------------------------------

pub struct Button<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> Button<P> {
    /// Button that pulls the line LOW when pressed (the watch default).
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Read the current, undebounced pressed state.
    pub fn read(&mut self) -> Result<bool, HwError> {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        level.map_err(|e| {
            warn!("button: GPIO read failed ({:?})", e.kind());
            HwError::GpioReadFailed
        })
    }

    /// Current pressed state; a failed read counts as not pressed.
    pub fn is_pressed(&mut self) -> bool {
        self.read().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Gesture detector
// ---------------------------------------------------------------------------

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    /// Long press already reported; wait for release.
    LongReported,
}

pub struct GestureDetector {
    state: GestureState,
    long_press_ms: u32,
}

impl GestureDetector {
    pub fn new(long_press_ms: u32) -> Self {
        Self {
            state: GestureState::Idle,
            long_press_ms: long_press_ms.max(DEBOUNCE_MS),
        }
    }

    /// Feed one level sample.  `now_ms` is monotonic milliseconds
    /// (wrapping arithmetic, so u32 rollover is harmless).
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if !pressed {
                    // Bounce, never stable long enough.
                    self.state = GestureState::Idle;
                } else if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms };
                    return self.check_long(since_ms, now_ms);
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if !pressed {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                self.check_long(since_ms, now_ms)
            }

            GestureState::LongReported => {
                if !pressed {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }

    /// True while a press is being tracked.
    pub fn is_busy(&self) -> bool {
        self.state != GestureState::Idle
    }

    fn check_long(&mut self, since_ms: u32, now_ms: u32) -> Option<ButtonEvent> {
        if now_ms.wrapping_sub(since_ms) >= self.long_press_ms {
            self.state = GestureState::LongReported;
            Some(ButtonEvent::LongPress)
        } else {
            None
        }
    }
}
