//! GPIO / peripheral pin assignments for the watch main board (ESP32-WROOM).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Emergency / SOS button.  Shares GPIO0 with the boot strap, which is
/// pulled up, so the idle level is HIGH.
pub const BTN_EMERGENCY_GPIO: i32 = 0;
/// Menu select button.
pub const BTN_SELECT_GPIO: i32 = 15;
/// Menu back button.  Long press cancels an active emergency.
pub const BTN_BACK_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Haptics
// ---------------------------------------------------------------------------

/// Coin vibration motor, driven through an N-MOSFET (active HIGH).
pub const VIBRATION_MOTOR_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Analog
// ---------------------------------------------------------------------------

/// Battery voltage divider (ADC1, input-only pin).
pub const BATTERY_GPIO: i32 = 34;

// ---------------------------------------------------------------------------
// I²C bus (OLED, heart-rate sensor, IMU)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

/// SSD1306 128x64 OLED.
pub const SCREEN_WIDTH: u16 = 128;
pub const SCREEN_HEIGHT: u16 = 64;
pub const SCREEN_I2C_ADDRESS: u8 = 0x3C;
/// OLED shares the board reset line (no dedicated GPIO).
pub const OLED_RESET_GPIO: i32 = -1;

// ---------------------------------------------------------------------------
// NFC (PN532)
// ---------------------------------------------------------------------------

pub const NFC_IRQ_GPIO: i32 = 4;
pub const NFC_RESET_GPIO: i32 = 3;
