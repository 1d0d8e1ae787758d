//! Input and actuator drivers built on `embedded-hal` traits.

pub mod button;
pub mod haptic;
