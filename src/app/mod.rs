//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the watch's emergency
//! feature: the alert state machine, alert delivery with retry, and the
//! haptic feedback that goes with it.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
