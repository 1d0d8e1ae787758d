//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                  |
//! |------------|--------------------|------------------------------|
//! | `hardware` | ButtonPort         | Button GPIOs (pull-up)       |
//! |            | HapticPort         | Vibration motor GPIO         |
//! | `log_sink` | EventSink          | Serial log output            |
//! | `nvs`      | ConfigPort         | NVS / in-memory store        |
//! | `outbox`   | AlertDeliveryPort  | Bounded queue to the uplink  |
//! | `time`     |                    | ESP32 system timer           |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod outbox;
pub mod time;
