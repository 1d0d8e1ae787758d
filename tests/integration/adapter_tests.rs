//! Integration tests wiring the controller to the real adapters.
//!
//! `HardwareAdapter` runs over `embedded-hal` pin mocks, alerts go through
//! the bounded `AlertOutbox`, and configuration round-trips through the
//! in-memory `NvsAdapter` backend.

use core::convert::Infallible;
use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use classwatch::adapters::hardware::HardwareAdapter;
use classwatch::adapters::log_sink::LogEventSink;
use classwatch::adapters::nvs::NvsAdapter;
use classwatch::adapters::outbox::AlertOutbox;
use classwatch::app::events::AlertSource;
use classwatch::app::ports::ConfigPort;
use classwatch::app::service::EmergencyController;
use classwatch::config::DeviceConfig;
use classwatch::drivers::button::Button;
use classwatch::drivers::haptic::HapticMotor;
use classwatch::error::CommsError;
use classwatch::fsm::EmergencyState;

// ── Pin mocks ─────────────────────────────────────────────────

/// Input line whose level the test can flip after the adapter owns it.
#[derive(Clone)]
struct SharedLine(Rc<Cell<bool>>);

impl ErrorType for SharedLine {
    type Error = Infallible;
}

impl InputPin for SharedLine {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

struct MotorPin;

impl ErrorType for MotorPin {
    type Error = Infallible;
}

impl OutputPin for MotorPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

type Hw = HardwareAdapter<SharedLine, MotorPin, NoDelay>;

fn make_watch(config: DeviceConfig) -> (EmergencyController<Hw>, Rc<Cell<bool>>) {
    // Pulled up: HIGH at rest.
    let emergency = Rc::new(Cell::new(true));
    let hw = HardwareAdapter::new(
        Button::active_low(SharedLine(emergency.clone())),
        Button::active_low(SharedLine(Rc::new(Cell::new(true)))),
        Button::active_low(SharedLine(Rc::new(Cell::new(true)))),
        HapticMotor::new(MotorPin, NoDelay),
    );
    let mut watch = EmergencyController::new(config, hw);
    watch.init(&mut LogEventSink::new());
    (watch, emergency)
}

// ── Hardware adapter ──────────────────────────────────────────

#[test]
fn emergency_line_level_maps_to_pressed() {
    let (mut watch, line) = make_watch(DeviceConfig::default());
    assert!(!watch.is_emergency_button_pressed());
    line.set(false);
    assert!(watch.is_emergency_button_pressed());
    line.set(true);
    assert!(!watch.is_emergency_button_pressed());
}

#[test]
fn motor_time_covers_alert_and_clear_patterns() {
    let (mut watch, _) = make_watch(DeviceConfig::default());
    let mut outbox: AlertOutbox<4> = AlertOutbox::new();
    let mut sink = LogEventSink::new();

    watch.trigger_emergency_alert(AlertSource::Button, &mut outbox, &mut sink);
    assert_eq!(watch.hardware().motor_on_time_ms(), 900);
    watch.reset_emergency_state(&mut sink);
    assert_eq!(watch.hardware().motor_on_time_ms(), 980);
}

// ── Outbox ────────────────────────────────────────────────────

#[test]
fn alerts_queue_in_outbox_until_drained() {
    let (mut watch, _) = make_watch(DeviceConfig::default());
    let mut outbox: AlertOutbox<4> = AlertOutbox::new();
    let mut sink = LogEventSink::new();

    for _ in 0..3 {
        assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut outbox, &mut sink));
        watch.reset_emergency_state(&mut sink);
    }
    assert_eq!(outbox.len(), 3);

    let mut bodies = Vec::new();
    let sent = outbox.drain(|alert| -> Result<(), CommsError> {
        bodies.push(serde_json::to_string(alert).unwrap());
        Ok(())
    });
    assert_eq!(sent, 3);
    assert!(outbox.is_empty());
    assert!(bodies[0].contains("\"sequence\":1"));
    assert!(bodies[2].contains("\"student_id\":\"STU_2024_001\""));
}

#[test]
fn full_outbox_leaves_alert_pending_until_space_frees() {
    let config = DeviceConfig {
        server_sync_interval_ms: 1_000,
        ..Default::default()
    };
    let retry_ticks = (config.server_sync_interval_ms / config.control_loop_interval_ms) as usize;
    let (mut watch, _) = make_watch(config);
    let mut outbox: AlertOutbox<1> = AlertOutbox::new();
    let mut sink = LogEventSink::new();

    assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut outbox, &mut sink));
    watch.reset_emergency_state(&mut sink);
    assert_eq!(outbox.len(), 1);

    // Outbox full: the alert is still raised, but stays with the controller.
    assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut outbox, &mut sink));
    assert_eq!(watch.emergency_state(), EmergencyState::Alert);
    assert_eq!(watch.pending_alert().map(|a| a.sequence), Some(2));

    let _ = outbox.drain(|_| -> Result<(), CommsError> { Ok(()) });
    for _ in 0..retry_ticks {
        watch.tick(&mut outbox, &mut sink);
    }
    assert!(watch.pending_alert().is_none());
    assert_eq!(outbox.peek().map(|a| a.sequence), Some(2));
}

// ── NVS ───────────────────────────────────────────────────────

#[test]
fn saved_config_drives_a_fresh_controller() {
    let mut nvs = NvsAdapter::new().unwrap();
    let config = DeviceConfig {
        alert_reminder_interval_secs: 5,
        ..Default::default()
    };
    nvs.save(&config).unwrap();

    let loaded = nvs.load().unwrap();
    assert_eq!(loaded, config);

    let (mut watch, _) = make_watch(loaded);
    let mut outbox: AlertOutbox<4> = AlertOutbox::new();
    let mut sink = LogEventSink::new();
    watch.trigger_emergency_alert(AlertSource::Button, &mut outbox, &mut sink);

    // 5 s reminder at 50 ms ticks.
    for _ in 0..100 {
        watch.tick(&mut outbox, &mut sink);
    }
    assert_eq!(watch.hardware().motor_on_time_ms(), 900 + 150);
}
