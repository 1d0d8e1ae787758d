//! Integration tests for the EmergencyController → FSM → haptics / uplink
//! pipeline.
//!
//! These run on the host and drive the controller the way the main loop
//! does: commands, control ticks and button gestures, with mock adapters
//! recording every motor pulse, delivery attempt and event.

use crate::mock_hw::{LogSink, MockHardware, MockUplink};

use classwatch::app::commands::AppCommand;
use classwatch::app::events::{AlertSource, AppEvent};
use classwatch::app::service::EmergencyController;
use classwatch::config::DeviceConfig;
use classwatch::drivers::button::{ButtonEvent, ButtonId, GestureDetector};
use classwatch::error::{AlertError, CommsError, Error};
use classwatch::fsm::EmergencyState;

/// Control ticks per server-sync period with the factory config.
const SYNC_TICKS: usize = 30_000 / 50;
/// Control ticks per reminder period with the factory config.
const REMINDER_TICKS: usize = 30 * 1_000 / 50;

fn make_watch() -> (EmergencyController<MockHardware>, MockUplink, LogSink) {
    let mut watch = EmergencyController::new(DeviceConfig::default(), MockHardware::new());
    let mut sink = LogSink::new();
    watch.init(&mut sink);
    (watch, MockUplink::default(), sink)
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn init_starts_normal_with_button_released() {
    let (mut watch, _, sink) = make_watch();
    assert_eq!(watch.emergency_state(), EmergencyState::Normal);
    assert!(!watch.is_emergency_button_pressed());
    assert_eq!(sink.events, vec![AppEvent::Started(EmergencyState::Normal)]);
}

#[test]
fn button_query_follows_the_line_without_side_effects() {
    let (mut watch, _, _) = make_watch();
    watch.hardware_mut().emergency_down = true;
    assert!(watch.is_emergency_button_pressed());
    assert_eq!(watch.emergency_state(), EmergencyState::Normal);
}

// ── Trigger ───────────────────────────────────────────────────

#[test]
fn trigger_enters_alert_and_buzzes() {
    let (mut watch, mut uplink, mut sink) = make_watch();

    assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink));
    assert_ne!(watch.emergency_state(), EmergencyState::Normal);
    assert_eq!(watch.hardware().pulses(), vec![300, 300, 300]);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::StateChanged {
                from: EmergencyState::Normal,
                to: EmergencyState::Alert
            }
        )),
        1
    );
}

#[test]
fn second_trigger_is_refused_and_state_unchanged() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink));
    let before = watch.emergency_state();
    let pulses = watch.hardware().pulses().len();

    assert!(!watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink));
    assert_eq!(watch.emergency_state(), before);
    assert_eq!(watch.hardware().pulses().len(), pulses, "no second alert buzz");
    assert_eq!(uplink.attempts, vec![1], "refused trigger must not reach the uplink");
    assert_eq!(
        sink.count(|e| *e == AppEvent::AlertRefused(AlertError::AlreadyActive)),
        1
    );
}

#[test]
fn trigger_command_reports_already_active() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    let cmd = AppCommand::TriggerEmergency(AlertSource::Remote);
    assert_eq!(watch.handle_command(cmd.clone(), &mut uplink, &mut sink), Ok(()));
    assert_eq!(
        watch.handle_command(cmd, &mut uplink, &mut sink),
        Err(Error::Alert(AlertError::AlreadyActive))
    );
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_returns_to_normal_with_cleared_buzz() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink);
    watch.reset_emergency_state(&mut sink);

    assert_eq!(watch.emergency_state(), EmergencyState::Normal);
    assert_eq!(watch.hardware().pulses().last(), Some(&80));
}

#[test]
fn reset_in_normal_is_silent() {
    let (mut watch, _, mut sink) = make_watch();
    watch.reset_emergency_state(&mut sink);

    assert_eq!(watch.emergency_state(), EmergencyState::Normal);
    assert!(watch.hardware().pulses().is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::StateChanged { .. })), 0);
}

#[test]
fn trigger_reset_scenario_repeats() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    for round in 1..=2 {
        assert_eq!(watch.emergency_state(), EmergencyState::Normal, "round {round}");
        assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink));
        assert_ne!(watch.emergency_state(), EmergencyState::Normal);
        watch.reset_emergency_state(&mut sink);
        assert_eq!(watch.emergency_state(), EmergencyState::Normal);
    }
    let sequences: Vec<u32> = uplink.accepted.iter().map(|a| a.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
}

// ── Vibrate ───────────────────────────────────────────────────

#[test]
fn vibrate_is_infallible() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    watch.vibrate(100);
    watch.vibrate(0);
    watch.vibrate(u32::MAX);
    assert_eq!(
        watch.handle_command(AppCommand::Vibrate { duration_ms: 250 }, &mut uplink, &mut sink),
        Ok(())
    );
    assert_eq!(watch.hardware().pulses(), vec![100, 5_000, 250]);
    assert_eq!(watch.emergency_state(), EmergencyState::Normal);
}

// ── Reminders ─────────────────────────────────────────────────

#[test]
fn reminder_buzz_once_per_period_while_alerting() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink);

    for _ in 0..REMINDER_TICKS - 1 {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(watch.hardware().pulses(), vec![300, 300, 300]);

    watch.tick(&mut uplink, &mut sink);
    assert_eq!(watch.hardware().pulses(), vec![300, 300, 300, 150]);

    for _ in 0..REMINDER_TICKS {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(watch.hardware().pulses().len(), 5);
}

#[test]
fn no_reminders_in_normal() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    for _ in 0..REMINDER_TICKS * 2 {
        watch.tick(&mut uplink, &mut sink);
    }
    assert!(watch.hardware().pulses().is_empty());
}

// ── Delivery ──────────────────────────────────────────────────

#[test]
fn alert_offered_once_when_uplink_accepts() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink);
    for _ in 0..SYNC_TICKS * 3 {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(uplink.attempts, vec![1]);
    assert!(watch.pending_alert().is_none());
    assert_eq!(sink.count(|e| *e == AppEvent::AlertDelivered { sequence: 1 }), 1);

    let alert = &uplink.accepted[0];
    assert_eq!(alert.device_id.as_str(), "WATCH_001");
    assert_eq!(alert.student_id.as_str(), "STU_2024_001");
    assert_eq!(alert.source, AlertSource::Button);
}

#[test]
fn failed_delivery_keeps_alert_and_retries_at_sync_cadence() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    uplink.offline = true;

    assert!(watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink));
    assert_eq!(watch.emergency_state(), EmergencyState::Alert);
    assert_eq!(watch.pending_alert().map(|a| a.sequence), Some(1));
    assert_eq!(
        sink.count(|e| *e
            == AppEvent::AlertDeliveryFailed {
                sequence: 1,
                error: CommsError::Offline
            }),
        1
    );

    for _ in 0..SYNC_TICKS - 1 {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(uplink.attempts, vec![1]);

    watch.tick(&mut uplink, &mut sink);
    assert_eq!(uplink.attempts, vec![1, 1]);

    uplink.offline = false;
    for _ in 0..SYNC_TICKS {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(uplink.attempts, vec![1, 1, 1]);
    assert_eq!(uplink.accepted.len(), 1);
    assert!(watch.pending_alert().is_none());
}

#[test]
fn reset_drops_undelivered_alert() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    uplink.offline = true;
    watch.trigger_emergency_alert(AlertSource::Button, &mut uplink, &mut sink);
    watch.reset_emergency_state(&mut sink);
    assert!(watch.pending_alert().is_none());

    uplink.offline = false;
    for _ in 0..SYNC_TICKS * 2 {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(uplink.attempts, vec![1]);
    assert!(uplink.accepted.is_empty());
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn invalid_config_update_is_rejected() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    let bad = DeviceConfig {
        emergency_hold_ms: 50,
        ..Default::default()
    };
    let result = watch.handle_command(AppCommand::UpdateConfig(bad), &mut uplink, &mut sink);
    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(*watch.config(), DeviceConfig::default());
    assert_eq!(sink.count(|e| *e == AppEvent::ConfigUpdated), 0);
}

#[test]
fn config_update_changes_retry_cadence() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    let fast = DeviceConfig {
        server_sync_interval_ms: 1_000,
        ..Default::default()
    };
    watch
        .handle_command(AppCommand::UpdateConfig(fast), &mut uplink, &mut sink)
        .unwrap();
    assert_eq!(sink.count(|e| *e == AppEvent::ConfigUpdated), 1);

    uplink.offline = true;
    watch.trigger_emergency_alert(AlertSource::Remote, &mut uplink, &mut sink);
    for _ in 0..20 {
        watch.tick(&mut uplink, &mut sink);
    }
    assert_eq!(uplink.attempts.len(), 2, "1 s sync at 50 ms ticks retries after 20 ticks");
}

// ── Gesture path ──────────────────────────────────────────────

/// Run the main-loop gesture wiring for one sample.
fn step(
    watch: &mut EmergencyController<MockHardware>,
    emergency: &mut GestureDetector,
    back: &mut GestureDetector,
    now_ms: u32,
    uplink: &mut MockUplink,
    sink: &mut LogSink,
) {
    let pressed = watch.is_button_pressed(ButtonId::Emergency);
    if emergency.update(pressed, now_ms) == Some(ButtonEvent::LongPress) {
        let _ = watch.handle_command(AppCommand::TriggerEmergency(AlertSource::Button), uplink, sink);
    }
    let pressed = watch.is_button_pressed(ButtonId::Back);
    if back.update(pressed, now_ms) == Some(ButtonEvent::LongPress) {
        let _ = watch.handle_command(AppCommand::ResetEmergency, uplink, sink);
    }
    watch.tick(uplink, sink);
}

#[test]
fn holding_emergency_raises_alert_and_holding_back_clears_it() {
    let (mut watch, mut uplink, mut sink) = make_watch();
    let hold = watch.config().emergency_hold_ms;
    let mut emergency = GestureDetector::new(hold);
    let mut back = GestureDetector::new(hold);
    let mut now = 0u32;

    // Short tap: no alert.
    watch.hardware_mut().emergency_down = true;
    for _ in 0..4 {
        step(&mut watch, &mut emergency, &mut back, now, &mut uplink, &mut sink);
        now += 50;
    }
    watch.hardware_mut().emergency_down = false;
    step(&mut watch, &mut emergency, &mut back, now, &mut uplink, &mut sink);
    now += 50;
    assert_eq!(watch.emergency_state(), EmergencyState::Normal);

    // Full hold: alert while still held, exactly once.
    watch.hardware_mut().emergency_down = true;
    for _ in 0..(hold / 50 + 10) {
        step(&mut watch, &mut emergency, &mut back, now, &mut uplink, &mut sink);
        now += 50;
    }
    assert_eq!(watch.emergency_state(), EmergencyState::Alert);
    assert_eq!(uplink.attempts, vec![1]);
    watch.hardware_mut().emergency_down = false;

    // Back hold: cleared.
    watch.hardware_mut().back_down = true;
    for _ in 0..(hold / 50 + 2) {
        step(&mut watch, &mut emergency, &mut back, now, &mut uplink, &mut sink);
        now += 50;
    }
    assert_eq!(watch.emergency_state(), EmergencyState::Normal);
}
