//! Smart Classroom Watch firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  HardwareAdapter     LogEventSink   NvsAdapter  AlertOutbox │
//! │  (Button+Haptic)     (EventSink)    (Config)    (Delivery)  │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │        EmergencyController (pure logic)          │      │
//! │  │        FSM · alert retry · haptics               │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                                                            │
//! │  Gesture detectors · event queue · sync drain              │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{IOPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use classwatch::adapters::hardware::HardwareAdapter;
use classwatch::adapters::log_sink::LogEventSink;
use classwatch::adapters::nvs::NvsAdapter;
use classwatch::adapters::outbox::AlertOutbox;
use classwatch::adapters::time::UptimeClock;
use classwatch::app::commands::AppCommand;
use classwatch::app::events::AlertSource;
use classwatch::app::ports::ConfigPort;
use classwatch::app::service::EmergencyController;
use classwatch::config::DeviceConfig;
use classwatch::drivers::button::{Button, ButtonEvent, ButtonId, GestureDetector};
use classwatch::drivers::haptic::HapticMotor;
use classwatch::error::CommsError;
use classwatch::events::{self, push_event, Event};
use classwatch::pins;

/// Alerts buffered while the uplink is down.
const OUTBOX_CAPACITY: usize = 4;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Smart Classroom Watch v{}        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = EspDefaultNvsPartition::take()
        .map_err(anyhow::Error::from)
        .and_then(|p| NvsAdapter::new(p).map_err(|e| anyhow::anyhow!("{e}")));
    let config = match nvs.as_ref().map(|n| n.load()) {
        Ok(Ok(cfg)) => cfg,
        Ok(Err(e)) => {
            warn!("Stored config unusable ({}), using defaults", e);
            DeviceConfig::default()
        }
        Err(e) => {
            warn!("NVS unavailable ({}), running with defaults", e);
            DeviceConfig::default()
        }
    };
    info!(
        "Device {} / student {} | emergency endpoint {}",
        config.device_id,
        config.student_id,
        config.emergency_url()
    );

    // ── 3. Construct adapters ─────────────────────────────────
    // All buttons: momentary to GND, internal pull-up.
    let mut emergency = PinDriver::input(peripherals.pins.gpio0.downgrade())?;
    emergency.set_pull(Pull::Up)?;
    let mut select = PinDriver::input(peripherals.pins.gpio15.downgrade())?;
    select.set_pull(Pull::Up)?;
    let mut back = PinDriver::input(peripherals.pins.gpio2.downgrade())?;
    back.set_pull(Pull::Up)?;
    let motor = PinDriver::output(peripherals.pins.gpio25)?;
    info!(
        "Buttons on GPIO{}/{}/{}, motor on GPIO{}",
        pins::BTN_EMERGENCY_GPIO,
        pins::BTN_SELECT_GPIO,
        pins::BTN_BACK_GPIO,
        pins::VIBRATION_MOTOR_GPIO
    );

    let hw = HardwareAdapter::new(
        Button::active_low(emergency),
        Button::active_low(select),
        Button::active_low(back),
        HapticMotor::new(motor, FreeRtos),
    );

    let mut log_sink = LogEventSink::new();
    let mut outbox: AlertOutbox<OUTBOX_CAPACITY> = AlertOutbox::new();
    let clock = UptimeClock::new();

    // ── 4. Construct the controller ───────────────────────────
    let mut watch = EmergencyController::new(config.clone(), hw);
    watch.init(&mut log_sink);

    let mut emergency_gesture = GestureDetector::new(config.emergency_hold_ms);
    let mut back_gesture = GestureDetector::new(config.emergency_hold_ms);
    let mut select_gesture = GestureDetector::new(config.emergency_hold_ms);

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    let sync_ticks = config.ticks_for_ms(config.server_sync_interval_ms);
    let mut sync_counter: u64 = 0;

    loop {
        FreeRtos::delay_ms(watch.config().control_loop_interval_ms);
        push_event(Event::ControlTick);

        sync_counter += 1;
        if sync_counter >= sync_ticks {
            push_event(Event::SyncTick);
            sync_counter = 0;
        }

        // Button gestures.
        let now_ms = clock.uptime_ms();
        let samples = [
            (ButtonId::Emergency, &mut emergency_gesture),
            (ButtonId::Back, &mut back_gesture),
            (ButtonId::Select, &mut select_gesture),
        ];
        for (id, detector) in samples {
            let pressed = watch.is_button_pressed(id);
            match (id, detector.update(pressed, now_ms)) {
                (ButtonId::Emergency, Some(ButtonEvent::LongPress)) => {
                    push_event(Event::EmergencyLongPress);
                }
                (ButtonId::Back, Some(ButtonEvent::LongPress)) => {
                    push_event(Event::BackLongPress);
                }
                (ButtonId::Select, Some(ButtonEvent::ShortPress)) => {
                    push_event(Event::SelectShortPress);
                }
                _ => {}
            }
        }

        // Process all pending events.
        events::drain_events(|event| match event {
            Event::ControlTick => {
                watch.tick(&mut outbox, &mut log_sink);
            }

            Event::SyncTick => {
                let url = watch.config().emergency_url();
                let sent = outbox.drain(|alert| -> Result<(), CommsError> {
                    match serde_json::to_string(alert) {
                        Ok(body) => info!("UPLINK | POST {} {}", url, body),
                        Err(e) => warn!("UPLINK | alert #{} not encodable: {}", alert.sequence, e),
                    }
                    Ok(())
                });
                if sent > 0 {
                    info!("UPLINK | {} alert(s) flushed", sent);
                }
            }

            Event::EmergencyLongPress => {
                info!("Button: emergency long press → trigger");
                let cmd = AppCommand::TriggerEmergency(AlertSource::Button);
                if let Err(e) = watch.handle_command(cmd, &mut outbox, &mut log_sink) {
                    info!("Trigger ignored: {}", e);
                }
            }

            Event::BackLongPress => {
                info!("Button: back long press → reset");
                if let Err(e) = watch.handle_command(AppCommand::ResetEmergency, &mut outbox, &mut log_sink) {
                    error!("Reset failed: {}", e);
                }
            }

            Event::SelectShortPress => {
                watch.acknowledge();
            }
        });
    }
}
