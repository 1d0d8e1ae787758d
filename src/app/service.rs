//! Emergency controller, the hexagonal core.
//!
//! [`EmergencyController`] owns the emergency state machine, its shared
//! context, and the button/haptic hardware port.  The alert uplink and the
//! event sink are injected at call sites, so the whole controller is
//! testable with mock adapters.
//!
//! ```text
//!  ButtonPort ──▶ ┌──────────────────────────┐ ──▶ AlertDeliveryPort
//!                 │   EmergencyController    │
//!  HapticPort ◀── │  FSM · alert retry       │ ──▶ EventSink
//!                 └──────────────────────────┘
//! ```
//!
//! The emergency state is owned here and nowhere else; callers observe it
//! through [`emergency_state`](EmergencyController::emergency_state) and
//! change it only through trigger / reset.

use log::{info, warn};

use crate::config::DeviceConfig;
use crate::drivers::button::ButtonId;
use crate::drivers::haptic::{HapticPattern, MAX_VIBRATION_MS};
use crate::error::{AlertError, Error};
use crate::fsm::context::EmergencyContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{EmergencyState, Fsm};

use super::commands::AppCommand;
use super::events::{AlertSource, AppEvent, EmergencyAlert};
use super::ports::{AlertDeliveryPort, ButtonPort, EventSink, HapticPort};

// ───────────────────────────────────────────────────────────────
// EmergencyController
// ───────────────────────────────────────────────────────────────

pub struct EmergencyController<HW> {
    fsm: Fsm,
    ctx: EmergencyContext,
    hw: HW,
    /// Raised alert the uplink has not yet accepted.
    pending: Option<EmergencyAlert>,
    /// Ticks since the pending alert was last offered.
    ticks_since_offer: u64,
    next_sequence: u32,
}

impl<HW: ButtonPort + HapticPort> EmergencyController<HW> {
    /// Construct the controller around its hardware port.
    ///
    /// Does **not** start the state machine; call [`init`](Self::init) next.
    pub fn new(config: DeviceConfig, hw: HW) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), EmergencyState::Normal),
            ctx: EmergencyContext::new(config),
            hw,
            pending: None,
            ticks_since_offer: 0,
            next_sequence: 1,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the controller in `Normal`.  Safe to call repeatedly; a second
    /// call drops any active alert without the cleared buzz.
    pub fn init(&mut self, sink: &mut impl EventSink) {
        self.fsm.restart_in(EmergencyState::Normal);
        self.fsm.start(&mut self.ctx);
        let _ = self.ctx.take_haptic();
        self.pending = None;
        self.ticks_since_offer = 0;
        sink.emit(&AppEvent::Started(EmergencyState::Normal));
        info!("EmergencyController initialised ({})", self.ctx.config.device_id);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current emergency state.
    pub fn emergency_state(&self) -> EmergencyState {
        self.fsm.current_state()
    }

    /// Raw level of the emergency button, no debounce.  `false` while the
    /// line sits at its pulled-up default.
    pub fn is_emergency_button_pressed(&mut self) -> bool {
        self.hw.is_pressed(ButtonId::Emergency)
    }

    /// Raw level of any button.
    pub fn is_button_pressed(&mut self, button: ButtonId) -> bool {
        self.hw.is_pressed(button)
    }

    /// The alert still waiting for the uplink, if any.
    pub fn pending_alert(&self) -> Option<&EmergencyAlert> {
        self.pending.as_ref()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.ctx.config
    }

    pub fn hardware(&self) -> &HW {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut HW {
        &mut self.hw
    }

    /// Uptime derived from the control tick count.
    pub fn uptime_ms(&self) -> u64 {
        self.ctx.total_ticks * u64::from(self.ctx.config.control_loop_interval_ms)
    }

    // ── Trigger / reset ───────────────────────────────────────

    /// Attempt to raise an alert.  Returns `true` when the controller moved
    /// to `Alert`; `false` leaves the state untouched.
    pub fn trigger_emergency_alert(
        &mut self,
        source: AlertSource,
        outbox: &mut impl AlertDeliveryPort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.try_trigger_emergency_alert(source, outbox, sink).is_ok()
    }

    /// Typed form of [`trigger_emergency_alert`](Self::trigger_emergency_alert).
    ///
    /// Refused while already alerting.  A delivery failure does not undo the
    /// alert: it stays pending and is re-offered from [`tick`](Self::tick).
    pub fn try_trigger_emergency_alert(
        &mut self,
        source: AlertSource,
        outbox: &mut impl AlertDeliveryPort,
        sink: &mut impl EventSink,
    ) -> Result<EmergencyAlert, AlertError> {
        let prev = self.fsm.current_state();
        if prev == EmergencyState::Alert {
            warn!("Emergency trigger ({:?}) refused: alert already active", source);
            sink.emit(&AppEvent::AlertRefused(AlertError::AlreadyActive));
            return Err(AlertError::AlreadyActive);
        }

        self.fsm.force_transition(EmergencyState::Alert, &mut self.ctx);

        let alert = EmergencyAlert::new(&self.ctx.config, self.next_sequence, source, self.uptime_ms());
        self.next_sequence = self.next_sequence.wrapping_add(1);

        sink.emit(&AppEvent::StateChanged {
            from: prev,
            to: EmergencyState::Alert,
        });
        sink.emit(&AppEvent::AlertRaised(alert.clone()));

        // Hand off before buzzing: the pattern blocks for over a second.
        self.offer(alert.clone(), outbox, sink);
        self.play_pending_haptics();

        Ok(alert)
    }

    /// Force the controller back to `Normal` from any state.
    pub fn reset_emergency_state(&mut self, sink: &mut impl EventSink) {
        let prev = self.fsm.current_state();
        self.fsm.force_transition(EmergencyState::Normal, &mut self.ctx);

        if let Some(alert) = self.pending.take() {
            warn!("Dropping undelivered alert #{}", alert.sequence);
        }
        self.ticks_since_offer = 0;

        if prev != EmergencyState::Normal {
            sink.emit(&AppEvent::StateChanged {
                from: prev,
                to: EmergencyState::Normal,
            });
        }
        self.play_pending_haptics();
    }

    // ── Haptics ───────────────────────────────────────────────

    /// Run the vibration motor for `duration_ms`.  Never fails: zero is a
    /// no-op and long requests are clamped to [`MAX_VIBRATION_MS`].
    pub fn vibrate(&mut self, duration_ms: u32) {
        if duration_ms == 0 {
            return;
        }
        self.hw.vibrate(duration_ms.min(MAX_VIBRATION_MS));
    }

    /// Wearer acknowledgement: a reminder buzz confirming the alert is
    /// still active.  Returns `false` (and stays silent) in `Normal`.
    pub fn acknowledge(&mut self) -> bool {
        if self.fsm.current_state() != EmergencyState::Alert {
            return false;
        }
        self.hw.play(HapticPattern::Reminder);
        true
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One control cycle: FSM step, pending-alert retry, haptic output.
    pub fn tick(&mut self, outbox: &mut impl AlertDeliveryPort, sink: &mut impl EventSink) {
        self.fsm.tick(&mut self.ctx);

        if self.pending.is_some() {
            self.ticks_since_offer += 1;
            let retry_ticks = self.ctx.config.ticks_for_ms(self.ctx.config.server_sync_interval_ms);
            if self.ticks_since_offer >= retry_ticks {
                if let Some(alert) = self.pending.take() {
                    info!("Retrying delivery of alert #{}", alert.sequence);
                    self.offer(alert, outbox, sink);
                }
            }
        }

        self.play_pending_haptics();
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (buttons, paired app, backend).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        outbox: &mut impl AlertDeliveryPort,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        match cmd {
            AppCommand::TriggerEmergency(source) => {
                self.try_trigger_emergency_alert(source, outbox, sink)?;
            }
            AppCommand::ResetEmergency => self.reset_emergency_state(sink),
            AppCommand::Vibrate { duration_ms } => self.vibrate(duration_ms),
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                self.ctx.config = new_config;
                sink.emit(&AppEvent::ConfigUpdated);
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    fn offer(
        &mut self,
        alert: EmergencyAlert,
        outbox: &mut impl AlertDeliveryPort,
        sink: &mut impl EventSink,
    ) {
        self.ticks_since_offer = 0;
        match outbox.deliver(&alert) {
            Ok(()) => {
                info!("Alert #{} handed to uplink", alert.sequence);
                sink.emit(&AppEvent::AlertDelivered {
                    sequence: alert.sequence,
                });
            }
            Err(error) => {
                warn!("Alert #{} delivery failed: {}", alert.sequence, error);
                sink.emit(&AppEvent::AlertDeliveryFailed {
                    sequence: alert.sequence,
                    error,
                });
                self.pending = Some(alert);
            }
        }
    }

    fn play_pending_haptics(&mut self) {
        if let Some(pattern) = self.ctx.take_haptic() {
            self.hw.play(pattern);
        }
    }
}
