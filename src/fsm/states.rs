//! Concrete state handler functions and table builder.
//!
//! ```text
//!            [trigger ok]
//!  NORMAL ─────────────────▶ ALERT ──┐
//!    ▲  │                      │     │ [every reminder period]
//!    │  └─[trigger refused]─┐  │     │  reminder buzz
//!    │                      │  │ ◀───┘
//!    └──────────[reset]─────┴──┘
//! ```
//!
//! Trigger and reset are commands applied through
//! [`Fsm::force_transition`](super::Fsm::force_transition); the update
//! handlers only produce time-driven outputs.

use super::context::EmergencyContext;
use super::{EmergencyState, StateDescriptor};
use crate::drivers::haptic::HapticPattern;
use log::{info, warn};

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; EmergencyState::COUNT] {
    [
        // Index 0: Normal
        StateDescriptor {
            id: EmergencyState::Normal,
            name: "Normal",
            on_enter: Some(normal_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 1: Alert
        StateDescriptor {
            id: EmergencyState::Alert,
            name: "Alert",
            on_enter: Some(alert_enter),
            on_exit: Some(alert_exit),
            on_update: alert_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL
// ═══════════════════════════════════════════════════════════════════════════

fn normal_enter(_ctx: &mut EmergencyContext) {
    info!("NORMAL: emergency monitoring armed");
}

fn normal_update(_ctx: &mut EmergencyContext) -> Option<EmergencyState> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALERT
// ═══════════════════════════════════════════════════════════════════════════

fn alert_enter(ctx: &mut EmergencyContext) {
    ctx.request_haptic(HapticPattern::AlertRaised);
    warn!(
        "ALERT: emergency raised by {} ({})",
        ctx.config.student_id, ctx.config.device_id
    );
}

fn alert_exit(ctx: &mut EmergencyContext) {
    ctx.request_haptic(HapticPattern::Cleared);
    info!("ALERT: cleared after {} ticks", ctx.ticks_in_state);
}

fn alert_update(ctx: &mut EmergencyContext) -> Option<EmergencyState> {
    let period = ctx.reminder_period_ticks();
    if ctx.ticks_in_state > 0 && ctx.ticks_in_state % period == 0 {
        ctx.request_haptic(HapticPattern::Reminder);
    }
    None
}
