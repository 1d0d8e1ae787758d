//! Main-loop event queue.
//!
//! Events are produced by:
//! - the control timer (FSM tick, uplink sync)
//! - the button gesture detectors (long / short presses)
//!
//! The main loop drains them in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Loop timer  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Gestures    │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Ring capacity; one slot stays free to tell full from empty.
const EVENT_QUEUE_CAP: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    // ── Timers ────────────────────────────────────────────
    /// Control loop period elapsed.
    ControlTick        = 1,
    /// Server sync period elapsed; flush the alert outbox.
    SyncTick           = 2,

    // ── User input ────────────────────────────────────────
    /// Emergency button held past the hold threshold.
    EmergencyLongPress = 10,
    /// Back button held; clears an active alert.
    BackLongPress      = 11,
    /// Select button tapped.
    SelectShortPress   = 12,
}

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// One producer, one consumer.  Slots are atomics so the buffer can live
// in a plain static.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
static EVENT_BUFFER: [AtomicU8; EVENT_QUEUE_CAP] = [const { AtomicU8::new(0) }; EVENT_QUEUE_CAP];

/// Push an event.  Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false;
    }

    EVENT_BUFFER[head as usize].store(event as u8, Ordering::Relaxed);
    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event, `None` when empty.
pub fn pop_event() -> Option<Event> {
    loop {
        let tail = EVENT_TAIL.load(Ordering::Relaxed);
        let head = EVENT_HEAD.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let raw = EVENT_BUFFER[tail as usize].load(Ordering::Relaxed);
        EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

        // Unknown bytes are skipped.
        if let Some(event) = event_from_u8(raw) {
            return Some(event);
        }
    }
}

/// Drain all pending events into a callback, FIFO.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}

fn event_from_u8(raw: u8) -> Option<Event> {
    match raw {
        1  => Some(Event::ControlTick),
        2  => Some(Event::SyncTick),
        10 => Some(Event::EmergencyLongPress),
        11 => Some(Event::BackLongPress),
        12 => Some(Event::SelectShortPress),
        _  => None,
    }
}
