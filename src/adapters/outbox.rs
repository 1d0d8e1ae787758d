//! Bounded alert outbox.
//!
//! Implements [`AlertDeliveryPort`] as a fixed-capacity FIFO.  The main
//! loop drains it at the server-sync cadence and hands each alert to the
//! uplink.  A full outbox refuses new alerts so the controller keeps them
//! pending and retries.

use heapless::Deque;
use log::debug;

use crate::app::events::EmergencyAlert;
use crate::app::ports::AlertDeliveryPort;
use crate::error::CommsError;

pub struct AlertOutbox<const N: usize> {
    queue: Deque<EmergencyAlert, N>,
}

impl<const N: usize> Default for AlertOutbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AlertOutbox<N> {
    pub fn new() -> Self {
        Self { queue: Deque::new() }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Oldest queued alert, if any.
    pub fn peek(&self) -> Option<&EmergencyAlert> {
        self.queue.front()
    }

    /// Hand every queued alert to `send`, oldest first.  An alert whose
    /// send fails goes back to the front and draining stops.  Returns the
    /// number of alerts sent.
    pub fn drain<E>(&mut self, mut send: impl FnMut(&EmergencyAlert) -> Result<(), E>) -> usize {
        let mut sent = 0;
        while let Some(alert) = self.queue.pop_front() {
            if send(&alert).is_err() {
                // The slot was just freed, so this cannot fail.
                let _ = self.queue.push_front(alert);
                break;
            }
            sent += 1;
        }
        sent
    }
}

impl<const N: usize> AlertDeliveryPort for AlertOutbox<N> {
    fn deliver(&mut self, alert: &EmergencyAlert) -> Result<(), CommsError> {
        self.queue
            .push_back(alert.clone())
            .map_err(|_| CommsError::OutboxFull)?;
        debug!("outbox: alert #{} queued ({}/{})", alert.sequence, self.queue.len(), N);
        Ok(())
    }
}
