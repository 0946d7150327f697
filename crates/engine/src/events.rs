// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin fan-out facade in front of every component's domain events (§4.8).
//! Not algorithmically interesting: it exists because every component
//! contract references "broadcasts an event", and one shared
//! `tokio::sync::broadcast` bus is simpler to reason about and test than a
//! channel per subscriber pair.

use oj_core::Event;
use tokio::sync::broadcast;

/// Default ring buffer capacity for the underlying broadcast channel. A slow
/// subscriber that falls more than this many events behind observes a `Lagged`
/// error on its next `recv()` rather than stalling every other subscriber.
const CHANNEL_CAPACITY: usize = 1024;

pub struct EventBroadcaster {
    tx: broadcast::Sender<Event>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Broadcasts `event` to every live subscriber. A `SendError` only
    /// occurs when there are zero receivers, which is a normal, ignorable
    /// state (no RPC client currently connected).
    pub fn emit(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
