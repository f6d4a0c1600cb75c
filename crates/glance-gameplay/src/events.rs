//! Multi-subscriber notification channels.
//!
//! Every subscriber owns its own unbounded receiver. `emit` delivers
//! synchronously and in call order, so a subscriber draining its receiver
//! after a callback returns sees events exactly as they were raised.

use crossbeam_channel::{unbounded, Receiver, Sender};
use glance_common::EntityId;

use crate::query::QueryResult;

/// Notifications raised by the interaction component.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// Focus moved between targets (either side may be none)
    FocusChanged {
        /// Newly focused entity
        new: Option<EntityId>,
        /// Previously focused entity
        previous: Option<EntityId>,
    },
    /// The cached query result was rewritten
    QueryUpdated(QueryResult),
    /// Normalized hold progress in `0..=1`
    HoldProgress(f32),
    /// A hold was cancelled before completing
    HoldReset,
    /// A hold reached its duration
    HoldCompleted,
}

/// Fan-out broadcaster over crossbeam channels.
#[derive(Debug)]
pub struct EventBroadcaster<E> {
    /// One sender per live subscriber
    subscribers: Vec<Sender<E>>,
}

impl<E> Default for EventBroadcaster<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBroadcaster<E> {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a subscriber. Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone> EventBroadcaster<E> {
    /// Sends an event to every subscriber, pruning disconnected ones.
    pub fn emit(&mut self, event: &E) {
        self.subscribers
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}

/// Drains everything currently queued on a receiver.
pub fn drain<E>(receiver: &Receiver<E>) -> Vec<E> {
    receiver.try_iter().collect()
}
