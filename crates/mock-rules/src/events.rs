//! Change notifications for rule state.
//!
//! The store publishes a [`StoreEvent`] after every state transition.
//! Dependents (the page controller's collapsed-state map, views) subscribe
//! once and react to whatever changed, regardless of which operation caused
//! the change.

use crate::rule::RuleId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The set or order of draft rule ids changed. Carries the new id list.
    DraftIdsChanged(Vec<RuleId>),
    /// A draft rule's contents changed in place.
    DraftRuleUpdated(RuleId),
    /// Draft state was promoted to the active rule set.
    RulesSaved,
}

pub type Subscriber<E> = Box<dyn FnMut(&E)>;

/// Synchronous publish-subscribe list.
pub struct EventBus<E> {
    subscribers: Vec<Subscriber<E>>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber<E>) {
        self.subscribers.push(subscriber);
    }

    /// Deliver `event` to every subscriber, in subscription order.
    pub fn publish(&mut self, event: &E) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
