//! Topic management
//!
//! A `Topic` holds the set of subscriber IDs for a particular topic name.
//! Subscriptions are stored as a `HashSet<ClientId>`, so a duplicate
//! subscription is a no-op and a client is listed at most once per topic.
//!
//! Callers must synchronize access to `Topic` (the registry lock does this).

use std::collections::HashSet;

use crate::client::ClientId;

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<ClientId>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Add a subscriber. Returns `false` if it was already subscribed.
    pub fn subscribe(&mut self, id: ClientId) -> bool {
        self.subscribers.insert(id)
    }

    /// Remove a subscriber. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: &ClientId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
