//! Topic registry
//!
//! This module contains the shared registry responsible for:
//! - tracking connected clients and the channel used to reach each one
//! - managing topics and their subscriber sets
//! - fanning a published message out to the current subscribers of a topic
//!
//! Concurrency and usage notes:
//! - Every operation takes the single internal lock guarding clients and topics
//!   together, so subscribe/unsubscribe/remove never interleave half-way.
//! - `fan_out` copies the subscriber senders while holding the lock and sends
//!   after releasing it. Sends never run under the registry lock.
//! - A subscriber whose channel is closed is removed after the fan-out, the
//!   same way a disconnect would remove it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::broker::topic::Topic;
use crate::client::{Client, ClientId, ClientInfo, Outbound};
use crate::utils::error::{DeliveryError, RegistryError};

/// Outcome of delivering one fanned-out message to one subscriber.
pub type Delivery = (ClientId, Result<(), DeliveryError>);

#[derive(Debug, Default)]
struct RegistryState {
    clients: HashMap<ClientId, Client>,
    topics: HashMap<String, Topic>,
}

#[derive(Debug, Default)]
pub struct TopicRegistry {
    state: Mutex<RegistryState>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // State stays consistent across a panicking holder: every mutation is a
        // single set/map operation.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a newly accepted client. Re-registering the same id is a no-op.
    pub fn add_client(&self, client: Client) {
        let mut state = self.lock();
        let id = client.id;
        if state.clients.contains_key(&id) {
            return;
        }
        info!(client = %id, addr = %client.addr, "client registered");
        state.clients.insert(id, client);
    }

    /// Removes a client and all of its subscriptions in one step.
    ///
    /// Returns `false` when the client was not registered; that is not an error.
    pub fn remove_client(&self, id: &ClientId) -> bool {
        let mut state = self.lock();
        let removed = state.clients.remove(id).is_some();

        state.topics.retain(|name, topic| {
            if topic.unsubscribe(id) {
                debug!(client = %id, topic = %name, "dropped subscription on removal");
            }
            !topic.is_empty()
        });

        if removed {
            info!(client = %id, "client removed");
        }
        removed
    }

    /// Subscribes a registered client to a topic, creating the topic if needed.
    ///
    /// Returns `Ok(false)` when the client was already subscribed.
    pub fn subscribe(&self, topic: &str, id: ClientId) -> Result<bool, RegistryError> {
        let mut state = self.lock();
        if !state.clients.contains_key(&id) {
            return Err(RegistryError::UnknownClient(id));
        }

        let added = state
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(id);
        debug!(client = %id, topic, added, "subscribe");
        Ok(added)
    }

    /// Unsubscribes a client from a topic.
    ///
    /// Unknown topics and absent subscriptions are ignored; returns whether a
    /// subscription was actually removed.
    pub fn unsubscribe(&self, topic: &str, id: &ClientId) -> bool {
        let mut state = self.lock();
        let Some(t) = state.topics.get_mut(topic) else {
            return false;
        };

        let removed = t.unsubscribe(id);
        if t.is_empty() {
            state.topics.remove(topic);
        }
        debug!(client = %id, topic, removed, "unsubscribe");
        removed
    }

    /// Snapshot of the connected clients, oldest connection first.
    pub fn list_connected_clients(&self) -> Vec<ClientInfo> {
        let state = self.lock();
        let mut clients: Vec<ClientInfo> = state.clients.values().map(Client::info).collect();
        clients.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));
        clients
    }

    pub fn client_count(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn topic_count(&self) -> usize {
        self.lock().topics.len()
    }

    /// Current subscribers of `topic`, in no particular order.
    #[cfg(test)]
    pub(crate) fn subscribers(&self, topic: &str) -> Vec<ClientId> {
        self.lock()
            .topics
            .get(topic)
            .map(|t| t.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Delivers `message` to every subscriber of `topic` except `excluding`.
    ///
    /// One failed send does not stop delivery to the others. Subscribers that
    /// could not be reached are removed from the registry afterwards.
    pub fn fan_out(&self, topic: &str, message: &str, excluding: &ClientId) -> Vec<Delivery> {
        let targets: Vec<(ClientId, UnboundedSender<Outbound>)> = {
            let state = self.lock();
            let Some(t) = state.topics.get(topic) else {
                debug!(topic, "fan-out to topic without subscribers");
                return Vec::new();
            };
            t.subscribers
                .iter()
                .filter(|id| *id != excluding)
                .filter_map(|id| state.clients.get(id).map(|c| (*id, c.sender.clone())))
                .collect()
        };

        let outcomes: Vec<Delivery> = targets
            .into_iter()
            .map(|(id, sender)| {
                let outcome = sender
                    .send(Outbound::Push(message.to_string()))
                    .map_err(|_| DeliveryError::SubscriberUnreachable(id));
                (id, outcome)
            })
            .collect();

        for (id, outcome) in &outcomes {
            if let Err(e) = outcome {
                warn!(topic, "{e}; removing");
                self.remove_client(id);
            }
        }

        outcomes
    }
}
