//! Pairing registry (the hub).
//!
//! Tracks every live connection and holds at most one waiting connection
//! per tag. Every change to who-is-paired-with-whom happens inside the
//! registry's critical section, so both halves of a pair are written
//! together and no observer can see a one-sided partnership.
//!
//! # Lock order
//!
//! Registry lock first, then one connection link at a time. The relay path
//! takes a single link lock and never the registry lock, so the two lock
//! kinds cannot form a cycle.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::chat::{ConnectionStatus, Envelope, Tag};
use crate::domain::foundation::ConnectionId;

use super::connection::Connection;

/// Result of running the pairing algorithm for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Matched with the connection that was waiting on the same tag.
    Paired(ConnectionId),
    /// Now occupies the waiting slot for its tag.
    Waiting,
    /// Connection is no longer registered; nothing was done.
    Unregistered,
}

/// Point-in-time counters for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub clients: usize,
    pub waiting: usize,
    pub waiting_tags: Vec<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    clients: HashMap<ConnectionId, Arc<Connection>>,
    waiting: HashMap<Tag, Arc<Connection>>,
}

impl RegistryState {
    fn clear_waiting_slot(&mut self, connection: &Connection) {
        let holds_slot = self
            .waiting
            .get(connection.tag())
            .is_some_and(|w| w.id() == connection.id());
        if holds_slot {
            self.waiting.remove(connection.tag());
        }
    }
}

/// Process-wide set of live connections and per-tag waiting slots.
///
/// Construct one per process and share it as `Arc<Registry>`.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the live set.
    pub async fn register(&self, connection: &Arc<Connection>) {
        let mut state = self.state.lock().await;
        state.clients.insert(connection.id(), Arc::clone(connection));
        tracing::debug!(
            connection_id = %connection.id(),
            tag = %connection.tag(),
            clients = state.clients.len(),
            "Connection registered"
        );
    }

    /// Removes a connection from the live set and from its waiting slot.
    ///
    /// Does not touch the partner relationship; see [`Registry::remove`]
    /// for full teardown.
    pub async fn deregister(&self, connection: &Connection) {
        let mut state = self.state.lock().await;
        Self::deregister_locked(&mut state, connection);
    }

    /// Matches the connection with the waiter on its tag, or makes it the
    /// waiter.
    ///
    /// First come occupies the slot; the next arrival consumes it. A
    /// connection is never matched with itself, and a connection that has
    /// already been deregistered is never placed in a slot.
    pub async fn try_pair(&self, connection: &Arc<Connection>) -> PairOutcome {
        let mut state = self.state.lock().await;
        Self::try_pair_locked(&mut state, connection).await
    }

    /// Drops the current partner (who gets `partner_left` and is not
    /// re-queued), then runs the pairing algorithm for this connection.
    pub async fn request_new_partner(&self, connection: &Arc<Connection>) -> PairOutcome {
        let mut state = self.state.lock().await;
        if !state.clients.contains_key(&connection.id()) {
            return PairOutcome::Unregistered;
        }
        Self::detach_locked(connection, ConnectionStatus::Waiting).await;
        Self::try_pair_locked(&mut state, connection).await
    }

    /// Teardown half run once per connection: frees any partner, then
    /// deregisters. Returns false if the connection was not registered.
    pub async fn remove(&self, connection: &Connection) -> bool {
        let mut state = self.state.lock().await;
        Self::detach_locked(connection, ConnectionStatus::Disconnected).await;
        Self::deregister_locked(&mut state, connection)
    }

    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    pub async fn waiting_count(&self) -> usize {
        self.state.lock().await.waiting.len()
    }

    /// Id of the connection currently waiting on `tag`.
    pub async fn waiting_for(&self, tag: &Tag) -> Option<ConnectionId> {
        self.state.lock().await.waiting.get(tag).map(|c| c.id())
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.state.lock().await.clients.contains_key(&id)
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.lock().await;
        let mut waiting_tags: Vec<String> =
            state.waiting.keys().map(|t| t.as_str().to_string()).collect();
        waiting_tags.sort();
        RegistrySnapshot {
            clients: state.clients.len(),
            waiting: state.waiting.len(),
            waiting_tags,
        }
    }

    fn deregister_locked(state: &mut RegistryState, connection: &Connection) -> bool {
        state.clear_waiting_slot(connection);
        let removed = state.clients.remove(&connection.id()).is_some();
        if removed {
            tracing::debug!(
                connection_id = %connection.id(),
                clients = state.clients.len(),
                "Connection deregistered"
            );
        }
        removed
    }

    async fn try_pair_locked(
        state: &mut RegistryState,
        connection: &Arc<Connection>,
    ) -> PairOutcome {
        if !state.clients.contains_key(&connection.id()) {
            return PairOutcome::Unregistered;
        }
        if let Some(partner_id) = connection.lock_link().await.partner_id() {
            return PairOutcome::Paired(partner_id);
        }

        let tag = connection.tag().clone();
        let waiter = state
            .waiting
            .get(&tag)
            .filter(|w| w.id() != connection.id())
            .cloned();

        match waiter {
            Some(waiter) => {
                state.waiting.remove(&tag);
                Self::link_locked(connection, &waiter).await;
                connection.notify(Envelope::paired()).await;
                waiter.notify(Envelope::paired()).await;
                tracing::info!(
                    connection_id = %connection.id(),
                    partner_id = %waiter.id(),
                    tag = %tag,
                    "Connections paired"
                );
                PairOutcome::Paired(waiter.id())
            }
            None => {
                state.waiting.insert(tag.clone(), Arc::clone(connection));
                if let Err(e) = connection
                    .lock_link()
                    .await
                    .set_status(ConnectionStatus::Waiting)
                {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        "Unexpected status change: {}",
                        e
                    );
                }
                connection.notify(Envelope::waiting(&tag)).await;
                tracing::debug!(
                    connection_id = %connection.id(),
                    tag = %tag,
                    "Connection waiting for a partner"
                );
                PairOutcome::Waiting
            }
        }
    }

    async fn link_locked(a: &Arc<Connection>, b: &Arc<Connection>) {
        for (this, other) in [(a, b), (b, a)] {
            let mut link = this.lock_link().await;
            if let Err(e) = link.attach(other) {
                tracing::warn!(
                    connection_id = %this.id(),
                    partner_id = %other.id(),
                    "Unexpected status change while pairing: {}",
                    e
                );
            }
        }
    }

    /// Clears both sides of the connection's partnership, moves the
    /// connection to `status`, and tells the former partner. Caller holds
    /// the registry lock.
    async fn detach_locked(connection: &Connection, status: ConnectionStatus) {
        let former = {
            let mut link = connection.lock_link().await;
            if link.status() == status {
                None
            } else {
                match link.detach(status) {
                    Ok(former) => former,
                    Err(e) => {
                        tracing::warn!(
                            connection_id = %connection.id(),
                            "Unexpected status change: {}",
                            e
                        );
                        None
                    }
                }
            }
        };

        let Some(former) = former else {
            return;
        };
        let Some(partner) = former.upgrade() else {
            tracing::debug!(
                connection_id = %connection.id(),
                partner_id = %former.id(),
                "Former partner already gone"
            );
            return;
        };

        {
            let mut link = partner.lock_link().await;
            if !link.is_partnered_with(connection.id()) {
                return;
            }
            if let Err(e) = link.detach(ConnectionStatus::Waiting) {
                tracing::warn!(
                    connection_id = %partner.id(),
                    "Unexpected status change: {}",
                    e
                );
            }
        }
        partner.notify(Envelope::partner_left()).await;
        tracing::info!(
            connection_id = %connection.id(),
            partner_id = %partner.id(),
            "Partnership ended"
        );
    }
}
