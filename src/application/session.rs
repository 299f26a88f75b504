//! Session orchestration - wires an accepted transport into the relay.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::chat::{MessageFilter, Tag};
use crate::ports::{EnvelopeSink, EnvelopeSource};

use super::connection::Connection;
use super::mailbox::MailboxConfig;
use super::registry::{PairOutcome, Registry};
use super::relay;

/// Settings applied to every new connection.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Mailbox sizing and backpressure.
    pub mailbox: MailboxConfig,
    /// Tag used when the client supplies none.
    pub default_tag: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            mailbox: MailboxConfig::default(),
            default_tag: crate::domain::chat::DEFAULT_TAG.to_string(),
        }
    }
}

/// Entry point used by transport adapters for every accepted endpoint.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<Registry>,
    filter: Arc<MessageFilter>,
    settings: RelaySettings,
}

impl RelayService {
    pub fn new(registry: Arc<Registry>, filter: MessageFilter, settings: RelaySettings) -> Self {
        Self {
            registry,
            filter: Arc::new(filter),
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Resolves the raw `tag` query value against the configured default.
    pub fn resolve_tag(&self, raw: Option<&str>) -> Tag {
        Tag::from_query(raw, &self.settings.default_tag)
    }

    /// Registers a new connection, starts its loops and runs pairing.
    ///
    /// The outbound loop is running before pairing so the first
    /// notification can always be delivered; the inbound loop starts after
    /// pairing so no client command races the initial match.
    pub async fn connect<S, K>(&self, tag: Tag, source: S, sink: K) -> SessionHandle
    where
        S: EnvelopeSource + 'static,
        K: EnvelopeSink + 'static,
    {
        let (connection, mailbox) = Connection::new(tag, self.settings.mailbox);
        tracing::info!(
            connection_id = %connection.id(),
            tag = %connection.tag(),
            "Connection accepted"
        );

        self.registry.register(&connection).await;

        let outbound = tokio::spawn(relay::run_outbound(
            Arc::clone(&connection),
            Arc::clone(&self.registry),
            mailbox,
            sink,
        ));

        let initial = self.registry.try_pair(&connection).await;

        let inbound = tokio::spawn(relay::run_inbound(
            Arc::clone(&connection),
            Arc::clone(&self.registry),
            Arc::clone(&self.filter),
            source,
        ));

        SessionHandle {
            connection,
            initial,
            inbound,
            outbound,
        }
    }
}

/// Running session for one connection.
#[derive(Debug)]
pub struct SessionHandle {
    connection: Arc<Connection>,
    initial: PairOutcome,
    inbound: JoinHandle<()>,
    outbound: JoinHandle<()>,
}

impl SessionHandle {
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Outcome of the pairing attempt made at connect time.
    pub fn initial_outcome(&self) -> PairOutcome {
        self.initial
    }

    /// Waits for both loops to finish.
    pub async fn join(self) {
        for (loop_name, task) in [("inbound", self.inbound), ("outbound", self.outbound)] {
            if let Err(e) = task.await {
                tracing::error!(
                    connection_id = %self.connection.id(),
                    loop_name,
                    "Relay loop panicked: {}",
                    e
                );
            }
        }
    }
}
