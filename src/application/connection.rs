//! One live chat connection.
//!
//! A [`Connection`] is shared between its own inbound and outbound loops,
//! the [`Registry`](super::Registry), and (weakly) its current partner.
//! Mutable pairing state sits in a [`Link`] behind a per-connection lock.
//! The registry only writes a `Link` while holding its own lock, and never
//! holds two `Link` locks at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch, Mutex, MutexGuard};

use crate::domain::chat::{ConnectionStatus, Envelope, Tag, NO_PARTNER_TEXT};
use crate::domain::foundation::{ConnectionId, StateMachine, Timestamp, ValidationError};

use super::mailbox::{Mailbox, MailboxConfig, MailboxError};

/// Non-owning handle to the current partner.
#[derive(Debug, Clone)]
pub(crate) struct PartnerRef {
    id: ConnectionId,
    handle: Weak<Connection>,
}

impl PartnerRef {
    fn to(connection: &Arc<Connection>) -> Self {
        Self {
            id: connection.id(),
            handle: Arc::downgrade(connection),
        }
    }

    pub(crate) fn id(&self) -> ConnectionId {
        self.id
    }

    pub(crate) fn upgrade(&self) -> Option<Arc<Connection>> {
        self.handle.upgrade()
    }
}

/// Pairing state guarded by the connection's lock.
#[derive(Debug, Default)]
pub(crate) struct Link {
    partner: Option<PartnerRef>,
    status: ConnectionStatus,
}

impl Link {
    pub(crate) fn partner(&self) -> Option<Arc<Connection>> {
        self.partner.as_ref().and_then(PartnerRef::upgrade)
    }

    pub(crate) fn partner_id(&self) -> Option<ConnectionId> {
        self.partner.as_ref().map(|p| p.id)
    }

    pub(crate) fn is_partnered_with(&self, id: ConnectionId) -> bool {
        self.partner_id() == Some(id)
    }

    pub(crate) fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ConnectionStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(status)?;
        Ok(())
    }

    pub(crate) fn attach(&mut self, partner: &Arc<Connection>) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(ConnectionStatus::Paired)?;
        self.partner = Some(PartnerRef::to(partner));
        Ok(())
    }

    /// Clears the partner and moves to `status`.
    pub(crate) fn detach(
        &mut self,
        status: ConnectionStatus,
    ) -> Result<Option<PartnerRef>, ValidationError> {
        self.status = self.status.transition_to(status)?;
        Ok(self.partner.take())
    }
}

/// A registered chat endpoint.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    tag: Tag,
    created_at: Timestamp,
    mailbox: Mailbox,
    link: Mutex<Link>,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl Connection {
    /// Creates a connection and hands back the receiver for its outbound
    /// loop.
    pub fn new(tag: Tag, mailbox: MailboxConfig) -> (Arc<Self>, mpsc::Receiver<Envelope>) {
        let (mailbox, rx) = Mailbox::channel(mailbox);
        let (shutdown, _) = watch::channel(false);
        let connection = Arc::new(Self {
            id: ConnectionId::new(),
            tag,
            created_at: Timestamp::now(),
            mailbox,
            link: Mutex::new(Link::default()),
            closed: AtomicBool::new(false),
            shutdown,
        });
        (connection, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.link.lock().await.status()
    }

    /// Current partner, if it is still alive.
    pub async fn partner(&self) -> Option<Arc<Connection>> {
        self.link.lock().await.partner()
    }

    pub async fn partner_id(&self) -> Option<ConnectionId> {
        self.link.lock().await.partner_id()
    }

    pub(crate) async fn lock_link(&self) -> MutexGuard<'_, Link> {
        self.link.lock().await
    }

    /// Pushes an envelope into this connection's own mailbox.
    pub async fn deliver(&self, envelope: Envelope) -> Result<(), MailboxError> {
        self.mailbox.push(envelope).await
    }

    /// Best-effort delivery; failures are logged and swallowed.
    pub(crate) async fn notify(&self, envelope: Envelope) {
        let kind = envelope.kind();
        if let Err(e) = self.deliver(envelope).await {
            match e {
                MailboxError::Closed => tracing::debug!(
                    connection_id = %self.id,
                    %kind,
                    "Dropping envelope for closed connection"
                ),
                MailboxError::Full(_) => tracing::warn!(
                    connection_id = %self.id,
                    %kind,
                    "Dropping envelope: {}",
                    e
                ),
            }
        }
    }

    /// Relays chat text to the partner, or tells the sender nobody is there.
    ///
    /// The link lock is held across the push so the partner cannot change
    /// between the lookup and the enqueue.
    pub async fn relay_chat(&self, text: String) {
        let link = self.link.lock().await;
        match link.partner() {
            Some(partner) => partner.notify(Envelope::chat(text)).await,
            None => self.notify(Envelope::system(NO_PARTNER_TEXT)).await,
        }
    }

    /// Forwards a typing notice to the partner; no-op when alone.
    pub async fn relay_typing(&self) {
        let link = self.link.lock().await;
        if let Some(partner) = link.partner() {
            partner.notify(Envelope::typing()).await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Claims the right to tear this connection down. Only the first
    /// caller gets `true`.
    pub(crate) fn begin_close(&self) -> bool {
        self.closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Receiver that flips to `true` once teardown starts.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub(crate) fn signal_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::EnvelopeKind;
    use std::time::Duration;

    fn connection(tag: &str) -> (Arc<Connection>, mpsc::Receiver<Envelope>) {
        Connection::new(Tag::new(tag), MailboxConfig::default())
    }

    #[tokio::test]
    async fn new_connection_is_connecting_without_partner() {
        let (conn, _rx) = connection("default");
        assert_eq!(conn.status().await, ConnectionStatus::Connecting);
        assert!(conn.partner().await.is_none());
        assert!(!conn.is_closed());
    }

    #[tokio::test]
    async fn chat_without_partner_gets_system_notice() {
        let (conn, mut rx) = connection("default");

        conn.relay_chat("hello".to_string()).await;

        let env = rx.recv().await.unwrap();
        assert_eq!(env.kind(), EnvelopeKind::System);
        assert_eq!(env.text(), Some(NO_PARTNER_TEXT));
    }

    #[tokio::test]
    async fn chat_with_partner_lands_in_partner_mailbox() {
        let (a, mut a_rx) = connection("default");
        let (b, mut b_rx) = connection("default");
        a.lock_link().await.attach(&b).unwrap();

        a.relay_chat("hi b".to_string()).await;

        let env = b_rx.recv().await.unwrap();
        assert_eq!(env.kind(), EnvelopeKind::Message);
        assert_eq!(env.text(), Some("hi b"));
        assert!(a_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn typing_without_partner_is_noop() {
        let (conn, mut rx) = connection("default");
        conn.relay_typing().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_partner_reads_as_none() {
        let (a, _a_rx) = connection("default");
        {
            let (b, _b_rx) = connection("default");
            a.lock_link().await.attach(&b).unwrap();
        }
        assert!(a.partner().await.is_none());
        assert!(a.partner_id().await.is_some());
    }

    #[tokio::test]
    async fn begin_close_succeeds_once() {
        let (conn, _rx) = connection("default");
        assert!(conn.begin_close());
        assert!(!conn.begin_close());
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn shutdown_signal_is_observed_by_late_subscribers() {
        let (conn, _rx) = connection("default");
        conn.signal_shutdown();

        let mut signal = conn.shutdown_signal();
        let observed =
            tokio::time::timeout(Duration::from_millis(100), signal.wait_for(|closed| *closed))
                .await;
        assert!(observed.is_ok());
    }

    #[tokio::test]
    async fn detach_from_connecting_to_paired_is_rejected() {
        let (conn, _rx) = connection("default");
        let mut link = conn.lock_link().await;
        assert!(link.detach(ConnectionStatus::Paired).is_err());
    }
}
