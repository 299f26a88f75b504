//! Bounded outbound mailbox for one connection.
//!
//! Any task may push; only the owning connection's outbound loop drains.
//! Pushing into a full mailbox waits for space. With an enqueue timeout
//! configured, the wait is bounded and the envelope being pushed is
//! dropped on expiry; everything already queued keeps its order.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError};

use crate::domain::chat::Envelope;

/// Default number of envelopes a mailbox holds.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 16;

/// Errors from pushing into a mailbox.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailboxError {
    /// The owning connection has shut down.
    #[error("Mailbox closed")]
    Closed,

    /// No space freed up within the enqueue timeout.
    #[error("Mailbox still full after {0:?}, envelope dropped")]
    Full(Duration),
}

/// Sizing and backpressure policy for mailboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxConfig {
    /// Envelopes held before pushes start waiting.
    pub capacity: usize,
    /// Upper bound on a single push; `None` waits forever.
    pub enqueue_timeout: Option<Duration>,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_MAILBOX_CAPACITY,
            enqueue_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Sending side of a mailbox.
#[derive(Debug, Clone)]
pub struct Mailbox {
    tx: mpsc::Sender<Envelope>,
    enqueue_timeout: Option<Duration>,
}

impl Mailbox {
    /// Creates a mailbox and the receiver its outbound loop drains.
    pub fn channel(config: MailboxConfig) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        (
            Self {
                tx,
                enqueue_timeout: config.enqueue_timeout,
            },
            rx,
        )
    }

    /// Appends an envelope, waiting for space if the mailbox is full.
    pub async fn push(&self, envelope: Envelope) -> Result<(), MailboxError> {
        match self.enqueue_timeout {
            Some(timeout) => self
                .tx
                .send_timeout(envelope, timeout)
                .await
                .map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => MailboxError::Full(timeout),
                    SendTimeoutError::Closed(_) => MailboxError::Closed,
                }),
            None => self
                .tx
                .send(envelope)
                .await
                .map_err(|_| MailboxError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::EnvelopeKind;

    fn config(capacity: usize, timeout_ms: Option<u64>) -> MailboxConfig {
        MailboxConfig {
            capacity,
            enqueue_timeout: timeout_ms.map(Duration::from_millis),
        }
    }

    #[tokio::test]
    async fn delivers_in_push_order() {
        let (mailbox, mut rx) = Mailbox::channel(config(4, None));

        mailbox.push(Envelope::chat("m1")).await.unwrap();
        mailbox.push(Envelope::chat("m2")).await.unwrap();
        mailbox.push(Envelope::chat("m3")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().text(), Some("m1"));
        assert_eq!(rx.recv().await.unwrap().text(), Some("m2"));
        assert_eq!(rx.recv().await.unwrap().text(), Some("m3"));
    }

    #[tokio::test]
    async fn full_mailbox_drops_new_envelope_after_timeout() {
        let (mailbox, mut rx) = Mailbox::channel(config(1, Some(20)));

        mailbox.push(Envelope::chat("kept")).await.unwrap();
        let result = mailbox.push(Envelope::chat("dropped")).await;

        assert_eq!(result, Err(MailboxError::Full(Duration::from_millis(20))));
        assert_eq!(rx.recv().await.unwrap().text(), Some("kept"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_mailbox_waits_for_space() {
        let (mailbox, mut rx) = Mailbox::channel(config(1, None));
        mailbox.push(Envelope::chat("first")).await.unwrap();

        let pusher = {
            let mailbox = mailbox.clone();
            tokio::spawn(async move { mailbox.push(Envelope::chat("second")).await })
        };

        assert_eq!(rx.recv().await.unwrap().text(), Some("first"));
        assert!(pusher.await.unwrap().is_ok());
        assert_eq!(rx.recv().await.unwrap().text(), Some("second"));
    }

    #[tokio::test]
    async fn push_after_close_fails() {
        let (mailbox, mut rx) = Mailbox::channel(config(4, None));
        rx.close();

        assert_eq!(
            mailbox.push(Envelope::system("late")).await,
            Err(MailboxError::Closed)
        );
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped_to_one() {
        let (mailbox, mut rx) = Mailbox::channel(config(0, Some(10)));
        mailbox.push(Envelope::typing()).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().kind(), EnvelopeKind::Typing);
    }
}
