//! Transport ports - the two halves of one chat endpoint.
//!
//! A transport is split on accept: the inbound loop owns the
//! [`EnvelopeSource`] and the outbound loop owns the [`EnvelopeSink`].
//! Nothing else touches either half, so neither needs internal locking.
//!
//! Adapters:
//! - WebSocket (`adapters::websocket`) for production traffic
//! - In-memory (`adapters::memory`) for tests and local tooling

use async_trait::async_trait;

use crate::domain::chat::{ClientCommand, Envelope};

/// Errors raised by a transport half.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying read failed.
    #[error("Read failed: {0}")]
    Read(String),

    /// The underlying write failed.
    #[error("Write failed: {0}")]
    Write(String),

    /// A frame arrived that is not a valid envelope.
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    /// The transport was already closed.
    #[error("Transport closed")]
    Closed,
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Malformed(err.to_string())
    }
}

/// Inbound half: yields decoded client commands one at a time.
#[async_trait]
pub trait EnvelopeSource: Send {
    /// Waits for the next command.
    ///
    /// Returns `Ok(None)` when the peer closed cleanly. Any error is
    /// terminal for the connection.
    async fn recv(&mut self) -> Result<Option<ClientCommand>, TransportError>;
}

/// Outbound half: writes envelopes in the order given.
#[async_trait]
pub trait EnvelopeSink: Send {
    /// Writes one envelope. An error is terminal for the connection.
    async fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError>;

    /// Closes the transport. Called once per connection.
    async fn close(&mut self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_become_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let transport: TransportError = err.into();
        assert!(matches!(transport, TransportError::Malformed(_)));
    }

    #[test]
    fn errors_display_their_cause() {
        let err = TransportError::Write("broken pipe".to_string());
        assert_eq!(err.to_string(), "Write failed: broken pipe");
    }
}
