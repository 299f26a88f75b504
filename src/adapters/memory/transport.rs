//! In-memory transport for tests and local tooling.
//!
//! [`pair`] returns the server-side halves plus a [`MemoryClient`] that
//! plays the remote peer. Frames go through the same JSON codec as the
//! WebSocket adapter, so encoding and decoding are exercised end to end.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::adapters::websocket::messages::{decode, encode, ServerMessage};
use crate::domain::chat::{ClientCommand, Envelope};
use crate::ports::{EnvelopeSink, EnvelopeSource, TransportError};

enum Frame {
    Payload(String),
    Hangup,
    Fail(String),
}

#[derive(Debug)]
struct Probe {
    closes: AtomicUsize,
    fail_writes: AtomicBool,
    writes_open: watch::Sender<bool>,
}

impl Probe {
    fn new() -> Self {
        let (writes_open, _) = watch::channel(true);
        Self {
            closes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            writes_open,
        }
    }
}

/// Creates a connected client/server transport triple.
pub fn pair() -> (MemoryClient, MemorySource, MemorySink) {
    let (to_server, inbound) = mpsc::unbounded_channel();
    let (outbound, from_server) = mpsc::unbounded_channel();
    let probe = Arc::new(Probe::new());

    (
        MemoryClient {
            to_server,
            from_server,
            probe: Arc::clone(&probe),
        },
        MemorySource { inbound },
        MemorySink {
            outbound,
            probe,
            closed: false,
        },
    )
}

/// Remote end of an in-memory transport.
pub struct MemoryClient {
    to_server: mpsc::UnboundedSender<Frame>,
    from_server: mpsc::UnboundedReceiver<String>,
    probe: Arc<Probe>,
}

impl MemoryClient {
    /// Sends a `{"type": kind, "text": text}` frame.
    pub fn send(&self, kind: &str, text: Option<&str>) {
        let mut frame = serde_json::json!({ "type": kind });
        if let Some(text) = text {
            frame["text"] = serde_json::Value::String(text.to_string());
        }
        self.send_raw(&frame.to_string());
    }

    /// Sends a raw frame payload, valid JSON or not.
    pub fn send_raw(&self, payload: &str) {
        let _ = self.to_server.send(Frame::Payload(payload.to_string()));
    }

    /// Closes the client side cleanly.
    pub fn hang_up(&self) {
        let _ = self.to_server.send(Frame::Hangup);
    }

    /// Makes the server's next read fail.
    pub fn break_reads(&self, reason: &str) {
        let _ = self.to_server.send(Frame::Fail(reason.to_string()));
    }

    /// Makes every subsequent server write fail.
    pub fn break_writes(&self) {
        self.probe.fail_writes.store(true, Ordering::Release);
    }

    /// Holds every server write until [`MemoryClient::resume_writes`],
    /// like a peer that stopped reading.
    pub fn stall_writes(&self) {
        self.probe.writes_open.send_replace(false);
    }

    pub fn resume_writes(&self) {
        self.probe.writes_open.send_replace(true);
    }

    /// Next frame written by the server, or `None` once the server side
    /// is gone.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        let payload = self.from_server.recv().await?;
        serde_json::from_str(&payload).ok()
    }

    /// Like [`MemoryClient::recv`] but gives up after `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<ServerMessage> {
        tokio::time::timeout(timeout, self.recv()).await.ok().flatten()
    }

    /// Number of times the server closed this transport.
    pub fn close_count(&self) -> usize {
        self.probe.closes.load(Ordering::Acquire)
    }
}

/// Server-side inbound half.
pub struct MemorySource {
    inbound: mpsc::UnboundedReceiver<Frame>,
}

#[async_trait]
impl EnvelopeSource for MemorySource {
    async fn recv(&mut self) -> Result<Option<ClientCommand>, TransportError> {
        match self.inbound.recv().await {
            Some(Frame::Payload(payload)) => decode(payload.as_bytes()).map(Some),
            Some(Frame::Fail(reason)) => Err(TransportError::Read(reason)),
            Some(Frame::Hangup) | None => Ok(None),
        }
    }
}

/// Server-side outbound half.
pub struct MemorySink {
    outbound: mpsc::UnboundedSender<String>,
    probe: Arc<Probe>,
    closed: bool,
}

#[async_trait]
impl EnvelopeSink for MemorySink {
    async fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut open = self.probe.writes_open.subscribe();
        let _ = open.wait_for(|open| *open).await;
        if self.probe.fail_writes.load(Ordering::Acquire) {
            return Err(TransportError::Write("write failure injected".to_string()));
        }
        let payload = encode(envelope)?;
        self.outbound
            .send(payload)
            .map_err(|_| TransportError::Write("client dropped".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.probe.closes.fetch_add(1, Ordering::AcqRel);
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}
