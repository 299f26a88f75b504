//! WebSocket implementation of the transport ports.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::domain::chat::{ClientCommand, Envelope};
use crate::ports::{EnvelopeSink, EnvelopeSource, TransportError};

use super::messages::{decode, encode};

/// Splits an upgraded socket into its two transport halves.
pub fn split(socket: WebSocket) -> (WebSocketSource, WebSocketSink) {
    let (sink, stream) = socket.split();
    (WebSocketSource { stream }, WebSocketSink { sink })
}

/// Inbound half of a WebSocket.
pub struct WebSocketSource {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl EnvelopeSource for WebSocketSource {
    async fn recv(&mut self) -> Result<Option<ClientCommand>, TransportError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(|e| TransportError::Read(e.to_string()))? {
                Message::Text(text) => return decode(text.as_bytes()).map(Some),
                Message::Binary(bytes) => return decode(&bytes).map(Some),
                // Protocol-level heartbeats are answered by axum
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => return Ok(None),
            }
        }
        Ok(None)
    }
}

/// Outbound half of a WebSocket.
pub struct WebSocketSink {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl EnvelopeSink for WebSocketSink {
    async fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        let json = encode(envelope)?;
        self.sink
            .send(Message::Text(json))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}
