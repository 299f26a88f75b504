//! The two delivery loops run for every connection.
//!
//! The inbound loop decodes client commands and acts on them; the outbound
//! loop drains the mailbox onto the transport. Either loop hitting its
//! terminal condition tears the connection down via [`close`], which is
//! safe to call from both.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::domain::chat::{ClientCommand, Envelope, MessageFilter, REPORT_ACK_TEXT};
use crate::ports::{EnvelopeSink, EnvelopeSource};

use super::connection::Connection;
use super::registry::Registry;

/// Tears a connection down exactly once.
///
/// The first caller stops both loops, frees any partner and deregisters.
/// The transport and mailbox are closed by the outbound loop on its way
/// out. Returns false for every caller after the first.
pub async fn close(connection: &Connection, registry: &Registry) -> bool {
    if !connection.begin_close() {
        return false;
    }
    connection.signal_shutdown();
    registry.remove(connection).await;
    tracing::info!(
        connection_id = %connection.id(),
        tag = %connection.tag(),
        created_at = ?connection.created_at(),
        "Connection closed"
    );
    true
}

/// Acts on one decoded client command.
pub async fn dispatch(
    connection: &Arc<Connection>,
    registry: &Registry,
    filter: &MessageFilter,
    command: ClientCommand,
) {
    match command {
        ClientCommand::Chat(text) => {
            if filter.is_flagged(&text) {
                tracing::debug!(
                    connection_id = %connection.id(),
                    "Chat text matched the blocked word list"
                );
            }
            connection.relay_chat(filter.apply(&text)).await;
        }
        ClientCommand::Typing => connection.relay_typing().await,
        ClientCommand::Next => {
            let outcome = registry.request_new_partner(connection).await;
            tracing::debug!(
                connection_id = %connection.id(),
                ?outcome,
                "Partner change requested"
            );
        }
        ClientCommand::Report => {
            let partner_id = connection.partner_id().await;
            tracing::info!(
                connection_id = %connection.id(),
                partner_id = ?partner_id,
                "Session reported"
            );
            connection.notify(Envelope::system(REPORT_ACK_TEXT)).await;
        }
        ClientCommand::Ignored(kind) => {
            tracing::trace!(
                connection_id = %connection.id(),
                kind = %kind,
                "Ignoring unsupported envelope kind"
            );
        }
    }
}

/// Reads commands until the transport fails, the peer leaves, or teardown
/// starts elsewhere.
pub async fn run_inbound<S>(
    connection: Arc<Connection>,
    registry: Arc<Registry>,
    filter: Arc<MessageFilter>,
    mut source: S,
) where
    S: EnvelopeSource,
{
    let mut shutdown = connection.shutdown_signal();

    loop {
        let received = tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => break,
            received = source.recv() => received,
        };

        match received {
            Ok(Some(command)) => dispatch(&connection, &registry, &filter, command).await,
            Ok(None) => {
                tracing::debug!(connection_id = %connection.id(), "Peer closed the transport");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection.id(), "Inbound loop ending: {}", e);
                break;
            }
        }
    }

    close(&connection, &registry).await;
}

/// Writes mailbox envelopes in order until a write fails, the mailbox is
/// closed, or teardown starts elsewhere. Closes the transport on exit.
pub async fn run_outbound<K>(
    connection: Arc<Connection>,
    registry: Arc<Registry>,
    mut mailbox: mpsc::Receiver<Envelope>,
    mut sink: K,
) where
    K: EnvelopeSink,
{
    let mut shutdown = connection.shutdown_signal();

    loop {
        let envelope = tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => break,
            envelope = mailbox.recv() => envelope,
        };
        let Some(envelope) = envelope else {
            break;
        };

        let written = tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => break,
            written = sink.send(&envelope) => written,
        };
        if let Err(e) = written {
            tracing::debug!(connection_id = %connection.id(), "Outbound loop ending: {}", e);
            break;
        }
    }

    mailbox.close();
    if let Err(e) = sink.close().await {
        tracing::debug!(connection_id = %connection.id(), "Transport close failed: {}", e);
    }
    close(&connection, &registry).await;
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // The sender lives inside the connection, so an error here only means
    // the connection itself is gone.
    let _ = shutdown.wait_for(|closed| *closed).await;
}
