//! Typed client commands decoded from inbound envelopes.

use super::EnvelopeKind;

/// What a client asked the relay to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Relay chat text to the partner.
    Chat(String),
    /// Tell the partner we are typing.
    Typing,
    /// Drop the current partner and look for another.
    Next,
    /// Flag the current session.
    Report,
    /// Anything else; carries the raw kind for logging.
    Ignored(String),
}

impl ClientCommand {
    /// Interprets a raw `type`/`text` pair.
    ///
    /// Unknown kinds and server-only kinds map to [`ClientCommand::Ignored`]
    /// so newer clients never break older servers.
    pub fn from_parts(kind: &str, text: Option<String>) -> Self {
        match kind.parse::<EnvelopeKind>() {
            Ok(EnvelopeKind::Message) => ClientCommand::Chat(text.unwrap_or_default()),
            Ok(EnvelopeKind::Typing) => ClientCommand::Typing,
            Ok(EnvelopeKind::Next) => ClientCommand::Next,
            Ok(EnvelopeKind::Report) => ClientCommand::Report,
            _ => ClientCommand::Ignored(kind.to_string()),
        }
    }
}
