//! Wire format for chat envelopes.
//!
//! Every frame is a JSON object:
//!
//! ```text
//! {"type": "message", "text": "hi", "timestamp": "14:05"}
//! ```
//!
//! - Server -> Client: `message`, `typing`, `paired`, `waiting`,
//!   `partner_left`, `system`; always stamped `HH:MM` local time
//! - Client -> Server: `message`, `typing`, `next`, `report`; anything else
//!   is ignored

use serde::{Deserialize, Serialize};

use crate::domain::chat::{ClientCommand, Envelope, EnvelopeKind};
use crate::ports::TransportError;

// ============================================
// Server → Client Messages
// ============================================

/// Envelope as written to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub text: Option<String>,

    pub timestamp: String,
}

impl From<&Envelope> for ServerMessage {
    fn from(envelope: &Envelope) -> Self {
        Self {
            kind: envelope.kind(),
            text: envelope.text().map(str::to_string),
            timestamp: envelope.sent_at().to_clock_string(),
        }
    }
}

fn is_blank(text: &Option<String>) -> bool {
    text.as_deref().map_or(true, str::is_empty)
}

/// Serializes an envelope into a text frame payload.
pub fn encode(envelope: &Envelope) -> Result<String, TransportError> {
    Ok(serde_json::to_string(&ServerMessage::from(envelope))?)
}

// ============================================
// Client → Server Messages
// ============================================

/// Envelope as read from a client. Any `timestamp` it carries is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

impl From<ClientMessage> for ClientCommand {
    fn from(message: ClientMessage) -> Self {
        ClientCommand::from_parts(&message.kind, message.text)
    }
}

/// Decodes one frame payload. Invalid JSON is a terminal error; valid
/// JSON with an unknown `type` decodes to an ignored command.
pub fn decode(payload: &[u8]) -> Result<ClientCommand, TransportError> {
    let message: ClientMessage = serde_json::from_slice(payload)?;
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_serializes_with_type_tag() {
        let json = encode(&Envelope::paired()).unwrap();
        assert!(json.contains(r#""type":"paired""#));
        assert!(json.contains(r#""text":"Paired with a partner"#));
        assert!(json.contains(r#""timestamp":""#));
    }

    #[test]
    fn partner_left_uses_snake_case_kind() {
        let json = encode(&Envelope::partner_left()).unwrap();
        assert!(json.contains(r#""type":"partner_left""#));
    }

    #[test]
    fn empty_text_is_omitted() {
        let json = encode(&Envelope::chat("")).unwrap();
        assert!(!json.contains("text"));
    }

    #[test]
    fn timestamp_is_clock_time() {
        let msg = ServerMessage::from(&Envelope::system("hi"));
        assert_eq!(msg.timestamp.len(), 5);
        assert_eq!(msg.timestamp.as_bytes()[2], b':');
    }

    #[test]
    fn client_message_decodes_chat() {
        let cmd = decode(br#"{"type": "message", "text": "hello"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Chat("hello".to_string()));
    }

    #[test]
    fn client_message_decodes_controls() {
        assert_eq!(decode(br#"{"type": "next"}"#).unwrap(), ClientCommand::Next);
        assert_eq!(decode(br#"{"type": "typing"}"#).unwrap(), ClientCommand::Typing);
        assert_eq!(decode(br#"{"type": "report"}"#).unwrap(), ClientCommand::Report);
    }

    #[test]
    fn client_timestamp_is_ignored() {
        let cmd = decode(br#"{"type": "message", "text": "x", "timestamp": "01:02"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Chat("x".to_string()));
    }

    #[test]
    fn unknown_kind_decodes_as_ignored() {
        let cmd = decode(br#"{"type": "wave"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Ignored("wave".to_string()));
    }

    #[test]
    fn missing_kind_decodes_as_ignored() {
        let cmd = decode(br#"{"text": "orphan"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Ignored(String::new()));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(decode(b"not json"), Err(TransportError::Malformed(_))));
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        assert!(matches!(
            decode(br#"{"type": "message", "text": 42}"#),
            Err(TransportError::Malformed(_))
        ));
    }

    #[test]
    fn server_message_parses_back() {
        let json = encode(&Envelope::waiting(&crate::domain::chat::Tag::new("x"))).unwrap();
        let msg: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg.kind, EnvelopeKind::Waiting);
    }
}
