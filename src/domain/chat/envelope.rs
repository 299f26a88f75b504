//! Message envelopes exchanged over a chat connection.
//!
//! An [`Envelope`] is the unit that travels through a connection's mailbox.
//! It is immutable once built and stamped with the moment it was sent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

use super::Tag;

pub const PAIRED_TEXT: &str = "Paired with a partner in CatChat 🐱. Say hi!";
pub const PARTNER_LEFT_TEXT: &str =
    "Partner pressed Next. You are now looking for a new partner in CatChat 🐱.";
pub const NO_PARTNER_TEXT: &str = "No partner connected yet in CatChat 🐱.";
pub const TYPING_TEXT: &str = "Partner is typing...";
pub const REPORT_ACK_TEXT: &str = "Thank you. Report logged (demo).";

/// Kind tag carried in the `type` field of every wire envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Chat text, both directions.
    Message,
    /// Ephemeral typing indicator, both directions.
    Typing,
    /// Client asks for a new partner.
    Next,
    /// Client flags the current session.
    Report,
    /// A match was made.
    Paired,
    /// No match yet for this tag.
    Waiting,
    /// The former partner asked for someone else.
    PartnerLeft,
    /// Informational notice from the server.
    System,
}

impl EnvelopeKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::Message => "message",
            EnvelopeKind::Typing => "typing",
            EnvelopeKind::Next => "next",
            EnvelopeKind::Report => "report",
            EnvelopeKind::Paired => "paired",
            EnvelopeKind::Waiting => "waiting",
            EnvelopeKind::PartnerLeft => "partner_left",
            EnvelopeKind::System => "system",
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvelopeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(EnvelopeKind::Message),
            "typing" => Ok(EnvelopeKind::Typing),
            "next" => Ok(EnvelopeKind::Next),
            "report" => Ok(EnvelopeKind::Report),
            "paired" => Ok(EnvelopeKind::Paired),
            "waiting" => Ok(EnvelopeKind::Waiting),
            "partner_left" => Ok(EnvelopeKind::PartnerLeft),
            "system" => Ok(EnvelopeKind::System),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown envelope kind '{}'", other),
            )),
        }
    }
}

/// One event sent to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    kind: EnvelopeKind,
    text: Option<String>,
    sent_at: Timestamp,
}

impl Envelope {
    /// Builds an envelope stamped with the current time.
    pub fn new(kind: EnvelopeKind, text: Option<String>) -> Self {
        Self {
            kind,
            text,
            sent_at: Timestamp::now(),
        }
    }

    /// Relayed chat text.
    pub fn chat(text: impl Into<String>) -> Self {
        Self::new(EnvelopeKind::Message, Some(text.into()))
    }

    /// Typing notice for the partner.
    pub fn typing() -> Self {
        Self::new(EnvelopeKind::Typing, Some(TYPING_TEXT.to_string()))
    }

    pub fn paired() -> Self {
        Self::new(EnvelopeKind::Paired, Some(PAIRED_TEXT.to_string()))
    }

    pub fn waiting(tag: &Tag) -> Self {
        Self::new(
            EnvelopeKind::Waiting,
            Some(format!(
                "Waiting for a partner with tag: {} in CatChat 🐱",
                tag
            )),
        )
    }

    pub fn partner_left() -> Self {
        Self::new(EnvelopeKind::PartnerLeft, Some(PARTNER_LEFT_TEXT.to_string()))
    }

    /// Local informational notice.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(EnvelopeKind::System, Some(text.into()))
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn sent_at(&self) -> &Timestamp {
        &self.sent_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in [
            EnvelopeKind::Message,
            EnvelopeKind::Typing,
            EnvelopeKind::Next,
            EnvelopeKind::Report,
            EnvelopeKind::Paired,
            EnvelopeKind::Waiting,
            EnvelopeKind::PartnerLeft,
            EnvelopeKind::System,
        ] {
            assert_eq!(kind.as_str().parse::<EnvelopeKind>(), Ok(kind));
        }
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&EnvelopeKind::PartnerLeft).unwrap();
        assert_eq!(json, r#""partner_left""#);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("wave".parse::<EnvelopeKind>().is_err());
    }

    #[test]
    fn waiting_notice_names_the_tag() {
        let env = Envelope::waiting(&Tag::new("music"));
        assert_eq!(env.kind(), EnvelopeKind::Waiting);
        assert_eq!(
            env.text(),
            Some("Waiting for a partner with tag: music in CatChat 🐱")
        );
    }

    #[test]
    fn chat_envelope_carries_text() {
        let env = Envelope::chat("hello");
        assert_eq!(env.kind(), EnvelopeKind::Message);
        assert_eq!(env.text(), Some("hello"));
    }

    #[test]
    fn envelope_is_stamped_at_construction() {
        let before = Timestamp::now();
        let env = Envelope::typing();
        assert!(*env.sent_at() >= before);
    }
}
