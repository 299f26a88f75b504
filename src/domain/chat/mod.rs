//! Chat domain - envelopes, commands, tags, the text filter and the
//! connection lifecycle.

mod command;
mod connection_status;
mod envelope;
mod filter;
mod tag;

pub use command::ClientCommand;
pub use connection_status::ConnectionStatus;
pub use envelope::{
    Envelope, EnvelopeKind, NO_PARTNER_TEXT, PAIRED_TEXT, PARTNER_LEFT_TEXT, REPORT_ACK_TEXT,
    TYPING_TEXT,
};
pub use filter::{MessageFilter, BLOCKED_WORDS, MASK};
pub use tag::{Tag, DEFAULT_TAG};
