//! Domain layer containing relay types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, state machine, errors)
//! - `chat` - Envelopes, client commands, tags, the text filter and
//!   connection status

pub mod chat;
pub mod foundation;
