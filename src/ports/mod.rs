//! Ports - Interfaces for external dependencies.
//!
//! The relay core only talks to a connection through these two traits;
//! transport adapters implement them.
//!
//! - `EnvelopeSource` - decodes inbound client commands
//! - `EnvelopeSink` - writes outbound envelopes and closes the transport

mod transport;

pub use transport::{EnvelopeSink, EnvelopeSource, TransportError};
