//! Application layer - the pairing registry, connections and the relay
//! loops that move envelopes between them.

pub mod connection;
pub mod mailbox;
pub mod registry;
pub mod relay;
pub mod session;

pub use connection::Connection;
pub use mailbox::{Mailbox, MailboxConfig, MailboxError, DEFAULT_MAILBOX_CAPACITY};
pub use registry::{PairOutcome, Registry, RegistrySnapshot};
pub use session::{RelayService, RelaySettings, SessionHandle};
