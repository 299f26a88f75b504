//! In-memory adapters.

pub mod transport;

pub use transport::{pair, MemoryClient, MemorySink, MemorySource};
