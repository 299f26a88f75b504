//! Adapters - Implementations of port interfaces.
//!
//! - `websocket` - axum WebSocket transport
//! - `memory` - in-process transport used by tests and local tooling
//! - `http` - router composition, status endpoints and static files

pub mod http;
pub mod memory;
pub mod websocket;
