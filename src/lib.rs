//! CatChat - anonymous tag-based chat relay
//!
//! Connections arrive over WebSocket carrying an optional tag. Two
//! connections with the same tag are paired and every chat envelope one of
//! them sends is relayed to the other until either side leaves or asks for
//! a new partner.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
