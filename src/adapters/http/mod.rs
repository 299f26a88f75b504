//! HTTP adapters - router composition, status endpoints and static files.

pub mod router;
pub mod status;

pub use router::app_router;
pub use status::{status_router, StatusState};
