//! HTTP surface of the movie backend.
//!
//! The binary in `main.rs` wires real upstream clients; tests build the same
//! router around mocks.

pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::{AppServices, AppState};
