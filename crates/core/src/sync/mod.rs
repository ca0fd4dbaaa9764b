//! Sync orchestrator.
//!
//! Reconciles the local movie table against two upstream lists: the metadata
//! API's upcoming releases and the torrent index's newest uploads. Batches
//! never abort: per-item failures are counted and the run moves on.

mod orchestrator;
mod scheduler;
mod types;

pub use orchestrator::SyncOrchestrator;
pub use scheduler::SyncScheduler;
pub use types::*;
