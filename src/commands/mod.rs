//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod models;
pub mod replay;

// Re-export main command functions
pub use models::ReplayArgs;
pub use replay::{execute_replay, list_metrics, replay_events, RecordedValuesCollector};
