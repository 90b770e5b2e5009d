//! Event-driven call graph recording.
//!
//! This module handles:
//! - The collector protocol (save a record on start, emit values on end)
//! - Building the call tree while start/end events arrive
//! - Freezing a finished recording into a `TraceResult`

pub mod collector;
pub mod config;
pub mod graph_recorder;

// Re-export main types
pub use collector::MetricCollector;
pub use config::RecorderConfig;
pub use graph_recorder::{GraphRecorder, RecorderBuilder};
