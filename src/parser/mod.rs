//! Event log parsing.
//!
//! This module handles:
//! - Parsing recorded start/end event streams from JSON
//! - Validating that the stream is well formed

pub mod events;

// Re-export main types
pub use events::{
    parse_event_log, read_event_log, validate_event_log, EventKind, EventLog, EventValues,
    TraceEvent,
};
