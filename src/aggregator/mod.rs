//! Aggregation of recorded call data into statistical summaries.
//!
//! This module turns per-edge recordings into:
//! - Streaming summaries (count, sum, min, max, average)
//! - Exact caller -> callee rollups
//! - Callee-only rollups across every caller

pub mod key;
pub mod rollup;
pub mod summary;

// Re-export main types and functions
pub use key::{AggregateKey, ROOT_AGGREGATE};
pub use rollup::{generate_aggregates, synthesize_root_record, AggregateData, EdgeData};
pub use summary::{DistributionSummary, Statistic};
