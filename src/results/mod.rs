//! Finalized trace results.

pub mod trace_result;

pub use trace_result::{CollectorMetrics, TraceResult};
