//! Error types for the entire crate.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while recording a trace or querying its results
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error("Invalid call graph state: {0}")]
    InvalidTraceState(String),

    #[error("Tracer is still recording; results are not available yet")]
    StillRecording,

    #[error("Metric {0} was not tracked by the tracer")]
    UnknownMetric(String),

    #[error("Unknown statistic {0}; expected one of Sum, Average, Min, Max, Count")]
    UnknownStatistic(String),

    #[error("Invocation of {callee} by {caller} never occurred during tracing")]
    UnknownInvocation { callee: String, caller: String },

    #[error("Metric {0} varies across invocations; look up an individual statistic instead")]
    NotADistribution(String),

    #[error("Metric {0} has no recorded samples")]
    NoSamples(String),

    #[error("No metric collectors provided")]
    NoCollectors,

    #[error("Duplicate metric {0} tracked by more than one collector")]
    DuplicateMetric(String),

    #[error("Duplicate collector name {0}")]
    DuplicateCollector(String),

    #[error("Collector {collector} returned {actual} values, expected {expected}")]
    CollectorOutputMismatch {
        collector: String,
        expected: usize,
        actual: usize,
    },

    #[error("No recorded data for call edge {0}")]
    MissingEdgeData(i64),

    #[error("Call depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
}

/// Errors that can occur while parsing an event log
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid event log format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Invalid number format: {0}")]
    InvalidNumberFormat(String),

    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),
}
