//! Callgraph Metrics
//!
//! Call-graph based metrics collection and aggregation for programs made of
//! nested operation invocations.
//!
//! A [`GraphRecorder`] watches "operation started" / "operation ended"
//! events, builds a deduplicated call tree and asks the registered
//! [`MetricCollector`]s for one value per metric on every call. Once the
//! program finishes, [`GraphRecorder::finalize`] produces a [`TraceResult`]
//! that rolls the per-edge data up by exact (callee, caller) pair and by
//! callee alone, and answers queries or renders the rollup as CSV.
//!
//! ```ignore
//! let mut recorder = GraphRecorder::builder()
//!     .with_collector(MyCollector::default())
//!     .build()?;
//! recorder.on_start(&("Ops.H", Variant::Body), &args)?;
//! recorder.on_end(&("Ops.H", Variant::Body), &args)?;
//! let result = recorder.finalize()?;
//! println!("{}", result.to_csv("G")?);
//! ```

pub mod aggregator;
pub mod callgraph;
pub mod commands;
pub mod output;
pub mod parser;
pub mod recorder;
pub mod results;
pub mod utils;

pub use aggregator::{AggregateKey, DistributionSummary, Statistic, ROOT_AGGREGATE};
pub use callgraph::{CallEdge, CallTree, OperationKey, TracedOperation, Variant};
pub use recorder::{GraphRecorder, MetricCollector, RecorderBuilder, RecorderConfig};
pub use results::{CollectorMetrics, TraceResult};
pub use utils::error::TraceError;
