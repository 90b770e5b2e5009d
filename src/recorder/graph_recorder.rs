//! Live call graph recorder.
//!
//! Turns a stream of operation start/end events into a call tree plus one
//! set of distribution summaries per distinct call edge, delegating the
//! metric values themselves to the registered collectors.
//!
//! Metrics are laid out collector by collector: the first collector's
//! metrics come first, in the order it declares them, then the next
//! collector's, and so on.

use super::collector::{CollectorStack, MetricCollector, StackedCollector};
use super::config::RecorderConfig;
use crate::aggregator::{synthesize_root_record, DistributionSummary, EdgeData};
use crate::callgraph::{CallEdge, CallTree, OperationKey, TracedOperation};
use crate::results::{CollectorMetrics, TraceResult};
use crate::utils::config::{FIRST_EDGE_ID, ROOT_EDGE_ID};
use crate::utils::error::TraceError;
use log::{debug, info};
use std::collections::HashSet;

/// Registers collectors and settings before recording starts
pub struct RecorderBuilder<A: ?Sized + 'static> {
    collectors: Vec<Box<dyn CollectorStack<A>>>,
    config: RecorderConfig,
}

impl<A: ?Sized + 'static> Default for RecorderBuilder<A> {
    fn default() -> Self {
        Self {
            collectors: Vec::new(),
            config: RecorderConfig::default(),
        }
    }
}

impl<A: ?Sized + 'static> RecorderBuilder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a collector; registration order fixes the metric order
    pub fn with_collector<C>(mut self, collector: C) -> Self
    where
        C: MetricCollector<A> + 'static,
    {
        self.collectors.push(Box::new(StackedCollector::new(collector)));
        self
    }

    pub fn with_config(mut self, config: RecorderConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// * `TraceError::NoCollectors` - nothing was registered
    /// * `TraceError::DuplicateMetric` - two collectors declare the same metric name
    /// * `TraceError::DuplicateCollector` - two collectors share a name
    pub fn build(self) -> Result<GraphRecorder<A>, TraceError> {
        GraphRecorder::from_parts(self.collectors, self.config)
    }
}

/// Event-driven call graph recorder
pub struct GraphRecorder<A: ?Sized + 'static> {
    tree: CallTree,
    collectors: Vec<Box<dyn CollectorStack<A>>>,
    metric_counts: Vec<usize>,
    metrics: Vec<String>,
    edge_data: EdgeData,
    current: i64,
    depth: usize,
    next_id: i64,
    config: RecorderConfig,
    aborted: bool,
}

impl<A: ?Sized + 'static> GraphRecorder<A> {
    pub fn builder() -> RecorderBuilder<A> {
        RecorderBuilder::new()
    }

    fn from_parts(
        collectors: Vec<Box<dyn CollectorStack<A>>>,
        config: RecorderConfig,
    ) -> Result<Self, TraceError> {
        if collectors.is_empty() {
            return Err(TraceError::NoCollectors);
        }

        let mut metrics = Vec::new();
        let mut metric_counts = Vec::with_capacity(collectors.len());
        let mut seen = HashSet::new();
        let mut names = HashSet::new();
        for collector in &collectors {
            let declared = collector.metrics();
            for metric in &declared {
                if !seen.insert(metric.clone()) {
                    return Err(TraceError::DuplicateMetric(metric.clone()));
                }
            }
            if !names.insert(collector.name().to_string()) {
                return Err(TraceError::DuplicateCollector(collector.name().to_string()));
            }
            metric_counts.push(declared.len());
            metrics.extend(declared);
        }

        debug!(
            "Recorder tracking {} metrics from {} collectors",
            metrics.len(),
            collectors.len()
        );

        Ok(Self {
            tree: CallTree::new(),
            collectors,
            metric_counts,
            metrics,
            edge_data: EdgeData::new(),
            current: ROOT_EDGE_ID,
            depth: 0,
            next_id: FIRST_EDGE_ID,
            config,
            aborted: false,
        })
    }

    /// Handle an operation-started event
    ///
    /// # Errors
    /// * `TraceError::DepthLimitExceeded` - the configured nesting limit was hit
    /// * `TraceError::InvalidTraceState` - the recorder was aborted earlier
    pub fn on_start<O>(&mut self, op: &O, args: &A) -> Result<(), TraceError>
    where
        O: TracedOperation + ?Sized,
    {
        self.ensure_not_aborted()?;

        if let Some(max_depth) = self.config.max_depth {
            if self.depth >= max_depth {
                self.aborted = true;
                return Err(TraceError::DepthLimitExceeded(max_depth));
            }
        }

        self.depth += 1;
        let callee = OperationKey::from_operation(op);

        let (child, created) = self
            .tree
            .add_or_get_child(self.current, callee, self.next_id)
            .ok_or_else(|| self.abort(format!("cannot attach a call edge below {}", self.current)))?;
        if created {
            self.next_id += 1;
        }
        self.current = child;

        for collector in &mut self.collectors {
            collector.push_start(args);
        }

        Ok(())
    }

    /// Handle an operation-ended event
    ///
    /// # Errors
    /// * `TraceError::InvalidTraceState` - no call is open, the event does not
    ///   match the open call, or the recorder was aborted earlier
    /// * `TraceError::CollectorOutputMismatch` - a collector returned the wrong
    ///   number of values
    pub fn on_end<O>(&mut self, op: &O, args: &A) -> Result<(), TraceError>
    where
        O: TracedOperation + ?Sized,
    {
        self.ensure_not_aborted()?;

        let (operation, parent) = match self.tree.edge(self.current) {
            Some(edge) => (edge.operation().clone(), self.tree.parent(edge).map(CallEdge::id)),
            None => return Err(self.abort(format!("open call edge {} vanished", self.current))),
        };

        let parent = match parent {
            Some(parent) if self.depth > 0 => parent,
            _ => {
                return Err(self.abort(format!(
                    "end of {} received with no open call",
                    OperationKey::from_operation(op)
                )))
            }
        };

        if !operation.matches(op) {
            return Err(self.abort(format!(
                "end of {} does not match open call {}",
                OperationKey::from_operation(op),
                operation
            )));
        }

        let metric_total = self.metrics.len();
        let record = self
            .edge_data
            .entry(self.current)
            .or_insert_with(|| vec![DistributionSummary::new(); metric_total]);

        let mut offset = 0;
        let mut failure = None;
        for (collector, &expected) in self.collectors.iter_mut().zip(&self.metric_counts) {
            let Some(values) = collector.pop_end(args) else {
                failure = Some(TraceError::InvalidTraceState(format!(
                    "collector {} has no saved record for {}",
                    collector.name(),
                    operation
                )));
                break;
            };

            if values.len() != expected {
                failure = Some(TraceError::CollectorOutputMismatch {
                    collector: collector.name().to_string(),
                    expected,
                    actual: values.len(),
                });
                break;
            }

            for (slot, value) in record[offset..offset + expected].iter_mut().zip(values) {
                slot.add_sample(value);
            }
            offset += expected;
        }

        if let Some(error) = failure {
            self.aborted = true;
            return Err(error);
        }

        self.current = parent;
        self.depth -= 1;
        Ok(())
    }

    /// True while any call is open
    pub fn is_recording(&self) -> bool {
        self.depth > 0 || self.current != ROOT_EDGE_ID
    }

    /// True once a protocol failure has made the trace unusable
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Freeze a copy of the recording into a queryable [`TraceResult`]
    ///
    /// # Errors
    /// * `TraceError::StillRecording` - calls are still open
    /// * `TraceError::InvalidTraceState` - the recorder was aborted
    pub fn finalize(&self) -> Result<TraceResult, TraceError> {
        self.ensure_not_aborted()?;
        if self.is_recording() {
            return Err(TraceError::StillRecording);
        }

        let tree = self.tree.clone();
        let mut edge_data = self.edge_data.clone();
        let root_record = synthesize_root_record(&tree, &edge_data, self.metrics.len())?;
        edge_data.insert(ROOT_EDGE_ID, root_record);

        info!(
            "Finalizing trace: {} call edges, {} metrics",
            tree.len(),
            self.metrics.len()
        );

        TraceResult::new(tree, edge_data, self.collector_metrics())
    }

    /// Raw summaries recorded for one edge
    ///
    /// # Errors
    /// * `TraceError::StillRecording` - calls are still open
    /// * `TraceError::MissingEdgeData` - nothing was recorded for `edge_id`
    pub fn edge_data(&self, edge_id: i64) -> Result<&[DistributionSummary], TraceError> {
        if self.is_recording() {
            return Err(TraceError::StillRecording);
        }
        self.edge_data
            .get(&edge_id)
            .map(Vec::as_slice)
            .ok_or(TraceError::MissingEdgeData(edge_id))
    }

    /// Tracked metric names in global order
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn root(&self) -> &CallEdge {
        self.tree.root()
    }

    /// Edge of the innermost open call (the root when idle)
    pub fn current_edge(&self) -> Option<&CallEdge> {
        self.tree.edge(self.current)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Names of the registered collectors, in registration order
    pub fn collector_names(&self) -> Vec<String> {
        self.collectors.iter().map(|c| c.name().to_string()).collect()
    }

    fn collector_metrics(&self) -> Vec<CollectorMetrics> {
        let mut offset = 0;
        self.collectors
            .iter()
            .zip(&self.metric_counts)
            .map(|(collector, &count)| {
                let metrics = self.metrics[offset..offset + count].to_vec();
                offset += count;
                CollectorMetrics::new(collector.name(), metrics)
            })
            .collect()
    }

    /// Records each collector still holds for open calls
    pub fn open_records(&self) -> Vec<usize> {
        self.collectors.iter().map(|c| c.open_records()).collect()
    }

    fn ensure_not_aborted(&self) -> Result<(), TraceError> {
        if self.aborted {
            return Err(TraceError::InvalidTraceState(
                "recording was aborted by an earlier failure".to_string(),
            ));
        }
        Ok(())
    }

    fn abort(&mut self, reason: String) -> TraceError {
        self.aborted = true;
        TraceError::InvalidTraceState(reason)
    }
}
