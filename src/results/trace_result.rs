//! Finished trace results and their query surface.
//!
//! A [`TraceResult`] owns its own copy of the call tree and raw per-edge
//! data, plus the rollup built from them. Nothing in it is shared with the
//! recorder that produced it, so it can be read from any thread.

use crate::aggregator::{
    generate_aggregates, AggregateData, AggregateKey, DistributionSummary, EdgeData, Statistic,
    ROOT_AGGREGATE,
};
use crate::callgraph::{CallTree, OperationKey, Variant};
use crate::output::{render_csv, render_metric_range, NumberFormat};
use crate::utils::config::ROOT_EDGE_ID;
use crate::utils::error::{OutputError, TraceError};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::path::Path;

/// Metrics declared by one collector, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorMetrics {
    pub name: String,
    pub metrics: Vec<String>,
}

impl CollectorMetrics {
    pub fn new(name: impl Into<String>, metrics: Vec<String>) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }
}

/// Read-only aggregation of a finished trace
#[derive(Debug)]
pub struct TraceResult {
    tree: CallTree,
    edge_data: EdgeData,
    aggregates: AggregateData,
    metrics: Vec<String>,
    metric_ids: HashMap<String, usize>,
    collectors: Vec<(String, Range<usize>)>,
}

impl TraceResult {
    /// Build results from a finished tree and its raw per-edge data
    ///
    /// Edge records hold the collectors' metrics back to back, in the
    /// order `collectors` lists them.
    ///
    /// # Errors
    /// * `TraceError::NoCollectors` - no metrics were tracked
    /// * `TraceError::DuplicateCollector` - two collectors share a name
    /// * `TraceError::MissingEdgeData` - the root or another edge has no data
    pub fn new(
        tree: CallTree,
        edge_data: EdgeData,
        collectors: Vec<CollectorMetrics>,
    ) -> Result<Self, TraceError> {
        let mut metrics = Vec::new();
        let mut layout: Vec<(String, Range<usize>)> = Vec::with_capacity(collectors.len());
        for collector in collectors {
            if layout.iter().any(|(name, _)| *name == collector.name) {
                return Err(TraceError::DuplicateCollector(collector.name));
            }
            let start = metrics.len();
            metrics.extend(collector.metrics);
            layout.push((collector.name, start..metrics.len()));
        }

        if metrics.is_empty() {
            return Err(TraceError::NoCollectors);
        }
        if !edge_data.contains_key(&ROOT_EDGE_ID) {
            return Err(TraceError::MissingEdgeData(ROOT_EDGE_ID));
        }

        let metric_ids = metrics
            .iter()
            .enumerate()
            .map(|(index, metric)| (metric.clone(), index))
            .collect();

        let aggregates = generate_aggregates(&tree, &edge_data)?;
        debug!("Trace result holds {} aggregate keys", aggregates.len());

        Ok(Self {
            tree,
            edge_data,
            aggregates,
            metrics,
            metric_ids,
            collectors: layout,
        })
    }

    /// Single value of `metric` over the whole program
    ///
    /// # Errors
    /// * `TraceError::UnknownMetric` - the metric was never tracked
    /// * `TraceError::NotADistribution` - recorded values differ; ask for a statistic
    /// * `TraceError::NoSamples` - nothing was recorded
    pub fn metric(&self, metric: &str) -> Result<f64, TraceError> {
        self.single_value(&ROOT_AGGREGATE, metric)
    }

    pub fn metric_statistic(&self, metric: &str, statistic: &str) -> Result<f64, TraceError> {
        self.statistic_value(&ROOT_AGGREGATE, metric, statistic)
    }

    /// Single value of `metric` for an operation, across all of its callers
    pub fn operation_metric(&self, operation: &str, variant: Variant, metric: &str) -> Result<f64, TraceError> {
        let key = AggregateKey::any_caller(OperationKey::new(operation, variant));
        self.single_value(&key, metric)
    }

    pub fn operation_metric_statistic(
        &self,
        operation: &str,
        variant: Variant,
        metric: &str,
        statistic: &str,
    ) -> Result<f64, TraceError> {
        let key = AggregateKey::any_caller(OperationKey::new(operation, variant));
        self.statistic_value(&key, metric, statistic)
    }

    /// Single value of `metric` for calls of `callee` made by `caller`
    ///
    /// # Errors
    /// * `TraceError::UnknownInvocation` - `caller` never called `callee`
    pub fn edge_metric(
        &self,
        callee: &OperationKey,
        caller: &OperationKey,
        metric: &str,
    ) -> Result<f64, TraceError> {
        let key = AggregateKey::new(callee.clone(), caller.clone());
        self.single_value(&key, metric)
    }

    pub fn edge_metric_statistic(
        &self,
        callee: &OperationKey,
        caller: &OperationKey,
        metric: &str,
        statistic: &str,
    ) -> Result<f64, TraceError> {
        let key = AggregateKey::new(callee.clone(), caller.clone());
        self.statistic_value(&key, metric, statistic)
    }

    /// Full summary of `metric` under an aggregate key
    pub fn summary(&self, key: &AggregateKey, metric: &str) -> Result<&DistributionSummary, TraceError> {
        let metric_id = self.metric_id(metric)?;
        Ok(&self.summaries(key)?[metric_id])
    }

    /// All metric summaries under an aggregate key, in metric order
    ///
    /// # Errors
    /// * `TraceError::UnknownInvocation` - the key never occurred
    pub fn summaries(&self, key: &AggregateKey) -> Result<&[DistributionSummary], TraceError> {
        self.aggregates
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| TraceError::UnknownInvocation {
                callee: key.callee.to_string(),
                caller: key.caller.to_string(),
            })
    }

    pub fn metric_names(&self) -> &[String] {
        &self.metrics
    }

    /// Names of the collectors that produced this result, in registration order
    pub fn collector_names(&self) -> impl Iterator<Item = &str> {
        self.collectors.iter().map(|(name, _)| name.as_str())
    }

    /// Metrics declared by one collector
    pub fn collector_metrics(&self, collector: &str) -> Option<&[String]> {
        self.collectors
            .iter()
            .find(|(name, _)| name == collector)
            .map(|(_, range)| &self.metrics[range.clone()])
    }

    /// Statistics available for `metric`
    pub fn statistic_names(&self, metric: &str) -> Result<Vec<String>, TraceError> {
        self.metric_id(metric)?;
        Ok(Statistic::ALL.iter().map(|s| s.to_string()).collect())
    }

    pub fn aggregate_keys(&self) -> impl Iterator<Item = &AggregateKey> {
        self.aggregates.keys()
    }

    pub fn aggregates(&self) -> &AggregateData {
        &self.aggregates
    }

    /// Raw summaries recorded for one call edge
    pub fn edge_summaries(&self, edge_id: i64) -> Option<&[DistributionSummary]> {
        self.edge_data.get(&edge_id).map(Vec::as_slice)
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    /// Render the rollup as tab-separated text
    ///
    /// # Errors
    /// * `OutputError::InvalidNumberFormat` - `number_format` is not understood
    pub fn to_csv(&self, number_format: &str) -> Result<String, OutputError> {
        let format: NumberFormat = number_format.parse()?;
        render_csv(self, &format)
    }

    /// One render per collector, each holding only that collector's metrics
    ///
    /// # Errors
    /// * `OutputError::InvalidNumberFormat` - `number_format` is not understood
    pub fn to_csv_by_collector(&self, number_format: &str) -> Result<BTreeMap<String, String>, OutputError> {
        let format: NumberFormat = number_format.parse()?;
        let mut renders = BTreeMap::new();
        for (name, range) in &self.collectors {
            renders.insert(name.clone(), render_metric_range(self, range.clone(), &format)?);
        }
        Ok(renders)
    }

    /// Write the CSV render to `path`, creating parent directories
    pub fn write_csv(&self, path: impl AsRef<Path>, number_format: &str) -> Result<(), OutputError> {
        let content = self.to_csv(number_format)?;
        crate::output::write_text(&content, path)
    }

    fn metric_id(&self, metric: &str) -> Result<usize, TraceError> {
        self.metric_ids
            .get(metric)
            .copied()
            .ok_or_else(|| TraceError::UnknownMetric(metric.to_string()))
    }

    fn single_value(&self, key: &AggregateKey, metric: &str) -> Result<f64, TraceError> {
        let summary = self.summary(key, metric)?;
        if summary.is_empty() {
            return Err(TraceError::NoSamples(metric.to_string()));
        }
        if !summary.is_single_valued() {
            return Err(TraceError::NotADistribution(metric.to_string()));
        }
        Ok(summary.min())
    }

    fn statistic_value(&self, key: &AggregateKey, metric: &str, statistic: &str) -> Result<f64, TraceError> {
        let metric_id = self.metric_id(metric)?;
        let statistic: Statistic = statistic.parse()?;
        Ok(self.summaries(key)?[metric_id].statistic(statistic))
    }
}

impl Clone for TraceResult {
    /// Deep copy that rebuilds the rollup from the copied raw data
    fn clone(&self) -> Self {
        let aggregates = generate_aggregates(&self.tree, &self.edge_data)
            .expect("edge data was validated when the result was built");
        Self {
            tree: self.tree.clone(),
            edge_data: self.edge_data.clone(),
            aggregates,
            metrics: self.metrics.clone(),
            metric_ids: self.metric_ids.clone(),
            collectors: self.collectors.clone(),
        }
    }
}
