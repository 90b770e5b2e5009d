//! Roll per-edge data up into aggregate views.
//!
//! Every edge contributes its summaries twice: once under the exact
//! (callee, caller) key and once under (callee, ALL). The root edge only
//! has the callee-only key, which is [`ROOT_AGGREGATE`].

use super::key::{AggregateKey, ROOT_AGGREGATE};
use super::summary::DistributionSummary;
use crate::callgraph::{CallEdge, CallTree, OperationKey};
use crate::utils::error::TraceError;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Raw recorded data: edge id -> one summary per tracked metric
pub type EdgeData = HashMap<i64, Vec<DistributionSummary>>;

/// Rolled-up data, ordered by callee then caller
pub type AggregateData = BTreeMap<AggregateKey, Vec<DistributionSummary>>;

/// Build the aggregate map by a depth-first walk from the root
///
/// # Errors
/// * `TraceError::MissingEdgeData` - an edge in the tree has no raw record
pub fn generate_aggregates(tree: &CallTree, edge_data: &EdgeData) -> Result<AggregateData, TraceError> {
    let mut aggregates = AggregateData::new();

    // Explicit stack: traced programs can nest deeper than we want to recurse
    let mut pending: Vec<&CallEdge> = vec![tree.root()];
    while let Some(edge) = pending.pop() {
        let data = edge_data
            .get(&edge.id())
            .ok_or(TraceError::MissingEdgeData(edge.id()))?;

        match tree.parent(edge) {
            Some(parent) => {
                let callee = edge.operation().clone();
                let exact = AggregateKey::new(callee.clone(), parent.operation().clone());
                merge_into(&mut aggregates, exact, data);
                merge_into(&mut aggregates, AggregateKey::any_caller(callee), data);
            }
            None => merge_into(&mut aggregates, ROOT_AGGREGATE, data),
        }

        pending.extend(tree.children(edge));
    }

    debug!(
        "Rolled {} call edges up into {} aggregate keys",
        tree.len(),
        aggregates.len()
    );

    Ok(aggregates)
}

/// Merge `data` pairwise into the entry for `key`, or insert a copy
fn merge_into(aggregates: &mut AggregateData, key: AggregateKey, data: &[DistributionSummary]) {
    match aggregates.get_mut(&key) {
        Some(existing) => {
            assert_eq!(
                existing.len(),
                data.len(),
                "metric count mismatch while aggregating {}",
                key
            );
            for (into, from) in existing.iter_mut().zip(data) {
                into.merge(from);
            }
        }
        None => {
            aggregates.insert(key, data.to_vec());
        }
    }
}

/// The root edge is never closed by an end event, so its record is made
/// up as the merge of its direct children's records. With no top-level
/// calls every summary is empty.
///
/// # Errors
/// * `TraceError::MissingEdgeData` - a top-level edge has no raw record
pub fn synthesize_root_record(
    tree: &CallTree,
    edge_data: &EdgeData,
    metric_count: usize,
) -> Result<Vec<DistributionSummary>, TraceError> {
    let mut record = vec![DistributionSummary::new(); metric_count];
    for child in tree.children(tree.root()) {
        let data = edge_data
            .get(&child.id())
            .ok_or(TraceError::MissingEdgeData(child.id()))?;
        for (into, from) in record.iter_mut().zip(data) {
            into.merge(from);
        }
    }
    Ok(record)
}

/// Sum of the recorded invocation counts of all top-level edges
pub fn top_level_invocations(tree: &CallTree) -> u64 {
    tree.children(tree.root())
        .map(CallEdge::invocation_count)
        .sum()
}

/// Keys whose caller is `caller`, e.g. everything called from `ROOT`
pub fn keys_called_by(
    aggregates: &AggregateData,
    caller: OperationKey,
) -> impl Iterator<Item = &AggregateKey> + '_ {
    aggregates.keys().filter(move |key| key.caller == caller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callgraph::Variant;
    use crate::utils::config::ROOT_EDGE_ID;

    fn op(name: &str) -> OperationKey {
        OperationKey::new(name, Variant::Body)
    }

    fn summaries(samples: &[f64]) -> Vec<DistributionSummary> {
        vec![DistributionSummary::from_samples(samples.iter().copied())]
    }

    #[test]
    fn test_missing_edge_data_is_an_error() {
        let mut tree = CallTree::new();
        tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 1).unwrap();

        let mut data = EdgeData::new();
        data.insert(ROOT_EDGE_ID, summaries(&[1.0]));

        assert_eq!(
            generate_aggregates(&tree, &data),
            Err(TraceError::MissingEdgeData(1))
        );
    }

    #[test]
    fn test_exact_and_wildcard_keys() {
        let mut tree = CallTree::new();
        let (a, _) = tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 1).unwrap();
        let (c, _) = tree.add_or_get_child(ROOT_EDGE_ID, op("C"), 2).unwrap();
        let (ba, _) = tree.add_or_get_child(a, op("B"), 3).unwrap();
        let (bc, _) = tree.add_or_get_child(c, op("B"), 4).unwrap();

        let mut data = EdgeData::new();
        data.insert(a, summaries(&[1.0]));
        data.insert(c, summaries(&[1.0]));
        data.insert(ba, summaries(&[2.0]));
        data.insert(bc, summaries(&[6.0]));
        let root = synthesize_root_record(&tree, &data, 1).unwrap();
        data.insert(ROOT_EDGE_ID, root);

        let aggregates = generate_aggregates(&tree, &data).unwrap();

        let b_any = &aggregates[&AggregateKey::any_caller(op("B"))][0];
        assert_eq!(b_any.count(), 2);
        assert_eq!(b_any.sum(), 8.0);

        let b_from_a = &aggregates[&AggregateKey::new(op("B"), op("A"))][0];
        assert_eq!(b_from_a.count(), 1);
        assert_eq!(b_from_a.sum(), 2.0);

        // Top-level edges only: B's samples stay out of the grand total
        let total = &aggregates[&ROOT_AGGREGATE][0];
        assert_eq!(total.count(), 2);
        assert_eq!(total.sum(), 2.0);

        // ROOT, A, C, B each with ALL, plus A<-ROOT, C<-ROOT, B<-A, B<-C
        assert_eq!(aggregates.len(), 8);
        assert_eq!(keys_called_by(&aggregates, OperationKey::Root).count(), 2);
    }

    #[test]
    fn test_root_record_without_calls_is_empty() {
        let tree = CallTree::new();
        let record = synthesize_root_record(&tree, &EdgeData::new(), 3).unwrap();
        assert_eq!(record.len(), 3);
        assert!(record.iter().all(DistributionSummary::is_empty));
        assert_eq!(top_level_invocations(&tree), 0);
    }
}
