use callgraph_metrics::recorder::{GraphRecorder, MetricCollector};
use callgraph_metrics::{AggregateKey, OperationKey, TraceError, TraceResult, Variant, ROOT_AGGREGATE};

/// Reports the end-event argument as the metric value
struct ValueCollector;

impl MetricCollector<f64> for ValueCollector {
    type Record = ();

    fn name(&self) -> &str {
        "Value"
    }

    fn metrics(&self) -> Vec<String> {
        vec!["M".to_string()]
    }

    fn save_on_start(&mut self, _args: &f64) {}

    fn finish_on_end(&mut self, _record: (), args: &f64) -> Vec<f64> {
        vec![*args]
    }
}

fn op(name: &str) -> OperationKey {
    OperationKey::new(name, Variant::Body)
}

/// Replays `calls` as (caller, callee) pairs under one top-level operation
/// each; every end event reports `value`
fn trace(paths: &[(&[&str], f64)]) -> TraceResult {
    let mut recorder = GraphRecorder::builder()
        .with_collector(ValueCollector)
        .build()
        .unwrap();

    for (path, value) in paths {
        for name in path.iter() {
            recorder.on_start(&(*name, Variant::Body), &0.0).unwrap();
        }
        for name in path.iter().rev() {
            recorder.on_end(&(*name, Variant::Body), value).unwrap();
        }
    }

    recorder.finalize().unwrap()
}

#[test]
fn test_same_callee_two_callers() {
    let result = trace(&[(&["A", "B"], 1.0), (&["C", "B"], 1.0)]);

    assert_eq!(
        result.edge_metric_statistic(&op("B"), &op("A"), "M", "Count").unwrap(),
        1.0
    );
    assert_eq!(
        result.edge_metric_statistic(&op("B"), &op("C"), "M", "Count").unwrap(),
        1.0
    );
    assert_eq!(
        result
            .operation_metric_statistic("B", Variant::Body, "M", "Count")
            .unwrap(),
        2.0
    );
    assert_eq!(result.edge_metric(&op("B"), &op("A"), "M").unwrap(), 1.0);
}

#[test]
fn test_unknown_metric() {
    let result = trace(&[(&["A"], 1.0)]);
    assert_eq!(
        result.metric_statistic("X", "Average").unwrap_err(),
        TraceError::UnknownMetric("X".to_string())
    );
    assert_eq!(
        result.statistic_names("X").unwrap_err(),
        TraceError::UnknownMetric("X".to_string())
    );
}

#[test]
fn test_unknown_statistic() {
    let result = trace(&[(&["A"], 1.0)]);
    assert_eq!(
        result.metric_statistic("M", "Median").unwrap_err(),
        TraceError::UnknownStatistic("Median".to_string())
    );
}

#[test]
fn test_varying_metric_is_not_a_distribution() {
    let result = trace(&[(&["A"], 3.0), (&["A"], 5.0)]);

    assert_eq!(
        result.metric("M").unwrap_err(),
        TraceError::NotADistribution("M".to_string())
    );
    assert_eq!(result.metric_statistic("M", "Min").unwrap(), 3.0);
    assert_eq!(result.metric_statistic("M", "Max").unwrap(), 5.0);
    assert_eq!(result.metric_statistic("M", "Average").unwrap(), 4.0);
    assert_eq!(result.metric_statistic("M", "sum").unwrap(), 8.0);
}

#[test]
fn test_single_valued_metric() {
    let result = trace(&[(&["A"], 2.0), (&["B"], 2.0)]);
    assert_eq!(result.metric("M").unwrap(), 2.0);
    assert_eq!(result.operation_metric("A", Variant::Body, "M").unwrap(), 2.0);
}

#[test]
fn test_unknown_invocation() {
    let result = trace(&[(&["A", "B"], 1.0)]);

    assert!(matches!(
        result.edge_metric(&op("A"), &op("B"), "M"),
        Err(TraceError::UnknownInvocation { .. })
    ));
    assert!(matches!(
        result.operation_metric("Z", Variant::Body, "M"),
        Err(TraceError::UnknownInvocation { .. })
    ));
    assert!(matches!(
        result.operation_metric("B", Variant::Adjoint, "M"),
        Err(TraceError::UnknownInvocation { .. })
    ));
}

#[test]
fn test_top_level_calls_are_called_by_root() {
    let result = trace(&[(&["A", "B"], 1.0)]);

    assert_eq!(
        result
            .edge_metric_statistic(&op("A"), &OperationKey::ROOT, "M", "Count")
            .unwrap(),
        1.0
    );
    assert!(result
        .aggregate_keys()
        .any(|key| key.is_root_call() && key.callee == op("A")));
}

#[test]
fn test_root_aggregate_counts_top_level_invocations() {
    let result = trace(&[
        (&["A", "B", "C"], 1.0),
        (&["A", "B"], 1.0),
        (&["D"], 1.0),
    ]);

    // Three top-level invocations; nested calls never reach the grand total
    let total = result.summary(&ROOT_AGGREGATE, "M").unwrap();
    assert_eq!(total.count(), 3);

    // Keys for different operations stay apart
    let b = result.summary(&AggregateKey::any_caller(op("B")), "M").unwrap();
    assert_eq!(b.count(), 2);
    let c = result.summary(&AggregateKey::any_caller(op("C")), "M").unwrap();
    assert_eq!(c.count(), 1);
}

#[test]
fn test_recursive_operation() {
    // A calls itself: the inner edge is a distinct call-site keyed (A, A)
    let result = trace(&[(&["A", "A"], 1.0)]);

    assert_eq!(
        result.edge_metric_statistic(&op("A"), &op("A"), "M", "Count").unwrap(),
        1.0
    );
    assert_eq!(
        result
            .operation_metric_statistic("A", Variant::Body, "M", "Count")
            .unwrap(),
        2.0
    );
}

#[test]
fn test_empty_trace() {
    let result = trace(&[]);

    assert_eq!(result.metric("M").unwrap_err(), TraceError::NoSamples("M".to_string()));
    assert_eq!(result.metric_statistic("M", "Count").unwrap(), 0.0);
    assert_eq!(result.aggregates().len(), 1);
}

#[test]
fn test_introspection() {
    let result = trace(&[(&["A"], 1.0)]);

    assert_eq!(result.metric_names(), &["M"]);
    assert_eq!(
        result.statistic_names("M").unwrap(),
        vec!["Sum", "Average", "Min", "Max", "Count"]
    );
}

#[test]
fn test_clone_is_independent_and_equal() {
    let result = trace(&[(&["A", "B"], 2.0), (&["C", "B"], 4.0)]);
    let copy = result.clone();

    assert_eq!(copy.aggregates(), result.aggregates());
    assert_eq!(copy.tree().len(), result.tree().len());
    assert_eq!(copy.to_csv("G").unwrap(), result.to_csv("G").unwrap());
    assert!(!std::ptr::eq(copy.tree(), result.tree()));
    assert_eq!(
        copy.to_csv_by_collector("G").unwrap(),
        result.to_csv_by_collector("G").unwrap()
    );
}

#[test]
fn test_result_is_shareable_across_threads() {
    let result = std::sync::Arc::new(trace(&[(&["A"], 1.0)]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let result = std::sync::Arc::clone(&result);
            std::thread::spawn(move || result.metric("M").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1.0);
    }
}

#[test]
fn test_result_rejects_duplicate_collector_names() {
    use callgraph_metrics::aggregator::{synthesize_root_record, EdgeData};
    use callgraph_metrics::utils::config::ROOT_EDGE_ID;
    use callgraph_metrics::{CallTree, CollectorMetrics};

    let tree = CallTree::new();
    let mut data = EdgeData::new();
    let root = synthesize_root_record(&tree, &data, 2).unwrap();
    data.insert(ROOT_EDGE_ID, root);

    let collectors = vec![
        CollectorMetrics::new("Value", vec!["M".to_string()]),
        CollectorMetrics::new("Value", vec!["N".to_string()]),
    ];
    assert_eq!(
        TraceResult::new(tree.clone(), data.clone(), collectors).unwrap_err(),
        TraceError::DuplicateCollector("Value".to_string())
    );

    let empty = vec![CollectorMetrics::new("Value", Vec::new())];
    assert_eq!(
        TraceResult::new(tree, data, empty).unwrap_err(),
        TraceError::NoCollectors
    );
}
