//! Human-readable text summary of a trace.

use crate::aggregator::{rollup::keys_called_by, ROOT_AGGREGATE};
use crate::callgraph::OperationKey;
use crate::results::TraceResult;

/// Generate a short text summary: program totals per metric, then the
/// top-level operations
pub fn generate_text_summary(result: &TraceResult) -> String {
    let mut out = String::new();

    out.push_str("Call Graph Summary\n");
    out.push_str("==================\n");
    out.push_str(&format!("Call edges:     {}\n", result.tree().len() - 1));
    out.push_str(&format!("Aggregate keys: {}\n", result.aggregates().len()));
    out.push('\n');

    out.push_str("Program totals:\n");
    for metric in result.metric_names() {
        if let Ok(summary) = result.summary(&ROOT_AGGREGATE, metric) {
            if summary.is_empty() {
                out.push_str(&format!("  {:<24} (no samples)\n", metric));
            } else {
                out.push_str(&format!(
                    "  {:<24} sum={} avg={} min={} max={}\n",
                    metric,
                    summary.sum(),
                    summary.average(),
                    summary.min(),
                    summary.max()
                ));
            }
        }
    }

    let top_level: Vec<_> = keys_called_by(result.aggregates(), OperationKey::Root).collect();
    if !top_level.is_empty() {
        out.push('\n');
        out.push_str("Top-level operations:\n");
        for key in top_level {
            let count = result
                .summaries(key)
                .ok()
                .and_then(|record| record.first())
                .map(|summary| summary.count())
                .unwrap_or(0);
            out.push_str(&format!("  {} (x{})\n", key.callee, count));
        }
    }

    out
}
