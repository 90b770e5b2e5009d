//! Tab-separated rendering of a trace rollup.
//!
//! Header: callee key columns, caller key columns (prefixed `Caller`),
//! `Count`, then `<metric>:<statistic>` for every metric and every
//! statistic except `Count`. One row per aggregate key.
//!
//! Cells holding the separator, a quote or a line break are quoted, so
//! every row keeps the header's width whatever the operation names are.

use super::format::NumberFormat;
use crate::aggregator::{AggregateKey, DistributionSummary, Statistic};
use crate::results::TraceResult;
use crate::utils::config::{
    CALLER_COLUMN_PREFIX, COUNT_COLUMN, CSV_SEPARATOR, KEY_COLUMNS, LINE_ENDING,
    METRIC_STATISTIC_SEPARATOR,
};
use crate::utils::error::OutputError;
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use std::ops::Range;

/// Render the whole rollup of `result`, every metric included
pub fn render_csv(result: &TraceResult, format: &NumberFormat) -> Result<String, OutputError> {
    render_metric_range(result, 0..result.metric_names().len(), format)
}

/// Render the rollup restricted to the metrics at `metrics` in the global
/// metric order, e.g. the metrics of one collector
pub fn render_metric_range(
    result: &TraceResult,
    metrics: Range<usize>,
    format: &NumberFormat,
) -> Result<String, OutputError> {
    let mut writer = WriterBuilder::new()
        .delimiter(separator_byte())
        .terminator(terminator())
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(csv_header(&result.metric_names()[metrics.clone()]))?;
    for (key, record) in result.aggregates() {
        writer.write_record(csv_line(key, &record[metrics.clone()], format))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::WriteFailed(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| OutputError::WriteFailed(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Column names: key columns followed by the summary columns
pub fn csv_header(metrics: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = KEY_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(
        KEY_COLUMNS
            .iter()
            .map(|c| format!("{}{}", CALLER_COLUMN_PREFIX, c)),
    );
    columns.extend(summary_headers(metrics));
    columns
}

/// `Count` followed by one column per metric and non-count statistic
pub fn summary_headers(metrics: &[String]) -> Vec<String> {
    let mut headers = vec![COUNT_COLUMN.to_string()];
    for metric in metrics {
        for statistic in non_count_statistics() {
            headers.push(format!("{}{}{}", metric, METRIC_STATISTIC_SEPARATOR, statistic));
        }
    }
    headers
}

fn csv_line(key: &AggregateKey, record: &[DistributionSummary], format: &NumberFormat) -> Vec<String> {
    let mut cells: Vec<String> = key.column_values().into();

    // Every metric gets one sample per invocation, so the counts agree
    let count = record.first().map(DistributionSummary::count).unwrap_or(0);
    debug_assert!(record.iter().all(|summary| summary.count() == count));
    cells.push(format.format(count as f64));

    for summary in record {
        for statistic in non_count_statistics() {
            cells.push(format.format(summary.statistic(statistic)));
        }
    }
    cells
}

fn non_count_statistics() -> impl Iterator<Item = Statistic> {
    Statistic::ALL
        .into_iter()
        .filter(|statistic| *statistic != Statistic::Count)
}

fn separator_byte() -> u8 {
    CSV_SEPARATOR.as_bytes()[0]
}

fn terminator() -> Terminator {
    if LINE_ENDING == "\r\n" {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    }
}
