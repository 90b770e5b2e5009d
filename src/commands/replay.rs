//! Replay command implementation.
//!
//! The replay command:
//! 1. Reads a recorded event log
//! 2. Feeds every start/end event through a `GraphRecorder`
//! 3. Finalizes the recording
//! 4. Prints a summary and writes the CSV report

use crate::commands::models::ReplayArgs;
use crate::output::{generate_text_summary, write_text, NumberFormat};
use crate::parser::{read_event_log, EventKind, EventLog, EventValues};
use crate::recorder::{GraphRecorder, MetricCollector, RecorderConfig};
use crate::results::TraceResult;
use crate::utils::error::TraceError;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Collector reporting the metric values carried on each end event
///
/// A value missing from an end event is recorded as `0.0`.
#[derive(Debug, Clone)]
pub struct RecordedValuesCollector {
    metrics: Vec<String>,
}

impl RecordedValuesCollector {
    pub fn new(metrics: Vec<String>) -> Self {
        Self { metrics }
    }
}

impl MetricCollector<EventValues> for RecordedValuesCollector {
    type Record = ();

    fn name(&self) -> &str {
        "Recorded Values"
    }

    fn metrics(&self) -> Vec<String> {
        self.metrics.clone()
    }

    fn save_on_start(&mut self, _args: &EventValues) {}

    fn finish_on_end(&mut self, _record: (), args: &EventValues) -> Vec<f64> {
        self.metrics
            .iter()
            .map(|metric| match args.get(metric) {
                Some(value) => *value,
                None => {
                    warn!("End event has no value for {}, recording 0", metric);
                    0.0
                }
            })
            .collect()
    }
}

/// Replay an event log through a fresh recorder
///
/// # Errors
/// * `TraceError::NoCollectors` - no end event carries any metric value
/// * Any recorder error raised by a malformed event stream
pub fn replay_events(log: &EventLog, config: RecorderConfig) -> Result<TraceResult, TraceError> {
    let metrics = log.metric_names();
    if metrics.is_empty() {
        return Err(TraceError::NoCollectors);
    }
    debug!("Replaying {} events tracking {:?}", log.events.len(), metrics);

    let mut recorder = GraphRecorder::<EventValues>::builder()
        .with_collector(RecordedValuesCollector::new(metrics))
        .with_config(config)
        .build()?;

    for event in &log.events {
        match event.kind {
            EventKind::Start => recorder.on_start(event, &event.values)?,
            EventKind::End => recorder.on_end(event, &event.values)?,
        }
    }

    recorder.finalize()
}

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Event log read or parse failures
/// * Malformed event streams
/// * File write errors
pub fn execute_replay(args: ReplayArgs) -> Result<()> {
    let start_time = Instant::now();

    let format: NumberFormat = args
        .number_format
        .parse()
        .context("Invalid number format")?;

    info!("Reading event log: {}", args.input.display());
    let log = read_event_log(&args.input).context("Failed to read event log")?;

    if log.events.is_empty() {
        bail!("Event log {} contains no events", args.input.display());
    }

    let mut config = RecorderConfig::new();
    if let Some(max_depth) = args.max_depth {
        config = config.with_max_depth(max_depth);
    }

    info!("Replaying {} invocations...", log.invocation_count());
    let result = replay_events(&log, config).context("Failed to replay event log")?;

    if args.print_summary {
        println!("{}", generate_text_summary(&result));
    }

    let csv = crate::output::render_csv(&result, &format).context("Failed to render CSV report")?;
    match &args.output_csv {
        Some(path) => write_text(&csv, path).context("Failed to write CSV report")?,
        None => print!("{}", csv),
    }

    info!("Replay complete in {:.2?}", start_time.elapsed());
    Ok(())
}

/// List the metrics carried by an event log
pub fn list_metrics(input: &std::path::Path) -> Result<Vec<String>> {
    let log = read_event_log(input).context("Failed to read event log")?;
    Ok(log.metric_names())
}
