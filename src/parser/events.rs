//! Event log parser.
//!
//! An event log is a recorded stream of operation start/end events. Each
//! event may carry metric values; end events carry the values measured for
//! that invocation.
//!
//! Two layouts are accepted:
//! - an object `{ "version": "1.0.0", "events": [...] }`
//! - a bare array of events

use crate::callgraph::{TracedOperation, Variant};
use crate::utils::config::EVENT_LOG_VERSION;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Metric values attached to one event
pub type EventValues = BTreeMap<String, f64>;

/// Start or end of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    End,
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub kind: EventKind,

    /// Fully qualified operation name
    #[serde(alias = "name")]
    pub operation: String,

    #[serde(default)]
    pub variant: Variant,

    /// Metric values measured for this invocation
    #[serde(default)]
    pub values: EventValues,
}

impl TracedOperation for TraceEvent {
    fn full_name(&self) -> &str {
        &self.operation
    }

    fn variant(&self) -> Variant {
        self.variant
    }
}

/// A parsed event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(default = "default_version")]
    pub version: String,

    pub events: Vec<TraceEvent>,
}

fn default_version() -> String {
    EVENT_LOG_VERSION.to_string()
}

impl EventLog {
    /// Every metric name carried by an end event, sorted
    pub fn metric_names(&self) -> Vec<String> {
        self.events
            .iter()
            .filter(|event| event.kind == EventKind::End)
            .flat_map(|event| event.values.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of start events
    pub fn invocation_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.kind == EventKind::Start)
            .count()
    }
}

/// Parse an event log from a JSON value
///
/// **Public** - main entry point for parsing
///
/// # Errors
/// * `ParseError::JsonError` - Events do not match the schema
/// * `ParseError::InvalidFormat` - Top level is neither an object nor an array
pub fn parse_event_log(raw: &serde_json::Value) -> Result<EventLog, ParseError> {
    let log = match raw {
        serde_json::Value::Object(_) => EventLog::deserialize(raw)?,

        serde_json::Value::Array(_) => {
            debug!("Event log is a bare array, wrapping");
            EventLog {
                version: default_version(),
                events: Vec::<TraceEvent>::deserialize(raw)?,
            }
        }

        _ => {
            return Err(ParseError::InvalidFormat(
                "Event log must be a JSON object or array".to_string(),
            ))
        }
    };

    if log.version != EVENT_LOG_VERSION {
        warn!(
            "Event log version {} differs from supported version {}",
            log.version, EVENT_LOG_VERSION
        );
    }

    validate_event_log(&log)?;
    debug!("Parsed {} events", log.events.len());
    Ok(log)
}

/// Read and parse an event log file
pub fn read_event_log(path: impl AsRef<Path>) -> Result<EventLog, ParseError> {
    let path = path.as_ref();
    debug!("Reading event log from: {}", path.display());

    let contents = std::fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&contents)?;
    parse_event_log(&raw)
}

/// Structural checks that do not need a recorder: names are present and
/// no end event arrives before any start
///
/// **Public** - useful before replaying
pub fn validate_event_log(log: &EventLog) -> Result<(), ParseError> {
    let mut open: usize = 0;
    for (index, event) in log.events.iter().enumerate() {
        if event.operation.trim().is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Event {} has an empty operation name",
                index
            )));
        }
        match event.kind {
            EventKind::Start => open += 1,
            EventKind::End => {
                open = open.checked_sub(1).ok_or_else(|| {
                    ParseError::InvalidFormat(format!(
                        "Event {} ends {} with no open operation",
                        index, event.operation
                    ))
                })?;
            }
        }
    }

    if open != 0 {
        return Err(ParseError::InvalidFormat(format!(
            "{} operations were never ended",
            open
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_object_format() {
        let raw = json!({
            "version": "1.0.0",
            "events": [
                {"kind": "start", "operation": "Ops.H"},
                {"kind": "end", "operation": "Ops.H", "values": {"Depth": 1.0}}
            ]
        });

        let log = parse_event_log(&raw).unwrap();
        assert_eq!(log.events.len(), 2);
        assert_eq!(log.events[0].variant, Variant::Body);
        assert_eq!(log.metric_names(), vec!["Depth".to_string()]);
    }

    #[test]
    fn test_parse_array_format() {
        let raw = json!([
            {"kind": "start", "name": "Ops.T", "variant": "Adjoint"},
            {"kind": "end", "name": "Ops.T", "variant": "Adjoint"}
        ]);

        let log = parse_event_log(&raw).unwrap();
        assert_eq!(log.version, EVENT_LOG_VERSION);
        assert_eq!(log.events[1].variant, Variant::Adjoint);
        assert_eq!(log.invocation_count(), 1);
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(matches!(
            parse_event_log(&json!(42)),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_validate_unbalanced() {
        let raw = json!([{"kind": "end", "operation": "A"}]);
        assert!(parse_event_log(&raw).is_err());

        let raw = json!([{"kind": "start", "operation": "A"}]);
        assert!(parse_event_log(&raw).is_err());
    }
}
