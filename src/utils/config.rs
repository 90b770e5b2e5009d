//! Configuration and constants shared across the crate.

/// Column separator used by the CSV renderer
pub const CSV_SEPARATOR: &str = "\t";

/// Separator between a metric name and a statistic name in CSV headers
pub const METRIC_STATISTIC_SEPARATOR: &str = ":";

/// Name of the single count column in CSV output
pub const COUNT_COLUMN: &str = "Count";

/// Prefix applied to the caller key columns
pub const CALLER_COLUMN_PREFIX: &str = "Caller";

/// Key columns describing one operation (the caller columns reuse them with a prefix)
pub const KEY_COLUMNS: &[&str] = &["Name", "Variant"];

/// Number format used when the caller does not supply one
pub const DEFAULT_NUMBER_FORMAT: &str = "G";

/// Most decimals a `F<n>` / `E<n>` number format may ask for
pub const MAX_PRECISION: usize = 99;

/// Line terminator for text renders
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

// Edge ids: the root is reserved, real edges count up from 1
pub const ROOT_EDGE_ID: i64 = -1;
pub const FIRST_EDGE_ID: i64 = 1;

/// Display names of the two sentinel operation keys
pub const ROOT_OPERATION_NAME: &str = "ROOT";
pub const ALL_OPERATION_NAME: &str = "ALL";

/// Current event log schema version understood by the replay command
pub const EVENT_LOG_VERSION: &str = "1.0.0";
