use crate::utils::config::DEFAULT_NUMBER_FORMAT;
use std::path::PathBuf;

/// Arguments for the replay command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Event log to replay
    pub input: PathBuf,

    /// Output path for the CSV report (None = stdout)
    pub output_csv: Option<PathBuf>,

    /// Number format for CSV values (G, F<n>, E<n>)
    pub number_format: String,

    /// Deepest allowed call nesting
    pub max_depth: Option<usize>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("events.json"),
            output_csv: None,
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            max_depth: None,
            print_summary: false,
        }
    }
}
