//! Recorder configuration.

/// Settings for a [`GraphRecorder`](super::GraphRecorder)
///
/// **Public** - passed to `RecorderBuilder::with_config`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Deepest allowed call nesting; `None` means unlimited
    pub max_depth: Option<usize>,
}

impl RecorderConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how deep calls may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}
