//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Options shared by every request an executor sends.
///
/// Missing fields deserialize to their defaults, so the struct can be
/// embedded in a larger JSON or TOML config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Emit `debug!` events with method, URL, status and error-stream text.
    pub enable_debug_logging: bool,

    /// Headers sent with every request, lowest precedence.
    pub default_headers: Vec<(String, String)>,
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.enable_debug_logging = enabled;
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}
