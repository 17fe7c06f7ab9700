//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`,
    /// or any `EnvFilter` directive.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"`, `"pretty"`, or `"compact"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
