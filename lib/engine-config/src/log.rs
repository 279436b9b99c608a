use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Where and how much the engine logs. Values coming from `LOG_LEVEL` and
/// `LOG_FORMAT` go through the same deserialization as the config file.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Maximum verbosity, `info` by default. Ignored when `filter` is set.
    #[serde(default)]
    pub level: LogLevel,

    /// `pretty-compact` (default), `pretty-tree` or `json`.
    #[serde(default)]
    pub format: LogFormat,

    /// `EnvFilter` directives, e.g. `query_engine::batcher=trace,warn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// The directive the subscriber's `EnvFilter` is built from.
    pub fn filter_directive(&self) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => Level::from(self.level).as_str().to_lowercase(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    PrettyTree,
    #[default]
    PrettyCompact,
    Json,
}
