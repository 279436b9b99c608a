use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BatchingConfig {
    /// How long the first request of an empty queue waits for others to join it
    /// before the whole queue is sent.
    ///
    /// Can also be set via the `BATCH_INTERVAL` environment variable.
    #[serde(
        default = "default_batch_interval",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub batch_interval: Duration,

    /// Enables/disables batching. When disabled, every request is sent on its own,
    /// without waiting for `batch_interval`.
    ///
    /// Can also be set via the `SHOULD_BATCH` environment variable.
    #[serde(default = "default_should_batch")]
    pub should_batch: bool,

    /// Maximum number of operations sent in a single transport call.
    /// Larger queues are split into consecutive slices. `0` means unbounded.
    ///
    /// Can also be set via the `MAX_BATCH_SIZE` environment variable.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            batch_interval: default_batch_interval(),
            should_batch: default_should_batch(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl BatchingConfig {
    /// Same limits, but dispatches immediately.
    pub fn unbatched(&self) -> Self {
        Self {
            should_batch: false,
            ..self.clone()
        }
    }
}

fn default_batch_interval() -> Duration {
    Duration::from_millis(10)
}

fn default_should_batch() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    0
}
