use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// The GraphQL endpoint requests are POSTed to.
    ///
    /// Can also be set via the `GRAPHQL_ENDPOINT` environment variable.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token sent in the `Authorization` header. Requests are sent
    /// anonymously when absent.
    ///
    /// Can also be set via the `GRAPHQL_TOKEN` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Timeout applied to each transport call.
    #[serde(
        default = "default_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            timeout: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
