use async_trait::async_trait;
use query_engine_config::transport::TransportConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::transport::{Transport, TransportBody, TransportError};

/// POSTs GraphQL bodies as JSON to a single endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(HttpTransport {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint, operations = body.len()))]
    async fn send(&self, body: TransportBody) -> Result<Value, TransportError> {
        let payload =
            serde_json::to_vec(&body).map_err(|e| TransportError::Serialize(e.to_string()))?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => {
                if !status.is_success() {
                    // GraphQL servers report validation errors with 4xx and a regular body
                    debug!(status = status.as_u16(), "non-success status with a JSON body");
                }
                Ok(value)
            }
            Err(e) if status.is_success() => Err(TransportError::Decode(e.to_string())),
            Err(_) => Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
        }
    }
}
