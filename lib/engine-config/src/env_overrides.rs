use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides, validated when the config is deserialized
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<String>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<String>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    // Schema overrides
    #[envconfig(from = "SCHEMA_FILE_PATH")]
    pub schema_file_path: Option<String>,

    // Transport overrides
    #[envconfig(from = "GRAPHQL_ENDPOINT")]
    pub graphql_endpoint: Option<String>,
    #[envconfig(from = "GRAPHQL_TOKEN")]
    pub graphql_token: Option<String>,

    // Batching overrides
    #[envconfig(from = "BATCH_INTERVAL")]
    pub batch_interval: Option<String>,
    #[envconfig(from = "SHOULD_BATCH")]
    pub should_batch: Option<bool>,
    #[envconfig(from = "MAX_BATCH_SIZE")]
    pub max_batch_size: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
    #[error("Invalid duration \"{0}\" in BATCH_INTERVAL: {1}")]
    InvalidBatchInterval(String, humantime::DurationError),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {}", log_level);
            config = config.set_override("log.level", log_level.to_lowercase())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {}", log_format);
            config = config.set_override("log.format", log_format.to_lowercase())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }

        if let Some(schema_file_path) = self.schema_file_path.take() {
            debug!("[config-override] 'schema.path' = {}", schema_file_path);
            config = config.set_override("schema.path", schema_file_path)?;
        }

        if let Some(endpoint) = self.graphql_endpoint.take() {
            debug!("[config-override] 'transport.endpoint' = {}", endpoint);
            config = config.set_override("transport.endpoint", endpoint)?;
        }
        if let Some(token) = self.graphql_token.take() {
            // never log the token itself
            debug!("[config-override] 'transport.token' = <redacted>");
            config = config.set_override("transport.token", token)?;
        }

        if let Some(batch_interval) = self.batch_interval.take() {
            if let Err(err) = humantime::parse_duration(&batch_interval) {
                return Err(EnvVarOverridesError::InvalidBatchInterval(
                    batch_interval,
                    err,
                ));
            }
            debug!("[config-override] 'batching.batch_interval' = {}", batch_interval);
            config = config.set_override("batching.batch_interval", batch_interval)?;
        }
        if let Some(should_batch) = self.should_batch.take() {
            debug!("[config-override] 'batching.should_batch' = {}", should_batch);
            config = config.set_override("batching.should_batch", should_batch)?;
        }
        if let Some(max_batch_size) = self.max_batch_size.take() {
            debug!("[config-override] 'batching.max_batch_size' = {}", max_batch_size);
            config = config.set_override("batching.max_batch_size", max_batch_size)?;
        }

        Ok(config)
    }
}
