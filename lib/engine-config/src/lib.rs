pub mod batching;
mod env_overrides;
pub mod log;
pub mod primitives;
pub mod schema;
pub mod transport;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Path, PathBuf};

pub use crate::env_overrides::{EnvVarOverrides, EnvVarOverridesError};

use crate::{
    batching::BatchingConfig, log::LoggingConfig, primitives::file_path::with_start_path,
    schema::SchemaSource, transport::TransportConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(skip)]
    root_directory: PathBuf,

    /// The logger configuration.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Where the compact schema table is loaded from. By default `./schema.json`,
    /// relative to the configuration file.
    #[serde(default)]
    pub schema: SchemaSource,

    /// Configuration of the GraphQL endpoint requests are sent to.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Configuration of the request batcher. Use these to control how many operations
    /// are grouped into a single transport call, and how long the batcher waits for them.
    #[serde(default)]
    pub batching: BatchingConfig,
}

impl EngineConfig {
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to get the current directory: {0}")]
    CurrentDirError(std::io::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "engine.config.yaml",
    "engine.config.yml",
    "engine.config.json",
    "engine.config.json5",
];

fn get_current_dir() -> Result<PathBuf, EngineConfigError> {
    std::env::current_dir().map_err(EngineConfigError::CurrentDirError)
}

/// Loads the configuration from `override_config_path`, or from one of the default
/// file names in the working directory, then applies environment variable overrides.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<EngineConfig, EngineConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    load_config_with_overrides(override_config_path, env_overrides)
}

pub fn load_config_with_overrides(
    override_config_path: Option<String>,
    env_overrides: EnvVarOverrides,
) -> Result<EngineConfig, EngineConfigError> {
    let mut config = Config::builder();
    let mut config_root_path = get_current_dir()?;

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(EngineConfigError::ConfigPathParseError)?;
        if let Some(parent_dir) = path_buf.parent() {
            config_root_path = config_root_path.join(parent_dir);
        }
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    let mut base_cfg = with_start_path(&config_root_path, || {
        config.build()?.try_deserialize::<EngineConfig>()
    })?;

    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}

pub fn parse_yaml_config(config_raw: String) -> Result<EngineConfig, EngineConfigError> {
    let config_root_path = get_current_dir()?;
    let config = Config::builder();

    let mut base_cfg = with_start_path(&config_root_path, || {
        config
            .add_source(File::from_str(&config_raw, FileFormat::Yaml))
            .build()?
            .try_deserialize::<EngineConfig>()
    })?;

    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}
