use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::primitives::file_path::FilePath;

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct SchemaSource {
    /// Path to the compact schema table (JSON).
    /// Relative paths are resolved against the directory of the config file.
    ///
    /// Can also be set via the `SCHEMA_FILE_PATH` environment variable.
    #[serde(default = "default_schema_path")]
    pub path: FilePath,
}

impl Default for SchemaSource {
    fn default() -> Self {
        Self {
            path: default_schema_path(),
        }
    }
}

fn default_schema_path() -> FilePath {
    FilePath {
        relative: "schema.json".to_string(),
        absolute: "schema.json".into(),
    }
}

impl SchemaSource {
    /// Reads the schema file. The default path is still relative and is resolved
    /// against `root_directory`; configured paths are already absolute.
    pub fn load(&self, root_directory: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(root_directory.join(&self.path.absolute)).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to read schema file '{}': {}", self.path, e),
            )
        })
    }
}
