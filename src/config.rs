//! Host run configuration.
//!
//! With the `serde-spec` feature a [`RunConfig`] can be loaded from a YAML or
//! JSON file; command-line flags are layered on top by the binary.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("unsupported config format for {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("config files need the `serde-spec` feature")]
    FeatureDisabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-spec",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RunConfig {
    /// Values queued for the program's input instructions, in order.
    pub inputs: Vec<i64>,
    /// Print final memory after the program halts.
    pub dump_memory: bool,
    /// Prompt on stdin when queued inputs run out.
    pub interactive: bool,
}

impl RunConfig {
    /// Load a configuration file, picking the format from its extension.
    #[cfg(feature = "serde-spec")]
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let parse_error = |message: String| ConfigError::Parse {
            path: display.clone(),
            message,
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))
            }
            Some("json") => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    #[cfg(not(feature = "serde-spec"))]
    pub fn from_path(_path: &Path) -> Result<Self, ConfigError> {
        Err(ConfigError::FeatureDisabled)
    }

    /// Append extra inputs after any already configured.
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = i64>) -> Self {
        self.inputs.extend(inputs);
        self
    }
}
