//! Inspector settings.
//!
//! Every field has a default, so an empty TOML or JSON document is a valid
//! config.
//!
//! ```toml
//! snapshot_capacity = 300
//! initial_action = "Initial State"
//! default_component_label = "Unknown"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::change_log::{DEFAULT_CAPACITY, INITIAL_ACTION};
use crate::subscribers::DEFAULT_COMPONENT_LABEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Most snapshots kept by the change log, the initial one included.
    pub snapshot_capacity: usize,
    /// Action label of the first snapshot after construction or a clear.
    pub initial_action: String,
    /// Component label used when a subscription or read pass has none.
    pub default_component_label: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: DEFAULT_CAPACITY,
            initial_action: INITIAL_ACTION.to_string(),
            default_component_label: DEFAULT_COMPONENT_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot_capacity must be at least 1")]
    ZeroCapacity,
}

impl InspectorConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.snapshot_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(self)
    }
}
