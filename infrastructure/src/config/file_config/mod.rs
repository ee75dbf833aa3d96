//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the frozen
//! application configuration after validation.

mod consultation;
mod gateway;
mod lifecycle;

pub use consultation::FileConsultationConfig;
pub use gateway::{FileGatewayConfig, FileJournalConfig};
pub use lifecycle::{FileCollectiveConfig, FileLifecycleConfig, FileLifecycleOverride};

use agora_domain::RoleRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("{0} cannot be 0")]
    InvalidDuration(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unknown lifecycle state in configuration: {0}")]
    UnknownState(String),

    #[error("Unknown role in configuration: {0}")]
    UnknownRole(String),
}

/// Complete TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub lifecycle: FileLifecycleConfig,
    pub collective: FileCollectiveConfig,
    pub consultation: FileConsultationConfig,
    pub gateway: FileGatewayConfig,
    pub journal: FileJournalConfig,
}

impl FileConfig {
    /// Validate everything that conversion would reject, plus role names
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lifecycle.to_lifecycle_config()?;
        self.consultation.to_params()?;

        if self.gateway.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "gateway.endpoint cannot be empty".to_string(),
            ));
        }

        let registry = RoleRegistry::builtin();
        registry
            .pick(&self.consultation.roles)
            .map_err(|e| ConfigError::UnknownRole(e.to_string()))?;

        Ok(())
    }
}
