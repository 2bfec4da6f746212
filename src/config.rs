//! Configuration System
//!
//! Layered configuration built with the `config` crate. Sources in increasing
//! precedence: built-in defaults, the global file, workspace files, then
//! `SCOPESTACK__*` environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::storage::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::ENV_VAR;
pub use sources::ENV_PREFIX;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend used by `Binding::from_config`
    #[serde(default)]
    pub backend: BackendKind,
}

impl ScopeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        self.logging.validate()
    }
}

/// Loads [`ScopeConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace root.
    pub fn load(workspace_root: &Path) -> Result<ScopeConfig, ApiError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::add_environment(builder);

        let config: ScopeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<ScopeConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()).required(true));
        let builder = sources::add_environment(builder);

        let config: ScopeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Path to the global configuration file.
    pub fn global_config_path() -> Option<PathBuf> {
        global_config_path()
    }
}
