//! CLI route: run context and command dispatch.

use crate::cli::output::{format_backends_json, format_backends_text};
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, ScopeConfig};
use crate::context::Binding;
use crate::error::ApiError;
use std::path::PathBuf;
use tracing::debug;

/// Runtime context for CLI execution: the effective configuration.
pub struct RunContext {
    config: ScopeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: ScopeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Backends { format } => self.backends(format),
            Commands::Config => serde_json::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    fn backends(&self, format: &str) -> Result<String, ApiError> {
        let configured = self.config.storage.backend;
        // Probe the configured backend with a throwaway scope.
        let binding: Binding = Binding::from_config(&self.config.storage);
        let usable = binding.scope(|_| binding.set_checkpoint_value("probe", true.into()));
        debug!(backend = %configured, usable = usable.is_ok(), "Backend probe");
        usable?;

        match format {
            "text" => Ok(format_backends_text(configured)),
            "json" => format_backends_json(configured),
            other => Err(ApiError::ConfigError(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}
