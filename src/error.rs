//! Error types for scoped context stacks.

use crate::context::ContextId;
use thiserror::Error;

/// Conditions raised by the activation protocol.
///
/// Both are local and recoverable: they are returned before any stack or
/// checkpoint structure is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Context is not active: {0}")]
    NotActive(ContextId),

    #[error("No context is active.")]
    NoActiveContext,
}

/// Errors from the ambient surface (configuration, logging, CLI).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown storage backend: {0} (must be 'local', 'thread' or 'task')")]
    InvalidBackend(String),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
