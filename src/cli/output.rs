//! CLI output: error mapping and listing formatters.

use crate::error::ApiError;
use crate::storage::BackendKind;
use serde_json::json;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    e.to_string()
}

pub fn format_backends_text(configured: BackendKind) -> String {
    BackendKind::ALL
        .iter()
        .map(|kind| {
            let marker = if *kind == configured { "*" } else { " " };
            format!("{} {:<6}  {}", marker, kind.as_str(), kind.describe())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_backends_json(configured: BackendKind) -> Result<String, ApiError> {
    let backends: Vec<_> = BackendKind::ALL
        .iter()
        .map(|kind| {
            json!({
                "name": kind.as_str(),
                "description": kind.describe(),
                "default": *kind == configured,
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "backends": backends }))
        .map_err(|e| ApiError::ConfigError(format!("Failed to render backends: {}", e)))
}
