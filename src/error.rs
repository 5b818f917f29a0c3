//! Error types for IdeaFlow
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for IdeaFlow operations
///
/// Covers configuration loading, the analysis pipeline, vault storage,
/// backup import, and the usual IO/serialization conversions.
#[derive(Error, Debug)]
pub enum IdeaflowError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis pipeline errors (API calls, model failures, bad payloads)
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Vault storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Backup file rejected during import
    #[error("Import error: {0}")]
    Import(String),

    /// No idea matches the given id or prefix
    #[error("Idea not found: {0}")]
    NotFound(String),

    /// Missing credentials for the analysis service
    #[error("Missing credentials for pipeline: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for IdeaFlow operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`IdeaflowError`].
pub type Result<T> = anyhow::Result<T>;
