//! Configuration management for IdeaFlow
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{IdeaflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for IdeaFlow
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Analysis service settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Local vault settings
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Analysis pipeline configuration
///
/// Points at a Gemini-compatible `generateContent` endpoint. The API key is
/// usually supplied through `GEMINI_API_KEY` rather than the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the API (overridable for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key; falls back to `GEMINI_API_KEY` then `API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model tried first for analysis and deep dives
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Model used when the primary model fails
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Model used to render the illustration
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Model used by refine
    #[serde(default = "default_refine_model")]
    pub refine_model: String,

    /// HTTP timeout per request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Generate an illustration for new ideas
    #[serde(default = "default_generate_images")]
    pub generate_images: bool,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_primary_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_fallback_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_refine_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_generate_images() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            primary_model: default_primary_model(),
            fallback_model: default_fallback_model(),
            image_model: default_image_model(),
            refine_model: default_refine_model(),
            timeout_seconds: default_timeout(),
            generate_images: default_generate_images(),
        }
    }
}

impl PipelineConfig {
    /// API key from config or environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Vault location and backup settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VaultConfig {
    /// Database file; the platform data directory is used when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Directory that receives backup files (current directory when unset)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IdeaflowError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| IdeaflowError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("IDEAFLOW_API_BASE") {
            self.pipeline.api_base = api_base;
        }

        if let Ok(model) = std::env::var("IDEAFLOW_PRIMARY_MODEL") {
            self.pipeline.primary_model = model;
        }

        if let Ok(model) = std::env::var("IDEAFLOW_FALLBACK_MODEL") {
            self.pipeline.fallback_model = model;
        }

        if let Ok(timeout) = std::env::var("IDEAFLOW_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.pipeline.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid IDEAFLOW_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(generate) = std::env::var("IDEAFLOW_GENERATE_IMAGES") {
            match generate.parse::<bool>() {
                Ok(v) => {
                    self.pipeline.generate_images = v;
                    tracing::debug!(generate_images = v, "Env override: IDEAFLOW_GENERATE_IMAGES");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for IDEAFLOW_GENERATE_IMAGES: {}", generate);
                }
            }
        }

        if let Ok(db_path) = std::env::var(crate::storage::VAULT_DB_ENV) {
            tracing::debug!(db_path = %db_path, "Env override: IDEAFLOW_VAULT_DB");
            self.vault.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(export_dir) = std::env::var("IDEAFLOW_EXPORT_DIR") {
            self.vault.export_dir = Some(PathBuf::from(export_dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(db_path) = &cli.vault_db {
            self.vault.db_path = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.pipeline.api_base).map_err(|e| {
            IdeaflowError::Config(format!(
                "Invalid pipeline.api_base '{}': {}",
                self.pipeline.api_base, e
            ))
        })?;

        for (name, value) in [
            ("pipeline.primary_model", &self.pipeline.primary_model),
            ("pipeline.fallback_model", &self.pipeline.fallback_model),
            ("pipeline.image_model", &self.pipeline.image_model),
            ("pipeline.refine_model", &self.pipeline.refine_model),
        ] {
            if value.trim().is_empty() {
                return Err(IdeaflowError::Config(format!("{} cannot be empty", name)).into());
            }
        }

        if self.pipeline.timeout_seconds == 0 {
            return Err(IdeaflowError::Config(
                "pipeline.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pipeline.primary_model, "gemini-3-flash-preview");
        assert_eq!(config.pipeline.fallback_model, "gemini-2.5-flash");
        assert_eq!(config.pipeline.timeout_seconds, 120);
        assert!(config.pipeline.generate_images);
        assert!(config.vault.db_path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = Config::default();
        config.pipeline.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.pipeline.fallback_model = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipeline.fallback_model"));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.pipeline.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "pipeline:\n  primary_model: custom-model\nvault:\n  export_dir: /tmp/backups\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pipeline.primary_model, "custom-model");
        assert_eq!(config.pipeline.fallback_model, "gemini-2.5-flash");
        assert_eq!(
            config.vault.export_dir,
            Some(PathBuf::from("/tmp/backups"))
        );
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let cli = Cli::default();
        let config = Config::load("/definitely/not/here.yaml", &cli).unwrap();
        assert_eq!(config.pipeline.refine_model, "gemini-2.0-flash");
    }

    #[test]
    #[serial]
    fn test_load_reads_file_and_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pipeline:\n  timeout_seconds: 15\n").unwrap();

        let mut cli = Cli::default();
        cli.vault_db = Some(dir.path().join("cli.db"));

        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.pipeline.timeout_seconds, 15);
        assert_eq!(config.vault.db_path, Some(dir.path().join("cli.db")));
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pipeline: [unclosed").unwrap();

        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_apply() {
        std::env::set_var("IDEAFLOW_GENERATE_IMAGES", "false");
        std::env::set_var("IDEAFLOW_TIMEOUT_SECONDS", "42");

        let config = Config::load("/definitely/not/here.yaml", &Cli::default()).unwrap();
        assert!(!config.pipeline.generate_images);
        assert_eq!(config.pipeline.timeout_seconds, 42);

        std::env::remove_var("IDEAFLOW_GENERATE_IMAGES");
        std::env::remove_var("IDEAFLOW_TIMEOUT_SECONDS");
    }

    #[test]
    #[serial]
    fn test_resolve_api_key_prefers_config() {
        std::env::set_var("GEMINI_API_KEY", "from-env");
        let mut pipeline = PipelineConfig::default();
        assert_eq!(pipeline.resolve_api_key(), Some("from-env".to_string()));

        pipeline.api_key = Some("from-config".to_string());
        assert_eq!(pipeline.resolve_api_key(), Some("from-config".to_string()));
        std::env::remove_var("GEMINI_API_KEY");
    }
}
