//! Configuration management infrastructure.
//!
//! This module provides configuration file support, so the backend URL,
//! agent URL and download preferences do not have to be repeated on every
//! invocation.

use crate::domain::constants::{
    DEFAULT_AGENT_URL, DEFAULT_API_BASE_URL, DEFAULT_SIGNED_FILE_NAME, DEFAULT_TIMEOUT_SECS,
};
use crate::domain::types::{ApiBaseUrl, DigestAlgorithm};
use crate::infra::error::{SigningError, SigningResult};
use crate::infra::progress::ProgressStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration with all client preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfiguration {
    /// Backend API base URL (endpoints live under `/remote-signing`)
    pub api_base_url: String,

    /// Local signing agent URL
    pub agent_url: String,

    /// Digest algorithm the agent applies before signing
    pub digest_algorithm: String,

    /// Directory the signed document is written to
    pub download_directory: PathBuf,

    /// File name of the signed document
    pub download_file_name: String,

    /// Derive the file name from the source document instead
    pub derive_file_name: bool,

    /// Network timeout settings
    pub network_timeout_seconds: u64,

    /// Whether to verify TLS certificates of the backend and the agent
    pub verify_tls: bool,

    /// Progress indicator preferences (auto, spinner, plain, silent)
    pub progress_style: String,

    /// Whether to show verbose output
    pub verbose: bool,
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            agent_url: DEFAULT_AGENT_URL.to_string(),
            digest_algorithm: DigestAlgorithm::default().as_str().to_string(),
            download_directory: PathBuf::from("."),
            download_file_name: DEFAULT_SIGNED_FILE_NAME.to_string(),
            derive_file_name: false,
            network_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
            progress_style: "auto".to_string(),
            verbose: false,
        }
    }
}

impl ClientConfiguration {
    /// Parsed backend URL.
    pub fn api_base_url(&self) -> SigningResult<ApiBaseUrl> {
        ApiBaseUrl::new(&self.api_base_url)
    }

    /// Parsed agent URL.
    pub fn agent_url(&self) -> SigningResult<ApiBaseUrl> {
        ApiBaseUrl::new(&self.agent_url)
    }

    /// Parsed digest algorithm.
    pub fn digest_algorithm(&self) -> SigningResult<DigestAlgorithm> {
        self.digest_algorithm.parse()
    }

    /// Parsed progress style; `None` means pick automatically.
    pub fn progress_style(&self) -> SigningResult<Option<ProgressStyle>> {
        match self.progress_style.as_str() {
            "auto" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> SigningResult<()> {
        let wrap = |e: SigningError| SigningError::ConfigurationError(e.to_string());

        self.api_base_url().map_err(wrap)?;
        self.agent_url().map_err(wrap)?;
        self.digest_algorithm().map_err(wrap)?;
        self.progress_style().map_err(wrap)?;

        validate_file_name(&self.download_file_name)?;

        if self.network_timeout_seconds == 0 {
            return Err(SigningError::ConfigurationError(
                "Network timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// A download file name must be a bare name, not a path.
fn validate_file_name(name: &str) -> SigningResult<()> {
    if name.trim().is_empty() {
        return Err(SigningError::ConfigurationError(
            "Download file name must not be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(SigningError::ConfigurationError(format!(
            "Download file name must not contain path separators: {name}"
        )));
    }
    Ok(())
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> SigningResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> SigningResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("pdf-remote-signer").join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("pdf-remote-signer-config.toml"))
        }
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load_or_default(&self) -> SigningResult<ClientConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "No configuration file at {}, using defaults",
                self.config_path.display()
            );
            Ok(ClientConfiguration::default())
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> SigningResult<ClientConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = ClientConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> SigningResult<ClientConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: ClientConfiguration = toml::from_str(&content).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &ClientConfiguration) -> SigningResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SigningError::ConfigurationError(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            SigningError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> SigningResult<()> {
        let mut config = self.load_or_default()?;

        match key {
            "api_base_url" => config.api_base_url = value.to_string(),
            "agent_url" => config.agent_url = value.to_string(),
            "digest_algorithm" => {
                // Store the canonical spelling
                let algorithm: DigestAlgorithm = value.parse()?;
                config.digest_algorithm = algorithm.as_str().to_string();
            }
            "download_directory" => config.download_directory = PathBuf::from(value),
            "download_file_name" => config.download_file_name = value.to_string(),
            "derive_file_name" => config.derive_file_name = parse_bool(value)?,
            "network_timeout_seconds" => {
                config.network_timeout_seconds = value.parse().map_err(|_| {
                    SigningError::ConfigurationError(format!("Invalid timeout value: {value}"))
                })?;
            }
            "verify_tls" => config.verify_tls = parse_bool(value)?,
            "progress_style" => config.progress_style = value.to_string(),
            "verbose" => config.verbose = parse_bool(value)?,
            _ => {
                return Err(SigningError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        config.validate()?;
        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> SigningResult<String> {
        let config = self.load_or_default()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("JSON export failed: {e}"))),
            ExportFormat::Yaml => serde_yaml::to_string(&config)
                .map_err(|e| SigningError::ConfigurationError(format!("YAML export failed: {e}"))),
        }
    }

    /// Import configuration from a string
    pub fn import_config(&self, content: &str, format: ExportFormat) -> SigningResult<()> {
        let config: ClientConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("TOML import failed: {e}"))
            })?,
            ExportFormat::Json => serde_json::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("JSON import failed: {e}"))
            })?,
            ExportFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                SigningError::ConfigurationError(format!("YAML import failed: {e}"))
            })?,
        };

        config.validate()?;
        self.save(&config)
    }
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    Toml,
    Json,
    Yaml,
}

fn parse_bool(value: &str) -> SigningResult<bool> {
    value
        .parse()
        .map_err(|_| SigningError::ConfigurationError(format!("Invalid boolean value: {value}")))
}
