//! Configuration module
//!
//! This module handles configuration loading from TOML files and
//! environment variables, and converts it into the runtime settings of the
//! connection provider and transaction submission.

use crate::connection::ProviderSettings;
use crate::endpoints::{self, Network};
use crate::tx_submit::{ConfirmOptions, SubmitOptions};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "DEX_CONFIG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown commitment level: {0}")]
    UnknownCommitment(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub submit: SubmitConfig,

    #[serde(default)]
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network used when nothing is persisted; `DEX_NETWORK` takes precedence
    #[serde(default)]
    pub default_network: Option<Network>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled settings database
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Preflight commitment and the level awaited on confirmation
    #[serde(default = "default_submit_commitment")]
    pub commitment: String,

    #[serde(default = "default_true")]
    pub skip_preflight: bool,

    /// Signature status polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up waiting for confirmation after this many seconds
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Commitment the shared connection handles are created with
    #[serde(default = "default_connection_commitment")]
    pub commitment: String,
}

// Default value functions
fn default_storage_path() -> String { "dex-connection.db".to_string() }
fn default_submit_commitment() -> String { "confirmed".to_string() }
fn default_connection_commitment() -> String { "processed".to_string() }
fn default_poll_interval_ms() -> u64 { 500 }
fn default_confirm_timeout_secs() -> u64 { 60 }
fn default_true() -> bool { true }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            commitment: default_submit_commitment(),
            skip_preflight: default_true(),
            poll_interval_ms: default_poll_interval_ms(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            commitment: default_connection_commitment(),
        }
    }
}

/// Parse a commitment level name (`processed`, `confirmed`, `finalized`)
pub fn parse_commitment(value: &str) -> Result<CommitmentLevel, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentLevel::Processed),
        "confirmed" => Ok(CommitmentLevel::Confirmed),
        "finalized" => Ok(CommitmentLevel::Finalized),
        other => Err(ConfigError::UnknownCommitment(other.to_string())),
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` into the environment
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_commitment(&self.submit.commitment)?;
        parse_commitment(&self.connection.commitment)?;

        if self.submit.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "submit.poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.submit.confirm_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "submit.confirm_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.storage.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage.path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `DEX_NETWORK` first, then the file, then mainnet-beta
    pub fn default_network(&self) -> Network {
        endpoints::network_from_env()
            .or(self.network.default_network)
            .unwrap_or(endpoints::ENDPOINTS[0].name)
    }

    pub fn provider_settings(&self) -> Result<ProviderSettings, ConfigError> {
        Ok(ProviderSettings {
            default_network: self.default_network(),
            commitment: CommitmentConfig {
                commitment: parse_commitment(&self.connection.commitment)?,
            },
        })
    }

    pub fn submit_options(&self) -> Result<SubmitOptions, ConfigError> {
        Ok(SubmitOptions {
            commitment: parse_commitment(&self.submit.commitment)?,
            skip_preflight: self.submit.skip_preflight,
            confirm: ConfirmOptions {
                poll_interval: Duration::from_millis(self.submit.poll_interval_ms),
                timeout: Duration::from_secs(self.submit.confirm_timeout_secs),
            },
        })
    }
}
