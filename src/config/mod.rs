//! # Configuration Management Module
//!
//! Centralized configuration for the Runekeep server: type-safe TOML
//! sections with serde defaults, validation on load, and a starter file
//! written by `runekeep init`.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - session capacity, timeouts and background cadence
//! - [`AuctionConfig`] - skill auction duration and expiry-check cadence
//! - [`StorageConfig`] - data directory for the sled store
//! - [`LoggingConfig`] - log level and optional log file
//! - [`SecurityConfig`] - Argon2 password hashing parameters
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! name = "Runekeep"
//! max_sessions = 20
//! session_timeout_minutes = 5
//! keepalive_seconds = 30
//! sweep_seconds = 60
//!
//! [auction]
//! duration_hours = 8
//! finalize_check_seconds = 60
//!
//! [storage]
//! data_dir = "./data"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// Maximum concurrently active sessions. A login for an account that
    /// already holds a session is re-entrant and does not count again.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Sessions idle longer than this are removed by the periodic sweep.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u32,
    /// Keep-alive pulse period for connected push subscribers.
    #[serde(default = "default_keepalive_seconds")]
    pub keepalive_seconds: u64,
    /// Session sweep period.
    #[serde(default = "default_sweep_seconds")]
    pub sweep_seconds: u64,
}

fn default_max_sessions() -> usize {
    20
}

fn default_session_timeout() -> u32 {
    5
}

fn default_keepalive_seconds() -> u64 {
    30
}

fn default_sweep_seconds() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// How long an auction stays open once started.
    #[serde(default = "default_auction_hours")]
    pub duration_hours: u64,
    /// How often the expiry check runs.
    #[serde(default = "default_finalize_check")]
    pub finalize_check_seconds: u64,
}

fn default_auction_hours() -> u64 {
    8
}

fn default_finalize_check() -> u64 {
    60
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            duration_hours: default_auction_hours(),
            finalize_check_seconds: default_finalize_check(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Argon2Config {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub time_cost: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub argon2: Option<Argon2Config>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub auction: AuctionConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.server.max_sessions == 0 {
            return Err(anyhow!("server.max_sessions must be at least 1"));
        }
        if self.server.session_timeout_minutes == 0 {
            return Err(anyhow!("server.session_timeout_minutes must be at least 1"));
        }
        if self.server.sweep_seconds == 0 || self.server.keepalive_seconds == 0 {
            return Err(anyhow!("server sweep/keepalive periods must be at least 1s"));
        }
        if self.auction.duration_hours == 0 {
            return Err(anyhow!("auction.duration_hours must be at least 1"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "Runekeep".to_string(),
                max_sessions: default_max_sessions(),
                session_timeout_minutes: default_session_timeout(),
                keepalive_seconds: default_keepalive_seconds(),
                sweep_seconds: default_sweep_seconds(),
            },
            auction: AuctionConfig::default(),
            storage: StorageConfig {
                data_dir: "./data".to_string(),
            },
            logging: LoggingConfig::default(),
            security: Some(SecurityConfig::default()),
        }
    }
}
