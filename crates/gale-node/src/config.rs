//! Node configuration file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gale_fee::FeeConfig;
use gale_oracle::config::OracleConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "GALE_CONFIG";

/// Configuration file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_FILE: &str = "gale.toml";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Fee engine settings.
    #[serde(default)]
    pub fee: FeeConfig,
    /// Quorum and attestor settings.
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. "info" or "gale_fee=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from `cli_path`, else `$GALE_CONFIG`, else
    /// `gale.toml` in the working directory.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load(cli_path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = Self::config_path(cli_path, std::env::var_os(CONFIG_ENV));
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: NodeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engines would refuse at construction time.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.fee.validate()?;
        self.oracle.quorum()?;
        Ok(())
    }

    fn config_path(cli_path: Option<&Path>, env_path: Option<OsString>) -> PathBuf {
        match (cli_path, env_path) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}
