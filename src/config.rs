//! Application configuration management.
//!
//! Settings are merged in layers with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Platform config file (`config.toml` in the project config directory)
//! 3. An explicit `--config` file
//! 4. `TINKER_*` environment variables (`__` separates nested keys, e.g.
//!    `TINKER_FUNDING__ENABLED=false`)
//!
//! CLI flags are applied on top by the caller.

use anyhow::{bail, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::environment::EnvironmentType;
use crate::session::FundingSettings;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TINKER_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the credential files.
    pub credential_dir: PathBuf,
    /// Environment variable that holds the production API key.
    pub api_key_env: String,
    /// Device description for production identities; defaults to the host name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_label: Option<String>,
    /// Device description for disposable sandbox identities.
    pub device_description: String,
    /// Source addresses new identities are allowed to be used from.
    pub permitted_ips: Vec<String>,
    /// Sandbox API base URL.
    pub sandbox_url: String,
    /// Production API base URL.
    pub production_url: String,
    /// Stored sessions expiring within this many seconds are renewed.
    pub refresh_margin_secs: u64,
    /// Timeout for each HTTP request, in seconds.
    pub http_timeout_secs: u64,
    /// Sandbox funding assist.
    pub funding: FundingSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential_dir: PathBuf::from("."),
            api_key_env: "TINKER_API_KEY".to_string(),
            host_label: None,
            device_description: "tinker rust".to_string(),
            permitted_ips: vec![crate::identity::PERMIT_ANY_IP.to_string()],
            sandbox_url: "https://public-api.sandbox.bunq.com/v1".to_string(),
            production_url: "https://api.bunq.com/v1".to_string(),
            refresh_margin_secs: 30,
            http_timeout_secs: 30,
            funding: FundingSettings::default(),
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` does not exist or any layer holds
    /// values of the wrong type.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
        }

        let config: Config = Self::figment(Self::default_path().as_deref(), explicit).extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Build the figment stack without extracting it.
    pub fn figment(platform: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = platform {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "tinker", "tinker").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// API base URL for an environment.
    #[must_use]
    pub fn base_url(&self, environment: EnvironmentType) -> &str {
        match environment {
            EnvironmentType::Sandbox => &self.sandbox_url,
            EnvironmentType::Production => &self.production_url,
        }
    }

    /// Device description for production identities.
    #[must_use]
    pub fn resolve_host_label(&self) -> String {
        self.host_label
            .clone()
            .filter(|label| !label.trim().is_empty())
            .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
            .or_else(|| std::env::var("COMPUTERNAME").ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| "tinker".to_string())
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
