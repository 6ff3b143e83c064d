//! Shared configuration for the Inventra CLI.
//!
//! TOML profiles plus `INVENTRA_*` environment overlay, translated to
//! `inventra_core::RuntimeConfig`. A profile without a `server` entry
//! runs the data layer offline-only.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use inventra_core::{RemoteConfig, RuntimeConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Read auto-refresh cadence in seconds; 0 disables polling.
    #[serde(default = "default_polling")]
    pub polling_interval: u64,

    /// Connectivity probe cadence in seconds.
    #[serde(default = "default_probe")]
    pub probe_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            polling_interval: default_polling(),
            probe_interval: default_probe(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_polling() -> u64 {
    60
}
fn default_probe() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://inventory.example.com").
    /// Absent means offline-only operation.
    pub server: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Transport retry budget.
    pub retries: Option<u32>,

    /// Override the mirror directory.
    pub data_dir: Option<PathBuf>,

    /// Override polling cadence (seconds; 0 disables).
    pub polling_interval: Option<u64>,

    /// Override probe cadence (seconds).
    pub probe_interval: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "inventra", "inventra").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default mirror directory for a profile: one subdirectory per profile
/// so two servers never share a cache.
pub fn data_path(profile_name: &str) -> PathBuf {
    ProjectDirs::from("com", "inventra", "inventra").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("data");
            p.push(profile_name);
            p
        },
        |dirs| dirs.data_dir().join(profile_name),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("inventra");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("INVENTRA_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile selection / translation ─────────────────────────────────

impl Config {
    /// Select a profile: the explicit name, the configured default, or a
    /// fresh offline profile when nothing is configured.
    pub fn select_profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = name {
            let profile = self
                .profiles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })?;
            return Ok((name.to_owned(), profile.clone()));
        }

        let default_name = self.default_profile.as_deref().unwrap_or("default");
        match self.profiles.get(default_name) {
            Some(profile) => Ok((default_name.to_owned(), profile.clone())),
            // No profiles at all: offline-only with the stock settings.
            None => Ok((default_name.to_owned(), Profile::default())),
        }
    }
}

/// Build a `RuntimeConfig` from a profile plus the global defaults.
pub fn profile_to_runtime_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<RuntimeConfig, ConfigError> {
    let remote = match &profile.server {
        Some(server) => {
            let url: url::Url = server.parse().map_err(|_| ConfigError::Validation {
                field: "server".into(),
                reason: format!("invalid URL: {server}"),
            })?;

            let tls = if profile.insecure.unwrap_or(defaults.insecure) {
                TlsVerification::DangerAcceptInvalid
            } else if let Some(ref ca_path) = profile.ca_cert {
                TlsVerification::CustomCa(ca_path.clone())
            } else {
                TlsVerification::SystemDefaults
            };

            Some(RemoteConfig {
                url,
                tls,
                timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
                retries: profile.retries.unwrap_or(3),
            })
        }
        None => None,
    };

    let data_dir = profile
        .data_dir
        .clone()
        .unwrap_or_else(|| data_path(profile_name));

    let polling = profile
        .polling_interval
        .unwrap_or(defaults.polling_interval);
    let polling_interval = (polling > 0).then(|| Duration::from_secs(polling));

    let probe_interval =
        Duration::from_secs(profile.probe_interval.unwrap_or(defaults.probe_interval));

    Ok(RuntimeConfig {
        remote,
        data_dir,
        probe_interval,
        polling_interval,
        ..RuntimeConfig::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_without_server_is_offline_only() {
        let profile = Profile::default();
        let config =
            profile_to_runtime_config(&profile, "default", &Defaults::default()).unwrap();
        assert!(config.remote.is_none());
    }

    #[test]
    fn server_profile_resolves_remote() {
        let profile = Profile {
            server: Some("https://inventory.example.com".into()),
            timeout: Some(10),
            insecure: Some(true),
            ..Profile::default()
        };
        let config = profile_to_runtime_config(&profile, "prod", &Defaults::default()).unwrap();

        let remote = config.remote.unwrap();
        assert_eq!(remote.url.as_str(), "https://inventory.example.com/");
        assert_eq!(remote.timeout, Duration::from_secs(10));
        assert_eq!(remote.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn invalid_server_url_is_a_validation_error() {
        let profile = Profile {
            server: Some("not a url".into()),
            ..Profile::default()
        };
        let result = profile_to_runtime_config(&profile, "bad", &Defaults::default());
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn zero_polling_disables_the_interval() {
        let profile = Profile {
            polling_interval: Some(0),
            ..Profile::default()
        };
        let config =
            profile_to_runtime_config(&profile, "default", &Defaults::default()).unwrap();
        assert!(config.polling_interval.is_none());
    }

    #[test]
    fn select_profile_falls_back_to_offline_default() {
        let config = Config::default();
        let (name, profile) = config.select_profile(None).unwrap();
        assert_eq!(name, "default");
        assert!(profile.server.is_none());

        let missing = config.select_profile(Some("prod"));
        assert!(matches!(missing, Err(ConfigError::UnknownProfile { .. })));
    }
}
