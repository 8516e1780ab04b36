//! Device connection profiles for xeconf.
//!
//! TOML profiles, credential resolution (env + plaintext), and
//! translation to `xeconf_api::DeviceConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use xeconf_api::{DeviceConfig, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

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

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to the default profile.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: "(none)".into(),
            })?;
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.to_owned(),
            })?;
        Ok((name, profile))
    }
}

/// A named device profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Device base URL (e.g., "https://10.255.0.1").
    pub device: String,

    /// Username for basic auth.
    pub username: Option<String>,

    /// Password (plaintext -- prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept any device certificate.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "xeconf", "xeconf").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("xeconf");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit path (tests, `--config` overrides).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("XECONF_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
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

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the device password: `password_env` first, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to the api crate ────────────────────────────────────

/// Build a `DeviceConfig` from a profile.
pub fn profile_to_device_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<DeviceConfig, ConfigError> {
    let base_url: url::Url = profile.device.parse().map_err(|_| ConfigError::Validation {
        field: "device".into(),
        reason: format!("invalid URL: {}", profile.device),
    })?;

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        // Device RESTCONF endpoints ship self-signed certificates.
        TlsMode::DangerAcceptInvalid
    };

    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
    };

    Ok(DeviceConfig {
        base_url,
        username,
        password: password.expose_secret().to_owned(),
        transport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        default_profile = "lab"

        [profiles.lab]
        device = "https://10.255.0.1"
        username = "admin"
        password = "plaintext-pw"
        timeout = 10

        [profiles.prod]
        device = "https://10.0.0.1"
        username = "svc-xeconf"
        password_env = "PROD_DEVICE_PASSWORD"
        ca_cert = "/etc/xeconf/prod-ca.pem"
    "#;

    #[test]
    fn loads_profiles_and_default() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let config =
                load_config_from(std::path::Path::new("config.toml")).expect("load ok");
            assert_eq!(config.default_profile.as_deref(), Some("lab"));

            let (name, profile) = config.profile(None).expect("default profile");
            assert_eq!(name, "lab");
            assert_eq!(profile.device, "https://10.255.0.1");

            let (name, _) = config.profile(Some("prod")).expect("named profile");
            assert_eq!(name, "prod");
            assert!(config.profile(Some("missing")).is_err());
            Ok(())
        });
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("PROD_DEVICE_PASSWORD", "from-env");
            let config =
                load_config_from(std::path::Path::new("config.toml")).expect("load ok");

            let (name, profile) = config.profile(Some("prod")).expect("profile");
            let password = resolve_password(profile, name).expect("resolved");
            assert_eq!(password.expose_secret(), "from-env");

            let (name, profile) = config.profile(Some("lab")).expect("profile");
            let password = resolve_password(profile, name).expect("resolved");
            assert_eq!(password.expose_secret(), "plaintext-pw");
            Ok(())
        });
    }

    #[test]
    fn profile_translates_to_device_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let config =
                load_config_from(std::path::Path::new("config.toml")).expect("load ok");

            let (name, profile) = config.profile(Some("lab")).expect("profile");
            let device = profile_to_device_config(profile, name).expect("translates");
            assert_eq!(device.base_url.as_str(), "https://10.255.0.1/");
            assert_eq!(device.username, "admin");
            assert_eq!(device.password, "plaintext-pw");
            assert_eq!(device.transport.timeout, Duration::from_secs(10));
            Ok(())
        });
    }

    #[test]
    fn missing_credentials_are_an_error() {
        let profile = Profile {
            device: "https://10.0.0.1".into(),
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        };
        assert!(matches!(
            profile_to_device_config(&profile, "empty"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }
}
