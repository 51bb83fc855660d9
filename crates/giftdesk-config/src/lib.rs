//! Shared configuration for giftdesk.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `giftdesk_core::ServiceConfig`. The CLI layers its
//! flag overrides on top of what this crate produces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use giftdesk_api::{StaticToken, TlsMode, TransportConfig};
use giftdesk_core::ServiceConfig;
use giftdesk_core::link::DEFAULT_QR_ENDPOINT;
use giftdesk_core::store::DEFAULT_TTL;

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "giftdesk";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "GIFTDESK_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(String),

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

    /// Named backend profiles.
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

impl Config {
    /// Name of the profile to use: the explicit choice, else the default.
    pub fn profile_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds; unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// REST API base URL (e.g., "https://api.example.com/api").
    pub api_url: String,

    /// Public app URL used in redemption links. Defaults to the API origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,

    /// API key (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Bearer token (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Staleness window for cached lists, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,

    /// QR renderer endpoint for vouchers without a stored QR image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_endpoint: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `GIFTDESK_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "giftdesk", "giftdesk").map_or_else(
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
    p.push("giftdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, overlaid with `GIFTDESK_` variables
/// (`GIFTDESK_DEFAULTS__OUTPUT=json`, `GIFTDESK_PROFILES__PROD__API_URL=...`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GIFTDESK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Which secret of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    ApiKey,
    Token,
}

impl SecretKind {
    fn keyring_user(self, profile_name: &str) -> String {
        match self {
            Self::ApiKey => format!("{profile_name}/api-key"),
            Self::Token => format!("{profile_name}/token"),
        }
    }
}

fn keyring_lookup(user: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, user)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// env var named by the profile -> keyring -> plaintext.
fn resolve_secret(
    env_name: Option<&str>,
    keyring_user: &str,
    plaintext: Option<&str>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if let Some(val) = env_name.and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }
    if let Some(secret) = keyring(keyring_user) {
        return Some(SecretString::from(secret));
    }
    plaintext.map(|s| SecretString::from(s.to_owned()))
}

/// Resolve the profile's API key, if any is configured.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_secret(
        profile.api_key_env.as_deref(),
        &SecretKind::ApiKey.keyring_user(profile_name),
        profile.api_key.as_deref(),
        keyring_lookup,
    )
}

/// Resolve the profile's bearer token, if any is configured.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_secret(
        profile.token_env.as_deref(),
        &SecretKind::Token.keyring_user(profile_name),
        profile.token.as_deref(),
        keyring_lookup,
    )
}

/// Store a secret in the system keyring.
pub fn store_secret(
    profile_name: &str,
    kind: SecretKind,
    secret: &SecretString,
) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name))
        .and_then(|entry| entry.set_password(secret.expose_secret()))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── ServiceConfig translation ───────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Scheme, host and port of `url`, with an empty path.
fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// Build a `ServiceConfig` from a profile, no CLI flag overrides.
pub fn profile_to_service_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ServiceConfig, ConfigError> {
    let api_url = parse_url("api_url", &profile.api_url)?;
    let app_url = match profile.app_url.as_deref() {
        Some(raw) => parse_url("app_url", raw)?,
        None => origin_of(&api_url),
    };

    let mut config = ServiceConfig::new(api_url, app_url);
    config.api_key = resolve_api_key(profile, profile_name);
    if let Some(token) = resolve_token(profile, profile_name) {
        config.credentials = Arc::new(StaticToken::new(token));
    }
    config.transport = TransportConfig {
        tls: profile
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa),
        timeout: profile.timeout.map(Duration::from_secs),
    };
    config.cache_ttl = profile
        .cache_ttl_secs
        .map_or(DEFAULT_TTL, Duration::from_secs);
    config.qr_endpoint = profile
        .qr_endpoint
        .clone()
        .unwrap_or_else(|| DEFAULT_QR_ENDPOINT.to_owned());

    Ok(config)
}
