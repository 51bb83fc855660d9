//! CLI configuration: thin wrapper around `giftdesk_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --app-url, --api-key, --token, --timeout).

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use giftdesk_api::StaticToken;
use giftdesk_core::ServiceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use giftdesk_config::{
    Config, Defaults, Profile, SecretKind, config_path, load_config, load_config_or_default,
    save_config, store_secret,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `ServiceConfig` from the config file, profile, and CLI overrides.
pub fn build_service_config(global: &GlobalOpts) -> Result<ServiceConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        // No profile: build from flags / env vars alone.
        None => Profile {
            api_url: global.api_url.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?,
            timeout: cfg.defaults.timeout,
            ..Profile::default()
        },
    };

    apply_overrides(profile, &profile_name, global, cfg.defaults.timeout)
}

/// Flag values take priority over the profile.
fn apply_overrides(
    mut profile: Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: Option<u64>,
) -> Result<ServiceConfig, CliError> {
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(ref url) = global.app_url {
        profile.app_url = Some(url.clone());
    }
    profile.timeout = global.timeout.or(profile.timeout).or(default_timeout);

    let mut config = giftdesk_config::profile_to_service_config(&profile, profile_name)?;

    if let Some(ref key) = global.api_key {
        config.api_key = Some(SecretString::from(key.clone()));
    }
    if let Some(ref token) = global.token {
        config.credentials = Arc::new(StaticToken::new(SecretString::from(token.clone())));
    }
    tracing::debug!(
        profile = profile_name,
        api_url = %config.api_url,
        timeout = ?config.transport.timeout.map(|t: Duration| t.as_secs()),
        "resolved backend"
    );
    Ok(config)
}
