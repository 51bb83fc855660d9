//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile, SecretKind};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    if let Some(timeout) = cfg.defaults.timeout {
        let _ = writeln!(out, "timeout = {timeout}");
    }

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref url) = p.app_url {
            let _ = writeln!(out, "app_url = \"{url}\"");
        }
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ttl) = p.cache_ttl_secs {
            let _ = writeln!(out, "cache_ttl_secs = {ttl}");
        }
        if let Some(ref qr) = p.qr_endpoint {
            let _ = writeln!(out, "qr_endpoint = \"{qr}\"");
        }
    }

    out
}

/// Copy of the config with secrets masked, for structured output.
fn redacted(cfg: &Config) -> Config {
    let mask = |s: &Option<String>| s.as_ref().map(|_| "****".to_owned());
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            timeout: cfg.defaults.timeout,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                p.api_key = mask(&p.api_key);
                p.token = mask(&p.token);
                (name.clone(), p)
            })
            .collect(),
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: String,
    profile_name: &str,
    kind: SecretKind,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_secret(profile_name, kind, &SecretString::from(secret))?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

/// Prompt for an optional secret; empty input skips it.
fn prompt_optional_secret(
    prompt: &str,
    profile_name: &str,
    kind: SecretKind,
    label: &str,
) -> Result<Option<String>, CliError> {
    let secret = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    if secret.is_empty() {
        return Ok(None);
    }
    prompt_keyring_storage(secret, profile_name, kind, label)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("giftdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API base URL")
                .default("http://localhost:3000/api".into())
                .interact_text()
                .map_err(prompt_err)?;
            api_url.parse::<url::Url>().map_err(|_| CliError::Validation {
                field: "api_url".into(),
                reason: format!("invalid URL: {api_url}"),
            })?;

            let app_url: String = Input::new()
                .with_prompt("Public app URL (for redemption links, empty for API origin)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let api_key = prompt_optional_secret(
                "API key (empty for none): ",
                &profile_name,
                SecretKind::ApiKey,
                "API key",
            )?;
            let token = prompt_optional_secret(
                "Bearer token (empty for none): ",
                &profile_name,
                SecretKind::Token,
                "token",
            )?;

            let profile = Profile {
                api_url,
                app_url: Some(app_url).filter(|u| !u.trim().is_empty()),
                api_key,
                token,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: giftdesk whoami");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile, api_key } => {
            let cfg = config::load_config()?;
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let (kind, prompt) = if api_key {
                (SecretKind::ApiKey, "API key: ")
            } else {
                (SecretKind::Token, "Bearer token: ")
            };
            let secret = rpassword::prompt_password(prompt).map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_secret(&profile_name, kind, &SecretString::from(secret))?;

            eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
