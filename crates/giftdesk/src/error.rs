//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use giftdesk_config::ConfigError;
use giftdesk_core::{CoreError, ValidationErrors};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend: {message}")]
    #[diagnostic(
        code(giftdesk::connection_failed),
        help(
            "Check your connection and that the API URL is correct, then try again.\n\
             Current profile settings: giftdesk config show"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(giftdesk::timeout),
        help("Try again, or raise the limit with --timeout.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(giftdesk::auth_failed),
        help(
            "Verify your API key or token.\n\
             Run: giftdesk config set-token"
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(giftdesk::not_found),
        help("Run: giftdesk {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Vouchers ─────────────────────────────────────────────────────
    #[error("Voucher {code} was already redeemed{when}")]
    #[diagnostic(
        code(giftdesk::already_redeemed),
        help("A voucher can only be redeemed once. Check it with: giftdesk vouchers status {code}")
    )]
    AlreadyRedeemed { code: String, when: String },

    #[error("Voucher {code} expired on {date}")]
    #[diagnostic(
        code(giftdesk::expired),
        help("Expired vouchers cannot be redeemed.")
    )]
    Expired { code: String, date: String },

    #[error("Redemption of {code} failed: {message}")]
    #[diagnostic(
        code(giftdesk::redemption_failed),
        help("The voucher was re-read from the server. Check it with: giftdesk vouchers status {code}")
    )]
    RedemptionFailed { code: String, message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{status}: {message}")]
    #[diagnostic(code(giftdesk::api_error))]
    ApiError { status: String, message: String },

    #[error("Unexpected response from the backend: {reason}")]
    #[diagnostic(
        code(giftdesk::malformed_response),
        help("Run again with -vv to see the raw exchange.")
    )]
    MalformedResponse { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(giftdesk::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid input: {errors}")]
    #[diagnostic(code(giftdesk::validation))]
    InvalidFields { errors: ValidationErrors },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(giftdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: giftdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(giftdesk::no_config),
        help(
            "Create a profile with: giftdesk config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(giftdesk::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(giftdesk::render))]
    Render(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::AlreadyRedeemed { .. } | Self::Expired { .. } | Self::RedemptionFailed { .. } => {
                exit_code::CONFLICT
            }
            Self::Validation { .. } | Self::InvalidFields { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { message, timed_out } => {
                if timed_out {
                    CliError::Timeout { message }
                } else {
                    CliError::ConnectionFailed { message }
                }
            }

            CoreError::Authentication { message } => CliError::AuthFailed { message },

            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: list_command_for(&entity),
                resource_type: entity,
                identifier,
            },

            CoreError::AlreadyRedeemed { code, redeemed_at } => CliError::AlreadyRedeemed {
                code,
                when: redeemed_at
                    .map(|at| format!(" on {}", at.format("%Y-%m-%d %H:%M UTC")))
                    .unwrap_or_default(),
            },

            CoreError::Expired { code, expired_at } => CliError::Expired {
                code,
                date: expired_at.format("%Y-%m-%d").to_string(),
            },

            CoreError::RedemptionFailed { code, message } => {
                CliError::RedemptionFailed { code, message }
            }

            CoreError::Validation(errors) => CliError::InvalidFields { errors },

            CoreError::Api {
                message, status, ..
            } => CliError::ApiError {
                status: status.map(|s| format!(" ({s})")).unwrap_or_default(),
                message,
            },

            CoreError::MalformedResponse { reason, .. } => CliError::MalformedResponse { reason },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

fn list_command_for(entity: &str) -> String {
    match entity {
        "voucher" | "order" | "customer" | "store" | "product" | "user" => {
            format!("{entity}s list")
        }
        _ => "--help".into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn lifecycle_rejections_exit_with_conflict() {
        let err = CliError::from(CoreError::AlreadyRedeemed {
            code: "AB12CD34".into(),
            redeemed_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
        });
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(
            err.to_string(),
            "Voucher AB12CD34 was already redeemed on 2026-03-01 09:30 UTC"
        );

        let err = CliError::from(CoreError::Expired {
            code: "AB12CD34".into(),
            expired_at: Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(err.to_string(), "Voucher AB12CD34 expired on 2026-01-31");
    }

    #[test]
    fn network_errors_split_on_timeout() {
        let timeout = CliError::from(CoreError::Network {
            message: "deadline".into(),
            timed_out: true,
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let refused = CliError::from(CoreError::Network {
            message: "refused".into(),
            timed_out: false,
        });
        assert_eq!(refused.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity: "order".into(),
            identifier: "o1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "orders list"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn field_errors_are_usage_errors() {
        let err = CliError::from(CoreError::Validation(ValidationErrors::single(
            "store",
            "select a store",
        )));
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(err.to_string().contains("select a store"));
    }
}
