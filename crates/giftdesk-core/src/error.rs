// ── Core error types ──
//
// User-facing errors from giftdesk-core. Consumers never match on
// transport errors; the `From<giftdesk_api::Error>` impl translates them
// into the variants below.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

// ── Validation ───────────────────────────────────────────────────────

/// A validation failure scoped to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error collected from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First error recorded for `field`.
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

// ── CoreError ────────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        reason: String,
        payload: serde_json::Value,
    },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    // ── Redemption ───────────────────────────────────────────────────
    #[error("Voucher {code} has already been redeemed")]
    AlreadyRedeemed {
        code: String,
        redeemed_at: Option<DateTime<Utc>>,
    },

    #[error("Voucher {code} expired on {}", .expired_at.format("%Y-%m-%d"))]
    Expired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    #[error("Redemption of {code} failed: {message}")]
    RedemptionFailed { code: String, message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("No response from the server ({message}); try again")]
    Network { message: String, timed_out: bool },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn malformed(reason: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            payload,
        }
    }

    /// Attach the entity kind and identifier to a generic not-found error.
    #[must_use]
    pub fn for_entity(self, entity: &str, identifier: &str) -> Self {
        match self {
            Self::NotFound { .. } => Self::NotFound {
                entity: entity.to_owned(),
                identifier: identifier.to_owned(),
            },
            other => other,
        }
    }

    /// Field errors, when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<giftdesk_api::Error> for CoreError {
    fn from(err: giftdesk_api::Error) -> Self {
        use giftdesk_api::Error as ApiError;

        if err.is_network() {
            return CoreError::Network {
                timed_out: err.is_timeout(),
                message: err.to_string(),
            };
        }
        if err.is_not_found() {
            let identifier = match &err {
                ApiError::Api { message, .. } => message.clone(),
                other => other.to_string(),
            };
            return CoreError::NotFound {
                entity: "resource".into(),
                identifier,
            };
        }

        match err {
            ApiError::Authentication { message } | ApiError::InvalidCredential { message } => {
                CoreError::Authentication { message }
            }
            ApiError::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            ApiError::MalformedResponse { reason, payload } => {
                CoreError::MalformedResponse { reason, payload }
            }
            ApiError::Deserialization { message, body } => CoreError::MalformedResponse {
                reason: message,
                payload: serde_json::from_str(&body)
                    .unwrap_or(serde_json::Value::String(body)),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            ApiError::Tls(message) => CoreError::Config { message },
            ApiError::Transport(e) => CoreError::Api {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
                code: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_becomes_not_found() {
        let err: CoreError = giftdesk_api::Error::Api {
            status: 404,
            message: "Order not found".into(),
            code: None,
        }
        .into();
        let err = err.for_entity("order", "o-1");
        assert!(
            matches!(err, CoreError::NotFound { ref entity, ref identifier } if entity == "order" && identifier == "o-1")
        );
    }

    #[test]
    fn auth_errors_map_to_authentication() {
        let err: CoreError = giftdesk_api::Error::Authentication {
            message: "jwt expired".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Authentication { .. }));
    }

    #[test]
    fn deserialization_keeps_json_payload() {
        let err: CoreError = giftdesk_api::Error::Deserialization {
            message: "missing field `code`".into(),
            body: r#"{"status":"active"}"#.into(),
        }
        .into();
        match err {
            CoreError::MalformedResponse { payload, .. } => {
                assert_eq!(payload, serde_json::json!({"status": "active"}));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validation_errors_display_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push("store", "select a store");
        errors.push("product", "select a product");
        assert_eq!(errors.to_string(), "store: select a store; product: select a product");
        assert_eq!(errors.field("product").map(|e| e.message.as_str()), Some("select a product"));
        assert!(errors.into_result().is_err());
    }
}
