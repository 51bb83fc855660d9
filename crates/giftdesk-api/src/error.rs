use thiserror::Error;

/// Top-level error type for the `giftdesk-api` crate.
///
/// Covers every transport-level failure mode: authentication, HTTP
/// transport, structured API errors and response decoding.
/// `giftdesk-core` maps these into the user-facing error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend rejected the bearer token or API key (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The credential provider could not produce a usable header value.
    #[error("Invalid credential: {message}")]
    InvalidCredential { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status with the backend's message, if any.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A list payload matched none of the known envelope shapes.
    #[error("Malformed list response: {reason}")]
    MalformedResponse {
        reason: String,
        payload: serde_json::Value,
    },
}

impl Error {
    /// HTTP status attached to this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` when no response was received at all.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_is_not_found() {
        let err = Error::Api {
            status: 404,
            message: "Voucher not found".into(),
            code: None,
        };
        assert!(err.is_not_found());
        assert!(!err.is_network());
    }

    #[test]
    fn malformed_has_no_status() {
        let err = Error::MalformedResponse {
            reason: "no array".into(),
            payload: serde_json::json!({"ok": true}),
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("no array"));
    }

    #[test]
    fn api_error_code_is_exposed() {
        let err = Error::Api {
            status: 409,
            message: "already redeemed".into(),
            code: Some("VOUCHER_REDEEMED".into()),
        };
        assert_eq!(err.api_error_code(), Some("VOUCHER_REDEEMED"));
    }
}
