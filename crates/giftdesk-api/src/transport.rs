// Shared transport configuration for building reqwest::Client instances.
//
// Timeouts are opt-in: with `timeout: None` a request waits for the
// backend indefinitely and callers layer their own cancellation on top.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

const USER_AGENT: &str = concat!("giftdesk/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the bundled webpki root store.
    #[default]
    System,
    /// Additionally trust a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by [`ApiClient`](crate::ApiClient) to inject the `x-api-key` header.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path)
                .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_timeout() {
        let cfg = TransportConfig::default();
        assert!(cfg.timeout.is_none());
        assert_eq!(cfg.tls, TlsMode::System);
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let cfg = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/giftdesk-ca.pem")),
            timeout: Some(Duration::from_secs(5)),
        };
        let err = cfg.build_client().unwrap_err();
        assert!(matches!(err, Error::Tls(ref msg) if msg.contains("failed to read CA cert")));
    }
}
