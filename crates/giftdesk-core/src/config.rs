// ── Runtime service configuration ──
//
// Describes how to reach the backend and how the client behaves. The
// CLI builds a `ServiceConfig` from its profile; core never reads
// config files.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use giftdesk_api::{Anonymous, CredentialProvider, TransportConfig};

use crate::link::DEFAULT_QR_ENDPOINT;
use crate::store::DEFAULT_TTL;

/// Configuration for one backend.
#[derive(Clone)]
pub struct ServiceConfig {
    /// REST API base URL (e.g. `https://api.example.com/api`).
    pub api_url: Url,
    /// Public app URL that redemption links point at.
    pub app_url: Url,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<SecretString>,
    /// Bearer token source, consulted per request.
    pub credentials: Arc<dyn CredentialProvider>,
    pub transport: TransportConfig,
    /// Staleness window of cached list pages.
    pub cache_ttl: Duration,
    /// QR renderer used when the backend supplies no QR image.
    pub qr_endpoint: String,
}

impl ServiceConfig {
    pub fn new(api_url: Url, app_url: Url) -> Self {
        Self {
            api_url,
            app_url,
            api_key: None,
            credentials: Arc::new(Anonymous),
            transport: TransportConfig::default(),
            cache_ttl: DEFAULT_TTL,
            qr_endpoint: DEFAULT_QR_ENDPOINT.to_owned(),
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_url", &self.api_url.as_str())
            .field("app_url", &self.app_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("transport", &self.transport)
            .field("cache_ttl", &self.cache_ttl)
            .field("qr_endpoint", &self.qr_endpoint)
            .finish_non_exhaustive()
    }
}
