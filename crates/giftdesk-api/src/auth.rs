// Credential access for outgoing requests.
//
// The session itself (login, token refresh, storage) belongs to an
// external auth collaborator. The client only asks it for the current
// bearer token, once per request.

use secrecy::SecretString;

/// Supplies the bearer token attached to each request.
///
/// Injected into [`ApiClient`](crate::ApiClient) and consulted on every
/// call, so a provider backed by a refreshing session always hands out
/// its latest token.
pub trait CredentialProvider: Send + Sync {
    /// Token for the next request, or `None` to send no `Authorization` header.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed bearer token (from config, env, or keyring).
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(****)")
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}

/// No bearer token; requests carry only the API key header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}
