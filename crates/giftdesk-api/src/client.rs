// Async HTTP client for the voucher platform REST API.
//
// Auth: `x-api-key` default header + per-request bearer token from the
// injected credential provider.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::CredentialProvider;
use crate::envelope::{self, PaginatedList};
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{OrderRequest, OrderResponse, UserResponse, VoucherResponse};

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Resources ────────────────────────────────────────────────────────

/// A listable collection on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Customers,
    Stores,
    Products,
    Users,
    Orders,
    Vouchers,
}

impl Resource {
    pub const ALL: [Self; 6] = [
        Self::Customers,
        Self::Stores,
        Self::Products,
        Self::Users,
        Self::Orders,
        Self::Vouchers,
    ];

    /// First path segment of the collection.
    pub fn as_path(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Stores => "stores",
            Self::Products => "products",
            Self::Users => "users",
            Self::Orders => "orders",
            Self::Vouchers => "vouchers",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Page, size, sort and filters of a list request.
///
/// Also the cache key for list results, so filters are kept ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub page: u64,
    pub limit: u64,
    pub sort: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), self.page.to_string()),
            ("limit".to_owned(), self.limit.to_string()),
        ];
        if let Some(sort) = &self.sort {
            params.push(("sort".to_owned(), sort.clone()));
        }
        params.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the voucher platform.
///
/// Every list endpoint goes through [`envelope::normalize`]; single-entity
/// responses are unwrapped from an optional `{"data": {..}}` wrapper.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url`.
    ///
    /// When `api_key` is given it is sent as `x-api-key` on every request.
    pub fn new(
        base_url: &str,
        api_key: Option<&SecretString>,
        credentials: Arc<dyn CredentialProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key.expose_secret()).map_err(|e| {
                Error::InvalidCredential {
                    message: format!("invalid API key header value: {e}"),
                }
            })?;
            value.set_sensitive(true);
            headers.insert("x-api-key", value);
        }

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http, credentials)
    }

    /// Wrap an existing `reqwest::Client` (caller manages default headers).
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_value(&self, segments: &[&str], params: &[(String, String)]) -> Result<Value, Error> {
        let url = self.url(segments);
        debug!("GET {url} params={params:?}");

        let resp = self.authorize(self.http.get(url).query(params)).send().await?;
        self.handle_response(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let value = self.get_value(segments, &[]).await?;
        decode(envelope::unwrap_entity(value))
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body)).send().await?;
        let value = self.handle_response(resp).await?;
        decode(envelope::unwrap_entity(value))
    }

    async fn put_value<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<Value, Error> {
        let url = self.url(segments);
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        let url = self.url(segments);
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url)).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        let code = parsed.as_ref().and_then(|e| e.code.clone());
        let message = parsed
            .and_then(|e| e.message.or(e.error))
            .or_else(|| (!raw.is_empty()).then(|| raw.clone()))
            .unwrap_or_else(|| status.to_string());

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Error::Authentication { message };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            code,
        }
    }

    // ── Lists ────────────────────────────────────────────────────────

    /// Raw list payload, before normalization.
    pub async fn list_raw(&self, resource: Resource, query: &ListQuery) -> Result<Value, Error> {
        self.get_value(&[resource.as_path()], &query.to_params()).await
    }

    /// Fetch one page of `resource`, normalized but not yet decoded.
    pub async fn list_values(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<PaginatedList<Value>, Error> {
        let raw = self.list_raw(resource, query).await?;
        envelope::normalize_value(raw, query.page, query.limit)
    }

    /// Fetch and normalize one page of `resource`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<PaginatedList<T>, Error> {
        let raw = self.list_raw(resource, query).await?;
        envelope::normalize(raw, query.page, query.limit)
    }

    // ── Entities ─────────────────────────────────────────────────────

    pub async fn get_entity<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: &str,
    ) -> Result<T, Error> {
        self.get(&[resource.as_path(), id]).await
    }

    pub async fn delete_entity(&self, resource: Resource, id: &str) -> Result<(), Error> {
        self.delete(&[resource.as_path(), id]).await
    }

    // ── Vouchers ─────────────────────────────────────────────────────

    pub async fn get_voucher_by_code(&self, code: &str) -> Result<VoucherResponse, Error> {
        self.get(&["vouchers", "code", code]).await
    }

    /// `PUT /vouchers/redeem/{code}`.
    ///
    /// Accepts the voucher either as the body, inside `data`, or under a
    /// `voucher` key next to a status message. Returns `None` when the
    /// body carries no voucher at all (e.g. only `{"message": ".."}`).
    pub async fn redeem_voucher(&self, code: &str) -> Result<Option<VoucherResponse>, Error> {
        let value = self
            .put_value(&["vouchers", "redeem", code], &serde_json::json!({}))
            .await?;
        let value = match envelope::unwrap_entity(value) {
            Value::Object(mut map) if matches!(map.get("voucher"), Some(Value::Object(_))) => {
                map.remove("voucher").unwrap_or(Value::Null)
            }
            other => other,
        };
        if value.get("code").is_none() {
            return Ok(None);
        }
        decode(value).map(Some)
    }

    // ── Orders ───────────────────────────────────────────────────────

    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, Error> {
        self.post(&["orders"], order).await
    }

    pub async fn update_order(&self, id: &str, order: &OrderRequest) -> Result<OrderResponse, Error> {
        let value = self.put_value(&["orders", id], order).await?;
        decode(envelope::unwrap_entity(value))
    }

    // ── Session ──────────────────────────────────────────────────────

    /// The user behind the current credentials (`GET /auth/me`).
    pub async fn current_user(&self) -> Result<UserResponse, Error> {
        let value = self.get_value(&["auth", "me"], &[]).await?;
        let value = match envelope::unwrap_entity(value) {
            Value::Object(mut map) if matches!(map.get("user"), Some(Value::Object(_))) => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        decode(value)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::Anonymous;

    fn client(base: &str) -> ApiClient {
        ApiClient::from_reqwest(base, reqwest::Client::new(), Arc::new(Anonymous)).unwrap()
    }

    #[test]
    fn base_url_gets_single_trailing_slash() {
        assert_eq!(client("http://host/api").base_url().as_str(), "http://host/api/");
        assert_eq!(client("http://host/api//").base_url().as_str(), "http://host/api/");
        assert_eq!(client("http://host").base_url().as_str(), "http://host/");
    }

    #[test]
    fn url_segments_are_percent_encoded() {
        let c = client("http://host/api/");
        let url = c.url(&["vouchers", "code", "AB 12/3"]);
        assert_eq!(url.as_str(), "http://host/api/vouchers/code/AB%2012%2F3");
    }

    #[test]
    fn list_query_params_are_stable() {
        let q = ListQuery::new(2, 25)
            .with_sort("-createdAt")
            .with_filter("status", "active")
            .with_filter("storeId", "s1");
        let params = q.to_params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["page", "limit", "sort", "status", "storeId"]);
        assert_eq!(params[1].1, "25");
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = ApiClient::from_reqwest("mailto:ops@example.com", reqwest::Client::new(), Arc::new(Anonymous))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
