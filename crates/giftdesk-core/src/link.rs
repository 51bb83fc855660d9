// ── Redemption links ──
//
// The public redemption URL and the QR image that encodes it. The QR
// always encodes the full link, never the bare code.

use url::form_urlencoded;

/// Third-party QR renderer used when the backend supplies no image.
pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/?size=200x200";

/// `{base_url}/vouchers/redeem/{code}`, without doubling a trailing slash.
pub fn build_link(code: &str, base_url: &str) -> String {
    format!("{}/vouchers/redeem/{code}", base_url.trim_end_matches('/'))
}

/// QR image reference for `code` using [`DEFAULT_QR_ENDPOINT`].
///
/// An explicit backend URL is returned unchanged.
pub fn build_qr_source(code: &str, base_url: &str, explicit_qr_url: Option<&str>) -> String {
    qr_source(DEFAULT_QR_ENDPOINT, code, base_url, explicit_qr_url)
}

fn qr_source(endpoint: &str, code: &str, base_url: &str, explicit: Option<&str>) -> String {
    if let Some(url) = explicit.filter(|u| !u.trim().is_empty()) {
        return url.to_owned();
    }
    let data: String = form_urlencoded::byte_serialize(build_link(code, base_url).as_bytes()).collect();
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}data={data}")
}

/// Link and QR builder bound to one app URL and QR endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    app_url: String,
    qr_endpoint: String,
}

impl LinkBuilder {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
            qr_endpoint: DEFAULT_QR_ENDPOINT.to_owned(),
        }
    }

    #[must_use]
    pub fn with_qr_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.qr_endpoint = endpoint.into();
        self
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    pub fn link(&self, code: &str) -> String {
        build_link(code, &self.app_url)
    }

    pub fn qr_source(&self, code: &str, explicit_qr_url: Option<&str>) -> String {
        qr_source(&self.qr_endpoint, code, &self.app_url, explicit_qr_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_does_not_double_slashes() {
        assert_eq!(
            build_link("AB12CD34", "https://gifts.example.com/"),
            "https://gifts.example.com/vouchers/redeem/AB12CD34"
        );
        assert_eq!(
            build_link("AB12CD34", "https://gifts.example.com"),
            "https://gifts.example.com/vouchers/redeem/AB12CD34"
        );
    }

    #[test]
    fn qr_encodes_the_full_link() {
        let qr = build_qr_source("AB12CD34", "https://gifts.example.com", None);
        assert_eq!(
            qr,
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200\
             &data=https%3A%2F%2Fgifts.example.com%2Fvouchers%2Fredeem%2FAB12CD34"
        );
        assert_eq!(qr, build_qr_source("AB12CD34", "https://gifts.example.com", None));
    }

    #[test]
    fn explicit_qr_is_returned_unchanged() {
        let explicit = "https://cdn.example.com/qr/AB12CD34.png";
        assert_eq!(build_qr_source("AB12CD34", "https://x", Some(explicit)), explicit);
        assert_ne!(build_qr_source("AB12CD34", "https://x", Some("  ")), "  ");
    }

    #[test]
    fn custom_endpoint_without_query() {
        let links = LinkBuilder::new("https://gifts.example.com").with_qr_endpoint("https://qr.local/render");
        assert_eq!(
            links.qr_source("Z9", None),
            "https://qr.local/render?data=https%3A%2F%2Fgifts.example.com%2Fvouchers%2Fredeem%2FZ9"
        );
        assert_eq!(links.link("Z9"), "https://gifts.example.com/vouchers/redeem/Z9");
    }
}
