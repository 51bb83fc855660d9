// giftdesk-api: Async Rust client for the gift-voucher platform REST API

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{Anonymous, CredentialProvider, StaticToken};
pub use client::{ApiClient, ListQuery, Resource};
pub use envelope::{PaginatedList, normalize, normalize_value, pages_for, unwrap_entity};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
