//! Business logic between `giftdesk-api` and its consumers.
//!
//! - **[`Backoffice`]**: the facade. Lists go through a [`ListCache`] with a
//!   staleness window; vouchers seen anywhere land in the [`VoucherBook`];
//!   successful mutations invalidate the lists they touch.
//!
//! - **Voucher lifecycle** ([`lifecycle`]): `active -> redeemed | expired`,
//!   with [`lifecycle::effective_state`] overriding a stale stored status.
//!   Redemption short-circuits known redeemed/expired vouchers and leaves
//!   the at-most-once guarantee to the backend.
//!
//! - **Order assembly** ([`assembler`]): [`OrderDraft`] tracks store, product
//!   and customer selections, derives the amount from the product price and
//!   validates per field before anything is sent.
//!
//! - **Codes and links** ([`code`], [`link`]): preview codes and the public
//!   redemption URL / QR image for a voucher.
//!
//! - **Domain model** ([`model`]): validated types converted from the wire
//!   types in [`convert`].

pub mod assembler;
pub mod code;
pub mod config;
pub mod convert;
pub mod error;
pub mod lifecycle;
pub mod link;
pub mod model;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use assembler::{CodeReconciliation, OrderDraft, OrderFormData};
pub use config::ServiceConfig;
pub use error::{CoreError, FieldError, ValidationErrors};
pub use link::LinkBuilder;
pub use service::{Backoffice, CreatedOrder};
pub use store::{ListCache, VoucherBook};

pub use giftdesk_api::{ListQuery, PaginatedList, Resource};

pub use model::{
    Customer, EntityId, GiftDetails, Order, OrderStatus, PaymentDetails, PaymentProvider,
    PaymentStatus, Product, Store, Template, User, UserRole, Voucher, VoucherState,
};
