// ── Domain model ──

pub mod catalog;
pub mod entity_id;
pub mod order;
pub mod template;
pub mod voucher;

pub use catalog::{Customer, Product, Store, User, UserRole};
pub use entity_id::EntityId;
pub use order::{Order, OrderStatus, PaymentDetails, PaymentProvider, PaymentStatus};
pub use template::Template;
pub use voucher::{GiftDetails, Voucher, VoucherState};
