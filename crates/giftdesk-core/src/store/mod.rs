// ── Client-side state ──

mod book;
mod cache;

pub use book::{DEFAULT_BOOK_CAPACITY, VoucherBook};
pub use cache::{DEFAULT_TTL, ListCache};
