// ── Voucher book ──
//
// Concurrent keyed collection of the freshest known voucher views,
// indexed by code with a secondary id index. Every insert goes through
// `lifecycle::reconcile`, so a redeemed voucher stays redeemed while it
// is held. The book is bounded: past its capacity the least recently
// recorded vouchers are evicted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::trace;

use crate::lifecycle;
use crate::model::{EntityId, Voucher};

/// Default number of vouchers held before eviction starts.
pub const DEFAULT_BOOK_CAPACITY: usize = 10_000;

#[derive(Debug)]
struct BookEntry {
    voucher: Arc<Voucher>,
    /// Recording order, used to pick eviction victims.
    seq: u64,
}

#[derive(Debug)]
pub struct VoucherBook {
    /// Primary storage: code -> voucher.
    by_code: DashMap<String, BookEntry>,
    /// Secondary index: id -> code.
    id_to_code: DashMap<EntityId, String>,
    next_seq: AtomicU64,
    capacity: usize,
}

impl Default for VoucherBook {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BOOK_CAPACITY)
    }
}

impl VoucherBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding at most `capacity` vouchers (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_code: DashMap::new(),
            id_to_code: DashMap::new(),
            next_seq: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert or refresh a voucher view. Returns the stored (merged) view.
    pub fn record(&self, voucher: Voucher) -> Arc<Voucher> {
        let known = self.get(&voucher.code);
        let merged = Arc::new(lifecycle::reconcile(known.as_deref(), voucher));

        if let Some(id) = &merged.id {
            self.id_to_code.insert(id.clone(), merged.code.clone());
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.by_code.insert(
            merged.code.clone(),
            BookEntry {
                voucher: Arc::clone(&merged),
                seq,
            },
        );
        self.evict_overflow();
        merged
    }

    pub fn get(&self, code: &str) -> Option<Arc<Voucher>> {
        self.by_code.get(code).map(|r| Arc::clone(&r.value().voucher))
    }

    pub fn get_by_id(&self, id: &EntityId) -> Option<Arc<Voucher>> {
        let code = self.id_to_code.get(id)?;
        self.get(code.value())
    }

    /// Forget a voucher by code.
    pub fn remove(&self, code: &str) -> Option<Arc<Voucher>> {
        let removed = self.by_code.remove(code).map(|(_, entry)| entry.voucher);
        if let Some(id) = removed.as_ref().and_then(|v| v.id.as_ref()) {
            self.id_to_code.remove(id);
        }
        removed
    }

    /// Forget a voucher by id.
    pub fn remove_by_id(&self, id: &EntityId) -> Option<Arc<Voucher>> {
        let (_, code) = self.id_to_code.remove(id)?;
        self.by_code.remove(&code).map(|(_, entry)| entry.voucher)
    }

    pub fn clear(&self) {
        self.by_code.clear();
        self.id_to_code.clear();
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    fn evict_overflow(&self) {
        let excess = self.by_code.len().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }
        let mut order: Vec<(u64, String)> = self
            .by_code
            .iter()
            .map(|entry| (entry.value().seq, entry.key().clone()))
            .collect();
        order.sort_unstable();
        for (_, code) in order.into_iter().take(excess) {
            trace!(%code, "evicting voucher from book");
            self.remove(&code);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::model::{GiftDetails, VoucherState};

    fn voucher(code: &str, id: &str) -> Voucher {
        Voucher {
            id: Some(EntityId::from(id)),
            code: code.into(),
            status: VoucherState::Active,
            expiration_date: Utc::now() + Duration::days(30),
            redeemed_at: None,
            store_id: None,
            product_id: None,
            customer_id: None,
            amount: Decimal::new(10, 0),
            qr_code: None,
            template: None,
            gift_details: GiftDetails::default(),
            created_at: None,
        }
    }

    #[test]
    fn record_and_lookup_by_code_and_id() {
        let book = VoucherBook::new();
        book.record(voucher("AAAA1111", "v1"));
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("AAAA1111").unwrap().id, Some(EntityId::from("v1")));
        assert_eq!(book.get_by_id(&EntityId::from("v1")).unwrap().code, "AAAA1111");
    }

    #[test]
    fn stale_view_does_not_unredeem() {
        let book = VoucherBook::new();
        let mut redeemed = voucher("AAAA1111", "v1");
        redeemed.redeemed_at = Some(Utc::now());
        redeemed.status = VoucherState::Redeemed;
        book.record(redeemed);

        let stored = book.record(voucher("AAAA1111", "v1"));
        assert!(stored.redeemed_at.is_some());
        assert_eq!(book.get("AAAA1111").unwrap().status, VoucherState::Redeemed);
    }

    #[test]
    fn remove_by_id_clears_both_indexes() {
        let book = VoucherBook::new();
        book.record(voucher("AAAA1111", "v1"));
        book.record(voucher("BBBB2222", "v2"));

        assert!(book.remove_by_id(&EntityId::from("v1")).is_some());
        assert!(book.get("AAAA1111").is_none());
        assert!(book.get_by_id(&EntityId::from("v1")).is_none());
        assert_eq!(book.len(), 1);

        book.remove("BBBB2222");
        assert!(book.is_empty());
    }

    #[test]
    fn oldest_vouchers_are_evicted_past_capacity() {
        let book = VoucherBook::with_capacity(2);
        book.record(voucher("AAAA1111", "v1"));
        book.record(voucher("BBBB2222", "v2"));
        // Refreshing keeps AAAA1111 recent.
        book.record(voucher("AAAA1111", "v1"));
        book.record(voucher("CCCC3333", "v3"));

        assert_eq!(book.len(), 2);
        assert!(book.get("BBBB2222").is_none());
        assert!(book.get_by_id(&EntityId::from("v2")).is_none());
        assert!(book.get("AAAA1111").is_some());
        assert!(book.get("CCCC3333").is_some());
    }
}
