// ── List query cache ──
//
// Normalized list envelopes keyed by resource + query, each with the
// instant it was fetched. Entries older than the TTL are treated as
// absent; they are dropped on read and swept on every insert. Each
// resource carries a generation bumped by `invalidate`, and an insert
// tagged with an older generation is discarded. Uses
// `tokio::time::Instant` so tests can drive expiry with a paused clock.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, trace};

use giftdesk_api::{ListQuery, PaginatedList, Resource};

/// Default staleness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    resource: Resource,
    query: ListQuery,
}

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    list: Arc<PaginatedList<Value>>,
}

#[derive(Debug)]
pub struct ListCache {
    entries: DashMap<CacheKey, CacheEntry>,
    generations: DashMap<Resource, u64>,
    ttl: Duration,
}

impl Default for ListCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            generations: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `resource` + `query`, if any.
    pub fn get(&self, resource: Resource, query: &ListQuery) -> Option<Arc<PaginatedList<Value>>> {
        let key = CacheKey {
            resource,
            query: query.clone(),
        };
        let fresh = {
            let entry = self.entries.get(&key)?;
            (entry.fetched_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.list))
        };
        if fresh.is_none() {
            trace!(%resource, page = query.page, "dropping stale list entry");
            self.entries.remove(&key);
        }
        fresh
    }

    /// Current generation of `resource`. Read it before fetching and pass
    /// it to [`insert`](Self::insert).
    pub fn generation(&self, resource: Resource) -> u64 {
        self.generations.get(&resource).map_or(0, |g| *g)
    }

    /// Store `list` unless `resource` was invalidated since `generation`
    /// was read. The list is returned either way.
    pub fn insert(
        &self,
        resource: Resource,
        query: &ListQuery,
        generation: u64,
        list: PaginatedList<Value>,
    ) -> Arc<PaginatedList<Value>> {
        let list = Arc::new(list);
        self.purge_stale();

        // Holding the generation guard keeps `invalidate` from bumping it
        // between the check and the insert.
        let current = self.generations.get(&resource);
        if current.as_deref().copied().unwrap_or(0) != generation {
            debug!(%resource, page = query.page, "discarding list fetched before invalidation");
            return list;
        }
        self.entries.insert(
            CacheKey {
                resource,
                query: query.clone(),
            },
            CacheEntry {
                fetched_at: Instant::now(),
                list: Arc::clone(&list),
            },
        );
        drop(current);
        list
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_stale(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Drop every entry of `resource`, whatever its query.
    pub fn invalidate(&self, resource: Resource) {
        *self.generations.entry(resource).or_insert(0) += 1;
        self.entries.retain(|key, _| key.resource != resource);
    }

    pub fn invalidate_all(&self) {
        for resource in Resource::ALL {
            *self.generations.entry(resource).or_insert(0) += 1;
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn list(n: u64) -> PaginatedList<Value> {
        PaginatedList {
            items: (0..n).map(Value::from).collect(),
            page: 1,
            limit: 10,
            total: n,
            pages: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ListCache::new(Duration::from_secs(60));
        let query = ListQuery::default();
        cache.insert(Resource::Vouchers, &query, 0, list(3));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(Resource::Vouchers, &query).unwrap().total, 3);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(Resource::Vouchers, &query).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn key_includes_page_sort_and_filters() {
        let cache = ListCache::default();
        let base = ListQuery::new(1, 10);
        cache.insert(Resource::Products, &base, 0, list(1));

        assert!(cache.get(Resource::Products, &ListQuery::new(2, 10)).is_none());
        assert!(cache.get(Resource::Products, &base.clone().with_sort("name")).is_none());
        assert!(
            cache
                .get(Resource::Products, &base.clone().with_filter("storeId", "s1"))
                .is_none()
        );
        assert!(cache.get(Resource::Stores, &base).is_none());
        assert!(cache.get(Resource::Products, &base).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_drops_only_that_resource() {
        let cache = ListCache::default();
        cache.insert(Resource::Vouchers, &ListQuery::new(1, 10), 0, list(1));
        cache.insert(Resource::Vouchers, &ListQuery::new(2, 10), 0, list(1));
        cache.insert(Resource::Stores, &ListQuery::new(1, 10), 0, list(1));

        cache.invalidate(Resource::Vouchers);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(Resource::Stores, &ListQuery::new(1, 10)).is_some());

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_after_invalidation_is_discarded() {
        let cache = ListCache::default();
        let query = ListQuery::new(1, 10);
        let generation = cache.generation(Resource::Vouchers);

        // A mutation lands while the fetch is in flight.
        cache.invalidate(Resource::Orders);
        cache.invalidate(Resource::Vouchers);

        let returned = cache.insert(Resource::Vouchers, &query, generation, list(2));
        assert_eq!(returned.total, 2);
        assert!(cache.get(Resource::Vouchers, &query).is_none());

        let fresh = cache.generation(Resource::Vouchers);
        cache.insert(Resource::Vouchers, &query, fresh, list(2));
        assert!(cache.get(Resource::Vouchers, &query).is_some());

        let stores = cache.generation(Resource::Stores);
        cache.invalidate_all();
        cache.insert(Resource::Stores, &query, stores, list(1));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_sweeps_expired_entries() {
        let cache = ListCache::new(Duration::from_secs(60));
        cache.insert(Resource::Stores, &ListQuery::new(1, 10), 0, list(1));
        cache.insert(Resource::Stores, &ListQuery::new(2, 10), 0, list(1));

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert(Resource::Users, &ListQuery::new(1, 10), 0, list(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_stale(), 0);
    }
}
