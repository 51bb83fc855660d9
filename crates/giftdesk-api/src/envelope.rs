// ── List response normalization ──
//
// Backend list endpoints are not uniformly shaped across resources.
// Everything that fetches a list goes through `normalize`, so callers only
// ever see `PaginatedList<T>`.
//
// Recognized shapes, first match wins:
//   1. {"status": "success", "data": [..], "pagination": {..}}
//   2. {"data": [..], "pagination": {..}}
//   3. [..]
//   4. {"data": [..], ..}                    (no usable pagination object)
// Anything else is a `MalformedResponse`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::Error;

/// The canonical paginated-list envelope.
///
/// `pages == ceil(total / limit)` whenever `limit > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl<T> PaginatedList<T> {
    /// An empty page at the given position.
    pub fn empty(page: u64, limit: u64) -> Self {
        Self {
            items: Vec::new(),
            page,
            limit,
            total: 0,
            pages: 0,
        }
    }

    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Convert every item, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            pages: self.pages,
        }
    }

    /// Fallible variant of [`map`](Self::map); stops at the first error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<PaginatedList<U>, E> {
        Ok(PaginatedList {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            page: self.page,
            limit: self.limit,
            total: self.total,
            pages: self.pages,
        })
    }
}

impl PaginatedList<Value> {
    /// Decode the raw items into `T`.
    ///
    /// A decoding failure is reported as [`Error::MalformedResponse`] carrying
    /// the offending item.
    pub fn decode<T: DeserializeOwned>(self) -> Result<PaginatedList<T>, Error> {
        self.try_map(|item| {
            serde_json::from_value::<T>(item.clone()).map_err(|e| Error::MalformedResponse {
                reason: format!("list item does not match the expected type: {e}"),
                payload: item,
            })
        })
    }
}

/// Number of pages needed for `total` items at `limit` per page.
pub fn pages_for(total: u64, limit: u64) -> u64 {
    if limit == 0 { 0 } else { total.div_ceil(limit) }
}

/// Normalize a raw list payload and decode its items into `T`.
pub fn normalize<T: DeserializeOwned>(
    raw: Value,
    requested_page: u64,
    requested_limit: u64,
) -> Result<PaginatedList<T>, Error> {
    normalize_value(raw, requested_page, requested_limit)?.decode()
}

/// Shape detection only: reconcile `raw` into an envelope of raw JSON items.
pub fn normalize_value(
    raw: Value,
    requested_page: u64,
    requested_limit: u64,
) -> Result<PaginatedList<Value>, Error> {
    match raw {
        Value::Array(items) => {
            trace!(count = items.len(), "list response is a bare array");
            Ok(window(items, requested_page, requested_limit))
        }
        Value::Object(mut map) => {
            if !matches!(map.get("data"), Some(Value::Array(_))) {
                return Err(Error::MalformedResponse {
                    reason: "response object has no `data` array".into(),
                    payload: Value::Object(map),
                });
            }
            let items = match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };

            match map.get("pagination").and_then(Value::as_object) {
                Some(pagination) => {
                    let success = map.get("status").and_then(Value::as_str) == Some("success");
                    trace!(success, count = items.len(), "list response carries pagination");
                    Ok(from_pagination(
                        items,
                        pagination,
                        requested_page,
                        requested_limit,
                    ))
                }
                None => {
                    trace!(count = items.len(), "list response has no pagination object");
                    Ok(PaginatedList {
                        items,
                        page: requested_page,
                        limit: requested_limit,
                        total: 0,
                        pages: 0,
                    })
                }
            }
        }
        other => Err(Error::MalformedResponse {
            reason: "response is neither an array nor an object".into(),
            payload: other,
        }),
    }
}

/// Strip a `{"data": {..}}` wrapper from a single-entity response.
///
/// Anything else is returned unchanged.
pub fn unwrap_entity(raw: Value) -> Value {
    match raw {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn from_pagination(
    items: Vec<Value>,
    pagination: &Map<String, Value>,
    requested_page: u64,
    requested_limit: u64,
) -> PaginatedList<Value> {
    let page = read_count(pagination, "page").unwrap_or(requested_page);
    let limit = read_count(pagination, "limit").unwrap_or(requested_limit);
    let total = read_count(pagination, "total").unwrap_or(items.len() as u64);
    let reported = read_count(pagination, "pages");

    let pages = if limit == 0 {
        reported.unwrap_or(0)
    } else {
        let computed = pages_for(total, limit);
        if let Some(reported) = reported.filter(|r| *r != computed) {
            debug!(reported, computed, total, limit, "backend page count disagrees, recomputing");
        }
        computed
    };

    PaginatedList {
        items,
        page,
        limit,
        total,
        pages,
    }
}

/// Read a non-negative count that may arrive as a number or a numeric string.
fn read_count(map: &Map<String, Value>, key: &str) -> Option<u64> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Synthesize pagination for a bare array.
///
/// An array longer than the requested limit means the backend ignored the
/// paging parameters; the requested window is cut out client-side.
fn window(items: Vec<Value>, requested_page: u64, requested_limit: u64) -> PaginatedList<Value> {
    let total = items.len() as u64;
    let pages = pages_for(total, requested_limit);

    let items = if requested_limit > 0 && total > requested_limit {
        let skip = requested_page.saturating_sub(1).saturating_mul(requested_limit);
        items
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(requested_limit).unwrap_or(usize::MAX))
            .collect()
    } else {
        items
    };

    PaginatedList {
        items,
        page: requested_page,
        limit: requested_limit,
        total,
        pages,
    }
}
