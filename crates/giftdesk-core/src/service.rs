// ── Backoffice facade ──
//
// Single entry point for consumers. Lists go through the query cache,
// single-entity reads always hit the backend, vouchers seen anywhere are
// recorded in the voucher book, and successful mutations invalidate the
// lists they affect.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use giftdesk_api::types::{
    CustomerResponse, OrderResponse, ProductResponse, StoreResponse, UserResponse,
    VoucherResponse,
};
use giftdesk_api::{ApiClient, ListQuery, PaginatedList, Resource};

use crate::assembler::{CodeReconciliation, OrderDraft};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::lifecycle;
use crate::link::LinkBuilder;
use crate::model::{Customer, EntityId, Order, Product, Store, User, Voucher};
use crate::store::{ListCache, VoucherBook};

/// Page size used when loading every product of a store.
const STORE_PRODUCTS_LIMIT: u64 = 100;

/// Result of a successful create-order call.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub reconciliation: CodeReconciliation,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<BackofficeInner>`.
#[derive(Clone)]
pub struct Backoffice {
    inner: Arc<BackofficeInner>,
}

struct BackofficeInner {
    api: ApiClient,
    cache: ListCache,
    book: VoucherBook,
    links: LinkBuilder,
}

impl Backoffice {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(
            config.api_url.as_str(),
            config.api_key.as_ref(),
            Arc::clone(&config.credentials),
            &config.transport,
        )?;
        let links = LinkBuilder::new(config.app_url.as_str()).with_qr_endpoint(config.qr_endpoint);
        Ok(Self::from_client(api, links, config.cache_ttl))
    }

    /// Wrap an already-built client.
    pub fn from_client(api: ApiClient, links: LinkBuilder, cache_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(BackofficeInner {
                api,
                cache: ListCache::new(cache_ttl),
                book: VoucherBook::new(),
                links,
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.inner.links
    }

    pub fn voucher_book(&self) -> &VoucherBook {
        &self.inner.book
    }

    pub fn cache(&self) -> &ListCache {
        &self.inner.cache
    }

    // ── Cache ────────────────────────────────────────────────────────

    pub fn invalidate(&self, resource: Resource) {
        for affected in affected_by(resource) {
            self.inner.cache.invalidate(*affected);
        }
    }

    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }

    // ── Lists ────────────────────────────────────────────────────────

    async fn list_page(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Arc<PaginatedList<Value>>, CoreError> {
        if let Some(hit) = self.inner.cache.get(resource, query) {
            debug!(%resource, page = query.page, "list served from cache");
            return Ok(hit);
        }
        let generation = self.inner.cache.generation(resource);
        let list = self.inner.api.list_values(resource, query).await?;
        Ok(self.inner.cache.insert(resource, query, generation, list))
    }

    async fn list_as<W, D>(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<PaginatedList<D>, CoreError>
    where
        W: DeserializeOwned,
        D: TryFrom<W, Error = CoreError>,
    {
        let page = self.list_page(resource, query).await?;
        let wire: PaginatedList<W> = (*page).clone().decode()?;
        wire.try_map(D::try_from)
    }

    pub async fn list_vouchers(&self, query: &ListQuery) -> Result<PaginatedList<Voucher>, CoreError> {
        let page = self
            .list_as::<VoucherResponse, Voucher>(Resource::Vouchers, query)
            .await?;
        Ok(page.map(|v| Voucher::clone(&self.inner.book.record(v))))
    }

    pub async fn list_orders(&self, query: &ListQuery) -> Result<PaginatedList<Order>, CoreError> {
        let page = self
            .list_as::<OrderResponse, Order>(Resource::Orders, query)
            .await?;
        Ok(page.map(|mut order| {
            order.voucher = Voucher::clone(&self.inner.book.record(order.voucher));
            order
        }))
    }

    pub async fn list_customers(&self, query: &ListQuery) -> Result<PaginatedList<Customer>, CoreError> {
        self.list_as::<CustomerResponse, Customer>(Resource::Customers, query)
            .await
    }

    pub async fn list_stores(&self, query: &ListQuery) -> Result<PaginatedList<Store>, CoreError> {
        self.list_as::<StoreResponse, Store>(Resource::Stores, query)
            .await
    }

    pub async fn list_products(&self, query: &ListQuery) -> Result<PaginatedList<Product>, CoreError> {
        self.list_as::<ProductResponse, Product>(Resource::Products, query)
            .await
    }

    pub async fn list_users(&self, query: &ListQuery) -> Result<PaginatedList<User>, CoreError> {
        self.list_as::<UserResponse, User>(Resource::Users, query)
            .await
    }

    /// Every product offered by one store (`GET /products?storeId=`).
    pub async fn store_products(&self, store_id: &EntityId) -> Result<Vec<Product>, CoreError> {
        let query =
            ListQuery::new(1, STORE_PRODUCTS_LIMIT).with_filter("storeId", store_id.as_str());
        Ok(self.list_products(&query).await?.items)
    }

    /// Load the draft's store products into it, recording a failure on the
    /// draft instead of returning it.
    pub async fn load_products(&self, draft: &mut OrderDraft) {
        if let Some(store_id) = draft.store_id().cloned() {
            let result = self.store_products(&store_id).await;
            draft.set_products(result);
        }
    }

    // ── Single entities ──────────────────────────────────────────────

    async fn get_as<W, D>(&self, resource: Resource, entity: &str, id: &str) -> Result<D, CoreError>
    where
        W: DeserializeOwned,
        D: TryFrom<W, Error = CoreError>,
    {
        let wire: W = self
            .inner
            .api
            .get_entity(resource, id)
            .await
            .map_err(|e| CoreError::from(e).for_entity(entity, id))?;
        D::try_from(wire)
    }

    pub async fn get_order(&self, id: &EntityId) -> Result<Order, CoreError> {
        let mut order: Order = self
            .get_as::<OrderResponse, Order>(Resource::Orders, "order", id.as_str())
            .await?;
        order.voucher = Voucher::clone(&self.inner.book.record(order.voucher));
        Ok(order)
    }

    pub async fn get_customer(&self, id: &EntityId) -> Result<Customer, CoreError> {
        self.get_as::<CustomerResponse, Customer>(Resource::Customers, "customer", id.as_str())
            .await
    }

    pub async fn get_store(&self, id: &EntityId) -> Result<Store, CoreError> {
        self.get_as::<StoreResponse, Store>(Resource::Stores, "store", id.as_str())
            .await
    }

    pub async fn get_product(&self, id: &EntityId) -> Result<Product, CoreError> {
        self.get_as::<ProductResponse, Product>(Resource::Products, "product", id.as_str())
            .await
    }

    pub async fn get_user(&self, id: &EntityId) -> Result<User, CoreError> {
        self.get_as::<UserResponse, User>(Resource::Users, "user", id.as_str())
            .await
    }

    /// The user behind the configured credentials.
    pub async fn current_user(&self) -> Result<User, CoreError> {
        let wire = self.inner.api.current_user().await?;
        User::try_from(wire)
    }

    /// Fetch a voucher by code and record it in the voucher book.
    pub async fn get_voucher(&self, code: &str) -> Result<Voucher, CoreError> {
        let voucher = self.fetch_voucher(code.trim()).await?;
        Ok(Voucher::clone(&voucher))
    }

    async fn fetch_voucher(&self, code: &str) -> Result<Arc<Voucher>, CoreError> {
        let wire = self
            .inner
            .api
            .get_voucher_by_code(code)
            .await
            .map_err(|e| CoreError::from(e).for_entity("voucher", code))?;
        Ok(self.inner.book.record(Voucher::try_from(wire)?))
    }

    // ── Redemption ───────────────────────────────────────────────────

    /// Redeem a voucher by code.
    ///
    /// Vouchers the client already knows to be redeemed or expired are
    /// rejected without calling the backend. That check only saves a round
    /// trip: at-most-once redemption is enforced by the backend, and a
    /// rejection from it surfaces as [`CoreError::RedemptionFailed`] with
    /// the server's message.
    pub async fn redeem(&self, code: &str) -> Result<Voucher, CoreError> {
        let code = code.trim();
        let known = match self.inner.book.get(code) {
            Some(voucher) => voucher,
            None => self.fetch_voucher(code).await?,
        };
        lifecycle::check_redeemable(&known, Utc::now())?;

        let response = match self.inner.api.redeem_voucher(code).await {
            Ok(response) => response,
            Err(err) => return Err(self.redemption_failed(code, err).await),
        };

        let reported = response.map(Voucher::try_from).transpose()?;
        let redeemed = match reported {
            Some(voucher) if voucher.redeemed_at.is_some() => self.inner.book.record(voucher),
            other => {
                debug!(code, "redemption response carried no redeemedAt; refetching");
                let fresh = self.fetch_voucher(code).await?;
                if fresh.redeemed_at.is_none() {
                    let payload = other
                        .and_then(|v| serde_json::to_value(v).ok())
                        .unwrap_or(Value::Null);
                    return Err(CoreError::malformed(
                        format!("voucher {code} was redeemed but carries no redemption time"),
                        payload,
                    ));
                }
                fresh
            }
        };

        self.invalidate(Resource::Vouchers);
        info!(code, redeemed_at = ?redeemed.redeemed_at, "voucher redeemed");
        Ok(Voucher::clone(&redeemed))
    }

    async fn redemption_failed(&self, code: &str, err: giftdesk_api::Error) -> CoreError {
        let err = match err {
            giftdesk_api::Error::Api {
                status, message, ..
            } if status != 404 => CoreError::RedemptionFailed {
                code: code.to_owned(),
                message,
            },
            other => CoreError::from(other).for_entity("voucher", code),
        };

        if matches!(err, CoreError::RedemptionFailed { .. }) {
            warn!(code, error = %err, "redemption rejected by the server");
            if let Err(refetch) = self.fetch_voucher(code).await {
                debug!(code, error = %refetch, "could not refresh voucher after failed redemption");
            }
        }
        err
    }

    /// Redemption URL and QR image reference for a voucher.
    pub fn voucher_link(&self, voucher: &Voucher) -> (String, String) {
        let links = &self.inner.links;
        (
            links.link(&voucher.code),
            links.qr_source(&voucher.code, voucher.qr_code.as_deref()),
        )
    }

    // ── Orders ───────────────────────────────────────────────────────

    /// Submit a new order. The code stored by the backend replaces the
    /// draft's preview code.
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder, CoreError> {
        let form = draft.assemble(Utc::now())?;
        let response = self.inner.api.create_order(&form.to_request()).await?;
        let mut order = Order::try_from(response)?;
        let reconciliation = draft.reconcile(&order);
        order.voucher = Voucher::clone(&self.inner.book.record(order.voucher));

        self.invalidate(Resource::Orders);
        info!(order = %order.id, code = reconciliation.code(), "order created");
        Ok(CreatedOrder {
            order,
            reconciliation,
        })
    }

    /// Submit edits to an existing order.
    ///
    /// The stored order is re-read first; edits that would move it
    /// backwards are rejected before anything is sent.
    pub async fn update_order(&self, id: &EntityId, draft: &OrderDraft) -> Result<Order, CoreError> {
        let now = Utc::now();
        let current = self.get_order(id).await?;
        draft.check_update(&current, now)?;
        let form = draft.assemble(now)?;

        let response = self
            .inner
            .api
            .update_order(id.as_str(), &form.to_request())
            .await
            .map_err(|e| CoreError::from(e).for_entity("order", id.as_str()))?;
        let mut order = Order::try_from(response)?;
        order.voucher = Voucher::clone(&self.inner.book.record(order.voucher));

        self.invalidate(Resource::Orders);
        info!(order = %order.id, "order updated");
        Ok(order)
    }

    // ── Deletion ─────────────────────────────────────────────────────

    pub async fn delete(&self, resource: Resource, id: &EntityId) -> Result<(), CoreError> {
        self.inner
            .api
            .delete_entity(resource, id.as_str())
            .await
            .map_err(|e| CoreError::from(e).for_entity(entity_name(resource), id.as_str()))?;

        if resource == Resource::Vouchers {
            self.inner.book.remove_by_id(id);
        }
        self.invalidate(resource);
        info!(%resource, %id, "deleted");
        Ok(())
    }
}

/// Lists whose contents change when `resource` is mutated.
fn affected_by(resource: Resource) -> &'static [Resource] {
    match resource {
        Resource::Orders | Resource::Vouchers => &[Resource::Orders, Resource::Vouchers],
        Resource::Customers => &[Resource::Customers],
        Resource::Stores => &[Resource::Stores],
        Resource::Products => &[Resource::Products],
        Resource::Users => &[Resource::Users],
    }
}

fn entity_name(resource: Resource) -> &'static str {
    match resource {
        Resource::Customers => "customer",
        Resource::Stores => "store",
        Resource::Products => "product",
        Resource::Users => "user",
        Resource::Orders => "order",
        Resource::Vouchers => "voucher",
    }
}
