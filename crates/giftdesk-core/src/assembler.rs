// ── Order + voucher assembly ──
//
// An `OrderDraft` collects the selections behind a create/update order
// request. The amount is never entered directly: it follows the selected
// product's price and is cleared whenever the store or product changes.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use giftdesk_api::types::{OrderRequest, PaymentDetailsRequest, VoucherRequest};

use crate::code;
use crate::error::{CoreError, ValidationErrors};
use crate::model::{
    EntityId, GiftDetails, Order, OrderStatus, PaymentDetails, PaymentProvider, PaymentStatus,
    Product, Template, VoucherState,
};

/// Validity of a new voucher when no expiration is chosen.
pub const DEFAULT_VALIDITY_DAYS: i64 = 60;

/// Outcome of comparing the preview code with the code the backend stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeReconciliation {
    Confirmed { code: String },
    Replaced { preview: String, authoritative: String },
}

impl CodeReconciliation {
    /// The code to show from now on.
    pub fn code(&self) -> &str {
        match self {
            Self::Confirmed { code } => code,
            Self::Replaced { authoritative, .. } => authoritative,
        }
    }
}

// ── Form data ────────────────────────────────────────────────────────

/// Voucher half of a validated order form.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherForm {
    pub store_id: EntityId,
    pub product_id: EntityId,
    pub customer_id: EntityId,
    pub code: String,
    pub status: VoucherState,
    pub amount: Decimal,
    pub expiration_date: DateTime<Utc>,
    pub qr_code: Option<String>,
    pub template: Template,
    pub gift_details: GiftDetails,
}

/// A complete, validated order ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFormData {
    pub customer_id: EntityId,
    pub payment_details: PaymentDetails,
    pub voucher: VoucherForm,
}

impl OrderFormData {
    pub fn to_request(&self) -> OrderRequest {
        let payment = &self.payment_details;
        let voucher = &self.voucher;
        OrderRequest {
            customer_id: self.customer_id.to_string(),
            payment_details: PaymentDetailsRequest {
                payment_id: payment.payment_id.clone(),
                payment_status: payment.payment_status.to_string(),
                provider: payment
                    .provider
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                amount: payment.amount,
                payment_email: payment.payment_email.clone(),
            },
            voucher: VoucherRequest {
                store_id: voucher.store_id.to_string(),
                product_id: voucher.product_id.to_string(),
                customer_id: voucher.customer_id.to_string(),
                code: voucher.code.clone(),
                status: voucher.status.to_string(),
                amount: voucher.amount,
                expiration_date: voucher.expiration_date,
                qr_code: voucher.qr_code.clone(),
                template: voucher.template.to_string(),
                gift_details: (&voucher.gift_details).into(),
            },
        }
    }
}

// ── Draft ────────────────────────────────────────────────────────────

/// Selections for a new order, or edits to an existing one.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    store_id: Option<EntityId>,
    products: Vec<Product>,
    product_load_error: Option<String>,
    product_id: Option<EntityId>,
    amount: Option<Decimal>,
    customer_id: Option<EntityId>,
    payment_id: String,
    payment_status: Option<PaymentStatus>,
    provider: Option<PaymentProvider>,
    payment_email: Option<String>,
    expiration_date: DateTime<Utc>,
    template: Template,
    gift_details: GiftDetails,
    code: String,
    qr_code: Option<String>,
    original: Option<Order>,
}

impl OrderDraft {
    /// Empty draft for a new order with a fresh preview code.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_preview_code(now, code::generate())
    }

    pub fn with_preview_code(now: DateTime<Utc>, preview: impl Into<String>) -> Self {
        Self {
            store_id: None,
            products: Vec::new(),
            product_load_error: None,
            product_id: None,
            amount: None,
            customer_id: None,
            payment_id: String::new(),
            payment_status: None,
            provider: None,
            payment_email: None,
            expiration_date: now + Duration::days(DEFAULT_VALIDITY_DAYS),
            template: Template::default(),
            gift_details: GiftDetails::default(),
            code: preview.into(),
            qr_code: None,
            original: None,
        }
    }

    /// Draft pre-filled from an existing order; keeps its code and expiration.
    pub fn from_order(order: &Order) -> Self {
        let voucher = &order.voucher;
        let payment = &order.payment_details;
        Self {
            store_id: voucher.store_id.clone(),
            products: Vec::new(),
            product_load_error: None,
            product_id: voucher.product_id.clone(),
            amount: Some(voucher.amount),
            customer_id: order.customer_id.clone().or_else(|| voucher.customer_id.clone()),
            payment_id: payment.payment_id.clone(),
            payment_status: Some(payment.payment_status),
            provider: payment.provider,
            payment_email: Some(payment.payment_email.clone()).filter(|e| !e.is_empty()),
            expiration_date: voucher.expiration_date,
            template: voucher.template.unwrap_or_default(),
            gift_details: voucher.gift_details.clone(),
            code: voucher.code.clone(),
            qr_code: voucher.qr_code.clone(),
            original: Some(order.clone()),
        }
    }

    // ── Selections ───────────────────────────────────────────────────

    /// Select a store. A different store clears the product, the amount
    /// and the loaded product list.
    pub fn select_store(&mut self, store_id: EntityId) {
        if self.store_id.as_ref() == Some(&store_id) {
            return;
        }
        self.store_id = Some(store_id);
        self.products.clear();
        self.product_load_error = None;
        self.product_id = None;
        self.amount = None;
    }

    /// Record the outcome of loading the selected store's products.
    ///
    /// On failure the list is empty, the error is kept for display and
    /// submission stays blocked until a reload succeeds.
    pub fn set_products(&mut self, result: Result<Vec<Product>, CoreError>) {
        match result {
            Ok(products) => {
                self.product_load_error = None;
                let still_offered = self
                    .product_id
                    .as_ref()
                    .is_some_and(|id| products.iter().any(|p| &p.id == id));
                if !still_offered {
                    self.product_id = None;
                    self.amount = None;
                }
                self.products = products;
            }
            Err(err) => {
                warn!(error = %err, "failed to load store products");
                self.products.clear();
                self.product_load_error = Some(err.to_string());
                self.product_id = None;
                self.amount = None;
            }
        }
    }

    /// Select a product from the loaded list; the amount is re-derived
    /// from its price.
    pub fn select_product(&mut self, product_id: &EntityId) -> Result<(), CoreError> {
        self.amount = None;
        self.product_id = None;

        if let Some(err) = &self.product_load_error {
            return Err(ValidationErrors::single(
                "product",
                format!("products could not be loaded: {err}"),
            )
            .into());
        }
        let Some(product) = self.products.iter().find(|p| &p.id == product_id) else {
            return Err(ValidationErrors::single(
                "product",
                format!("product {product_id} is not offered by the selected store"),
            )
            .into());
        };
        if !product.is_active {
            return Err(
                ValidationErrors::single("product", format!("{} is not active", product.name))
                    .into(),
            );
        }

        self.product_id = Some(product.id.clone());
        self.amount = product.price;
        Ok(())
    }

    pub fn select_customer(&mut self, customer_id: EntityId) {
        self.customer_id = Some(customer_id);
    }

    pub fn set_payment_id(&mut self, payment_id: impl Into<String>) {
        self.payment_id = payment_id.into();
    }

    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = Some(status);
    }

    pub fn set_provider(&mut self, provider: PaymentProvider) {
        self.provider = Some(provider);
    }

    pub fn set_payment_email(&mut self, email: impl Into<String>) {
        self.payment_email = Some(email.into());
    }

    pub fn set_expiration_date(&mut self, date: DateTime<Utc>) {
        self.expiration_date = date;
    }

    pub fn set_template(&mut self, template: Template) {
        self.template = template;
    }

    pub fn set_gift_details(&mut self, details: GiftDetails) {
        self.gift_details = details;
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn store_id(&self) -> Option<&EntityId> {
        self.store_id.as_ref()
    }

    pub fn product_id(&self) -> Option<&EntityId> {
        self.product_id.as_ref()
    }

    /// Read-only amount derived from the selected product.
    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product_load_error(&self) -> Option<&str> {
        self.product_load_error.as_deref()
    }

    /// Client-side code; the backend may replace it.
    pub fn preview_code(&self) -> &str {
        &self.code
    }

    pub fn expiration_date(&self) -> DateTime<Utc> {
        self.expiration_date
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    // ── Validation ───────────────────────────────────────────────────

    fn voucher_state(&self, now: DateTime<Utc>) -> VoucherState {
        match &self.original {
            Some(order) if order.voucher.redeemed_at.is_some() => VoucherState::Redeemed,
            _ if now > self.expiration_date => VoucherState::Expired,
            _ => VoucherState::Active,
        }
    }

    /// Status the order would have once saved, if payment status is set.
    pub fn derived_status(&self, now: DateTime<Utc>) -> Option<OrderStatus> {
        self.payment_status
            .map(|payment| OrderStatus::derive(payment, self.voucher_state(now)))
    }

    /// Every field error that blocks submission.
    pub fn validate(&self, now: DateTime<Utc>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.store_id.is_none() {
            errors.push("store", "select a store");
        }
        if let Some(err) = &self.product_load_error {
            errors.push("product", format!("products could not be loaded: {err}"));
        } else if self.product_id.is_none() {
            errors.push("product", "select a product");
        } else if self.amount.is_none() {
            errors.push("amount", "the selected product has no price");
        }
        if self.customer_id.is_none() {
            errors.push("customer", "select a customer");
        }
        if self.payment_status.is_none() {
            errors.push("paymentStatus", "select a payment status");
        }
        if self.provider.is_none() {
            errors.push("provider", "select a payment provider");
        }
        match self.payment_email.as_deref() {
            None | Some("") => errors.push("paymentEmail", "payment email is required"),
            Some(email) if !looks_like_email(email) => {
                errors.push("paymentEmail", format!("`{email}` is not a valid email"));
            }
            Some(_) => {}
        }
        if let Some(email) = self.gift_details.recipient_email.as_deref() {
            if !looks_like_email(email) {
                errors.push(
                    "giftDetails.recipientEmail",
                    format!("`{email}` is not a valid email"),
                );
            }
        }
        if self.original.is_none() && self.expiration_date <= now {
            errors.push("expirationDate", "expiration date must be in the future");
        }

        errors
    }

    /// Reject edits that would move `current` backwards.
    pub fn check_update(&self, current: &Order, now: DateTime<Utc>) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();
        let stored = &current.payment_details;

        if stored.payment_status == PaymentStatus::Completed {
            match self.payment_status {
                Some(PaymentStatus::Pending) => {
                    errors.push("paymentStatus", "a completed payment cannot return to pending");
                }
                Some(PaymentStatus::Failed) => {
                    errors.push("paymentStatus", "a completed payment cannot be marked failed");
                }
                _ => {}
            }
            if self.payment_id != stored.payment_id {
                errors.push("paymentId", "payment id is fixed once payment has completed");
            }
        }

        let before = current.status(now);
        if let Some(after) = self.derived_status(now) {
            if before.is_backward_to(after) {
                errors.push("status", format!("order cannot move from {before} to {after}"));
            }
        }

        errors.into_result()
    }

    /// Validate and produce the request payload.
    pub fn assemble(&self, now: DateTime<Utc>) -> Result<OrderFormData, CoreError> {
        let errors = self.validate(now);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let (
            Some(store_id),
            Some(product_id),
            Some(amount),
            Some(customer_id),
            Some(payment_status),
            Some(payment_email),
        ) = (
            self.store_id.clone(),
            self.product_id.clone(),
            self.amount,
            self.customer_id.clone(),
            self.payment_status,
            self.payment_email.clone(),
        )
        else {
            return Err(ValidationErrors::single("order", "incomplete order").into());
        };

        let status = self.voucher_state(now);

        Ok(OrderFormData {
            customer_id: customer_id.clone(),
            payment_details: PaymentDetails {
                payment_id: self.payment_id.clone(),
                payment_status,
                provider: self.provider,
                amount,
                payment_email,
            },
            voucher: VoucherForm {
                store_id,
                product_id,
                customer_id,
                code: self.code.clone(),
                status,
                amount,
                expiration_date: self.expiration_date,
                qr_code: self.qr_code.clone(),
                template: self.template,
                gift_details: self.gift_details.clone(),
            },
        })
    }

    /// Compare the preview code with the one the backend stored.
    ///
    /// The backend's code always wins.
    pub fn reconcile(&self, created: &Order) -> CodeReconciliation {
        if created.voucher.code == self.code {
            CodeReconciliation::Confirmed {
                code: self.code.clone(),
            }
        } else {
            warn!(
                preview = %self.code,
                authoritative = %created.voucher.code,
                "backend replaced the preview voucher code"
            );
            CodeReconciliation::Replaced {
                preview: self.code.clone(),
                authoritative: created.voucher.code.clone(),
            }
        }
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}
