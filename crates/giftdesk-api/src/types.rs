// Wire types for the voucher platform REST API.
//
// Response types are deliberately lenient: ids may arrive as `_id`,
// references may be populated objects, and most fields are optional.
// `giftdesk-core` converts them into validated domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ── References ───────────────────────────────────────────────────────

/// A reference to another entity: either a bare id or a populated object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefId {
    Id(String),
    Populated {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RefId {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Populated { id, .. } => id,
        }
    }
}

// ── Voucher ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftDetailsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherResponse {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub code: String,
    #[serde(default)]
    pub status: Option<String>,
    pub expiration_date: DateTime<Utc>,
    #[serde(default)]
    pub redeemed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub store_id: Option<RefId>,
    #[serde(default)]
    pub product_id: Option<RefId>,
    #[serde(default)]
    pub customer_id: Option<RefId>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub gift_details: Option<GiftDetailsPayload>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Order ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsResponse {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<RefId>,
    pub voucher: VoucherResponse,
    pub payment_details: PaymentDetailsResponse,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payment block sent with create/update order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsRequest {
    pub payment_id: String,
    pub payment_status: String,
    pub provider: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_email: String,
}

/// Voucher block sent with create/update order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRequest {
    pub store_id: String,
    pub product_id: String,
    pub customer_id: String,
    pub code: String,
    pub status: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub expiration_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    pub template: String,
    pub gift_details: GiftDetailsPayload,
}

/// Body of `POST /orders` and `PUT /orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_id: String,
    pub payment_details: PaymentDetailsRequest,
    pub voucher: VoucherRequest,
}

// ── Catalog / accounts ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "store")]
    pub store_id: Option<RefId>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn voucher_accepts_mongo_ids_and_populated_refs() {
        let raw = json!({
            "_id": "665f1c",
            "code": "AB12CD34",
            "status": "active",
            "expirationDate": "2026-12-01T00:00:00Z",
            "redeemedAt": null,
            "storeId": {"_id": "s1", "name": "Cafe Uno"},
            "productId": "p1",
            "amount": 25.5
        });
        let v: VoucherResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(v.id.as_deref(), Some("665f1c"));
        assert_eq!(v.store_id.as_ref().map(RefId::id), Some("s1"));
        assert_eq!(v.product_id.as_ref().map(RefId::id), Some("p1"));
        assert_eq!(v.amount, Some(Decimal::new(255, 1)));
        assert!(v.redeemed_at.is_none());
    }

    #[test]
    fn order_request_sends_amounts_as_numbers() {
        let req = PaymentDetailsRequest {
            payment_id: "pay_1".into(),
            payment_status: "completed".into(),
            provider: "stripe".into(),
            amount: Decimal::new(4000, 2),
            payment_email: "buyer@example.com".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["amount"], json!(40.0));
        assert_eq!(value["paymentStatus"], json!("completed"));
    }

    #[test]
    fn product_accepts_store_alias() {
        let raw = json!({"_id": "p9", "name": "Massage", "price": "60.00", "store": "s2"});
        let p: ProductResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(p.price, Some(Decimal::new(6000, 2)));
        assert_eq!(p.store_id.unwrap().id(), "s2");
    }
}
