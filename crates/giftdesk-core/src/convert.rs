// ── API-to-domain type conversions ──
//
// Bridges raw `giftdesk_api::types` responses into the domain model.
// Enum-valued strings are parsed once here; an unknown value is a
// malformed response, except for display-only fields (template, role,
// provider) which degrade to `None`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use giftdesk_api::types::{
    CustomerResponse, GiftDetailsPayload, OrderResponse, PaymentDetailsResponse, ProductResponse,
    RefId, StoreResponse, UserResponse, VoucherResponse,
};

use crate::error::CoreError;
use crate::model::{
    Customer, EntityId, GiftDetails, Order, PaymentDetails, PaymentProvider, PaymentStatus,
    Product, Store, Template, User, UserRole, Voucher, VoucherState,
};

// ── Helpers ────────────────────────────────────────────────────────

fn payload_of<T: Serialize>(raw: &T) -> Value {
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

fn ref_id(raw: Option<&RefId>) -> Option<EntityId> {
    raw.map(|r| EntityId::from(r.id()))
}

/// Parse an optional display-only enum, logging and dropping unknown values.
fn lenient<T: FromStr>(field: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw?;
    match T::from_str(raw) {
        Ok(v) => Some(v),
        Err(_) => {
            debug!(field, value = raw, "ignoring unrecognized value");
            None
        }
    }
}

// ── Voucher ────────────────────────────────────────────────────────

impl From<GiftDetailsPayload> for GiftDetails {
    fn from(raw: GiftDetailsPayload) -> Self {
        Self {
            recipient_name: raw.recipient_name,
            recipient_email: raw.recipient_email,
            sender_name: raw.sender_name,
            message: raw.message,
        }
    }
}

impl From<&GiftDetails> for GiftDetailsPayload {
    fn from(details: &GiftDetails) -> Self {
        Self {
            recipient_name: details.recipient_name.clone(),
            recipient_email: details.recipient_email.clone(),
            sender_name: details.sender_name.clone(),
            message: details.message.clone(),
        }
    }
}

impl TryFrom<VoucherResponse> for Voucher {
    type Error = CoreError;

    fn try_from(raw: VoucherResponse) -> Result<Self, Self::Error> {
        let stored = match raw.status.as_deref() {
            None => VoucherState::Active,
            Some(s) => VoucherState::from_str(s).map_err(|_| {
                CoreError::malformed(format!("unknown voucher status `{s}`"), payload_of(&raw))
            })?,
        };
        // A redemption timestamp is authoritative over the stored status.
        let status = if raw.redeemed_at.is_some() {
            VoucherState::Redeemed
        } else if stored == VoucherState::Redeemed {
            debug!(code = %raw.code, "voucher marked redeemed without redeemedAt");
            VoucherState::Active
        } else {
            stored
        };

        Ok(Self {
            id: raw.id.map(EntityId::from),
            status,
            expiration_date: raw.expiration_date,
            redeemed_at: raw.redeemed_at,
            store_id: ref_id(raw.store_id.as_ref()),
            product_id: ref_id(raw.product_id.as_ref()),
            customer_id: ref_id(raw.customer_id.as_ref()),
            amount: raw.amount.unwrap_or(Decimal::ZERO),
            qr_code: raw.qr_code.filter(|q| !q.trim().is_empty()),
            template: lenient::<Template>("template", raw.template.as_deref()),
            gift_details: raw.gift_details.map(GiftDetails::from).unwrap_or_default(),
            created_at: raw.created_at,
            code: raw.code,
        })
    }
}

// ── Order ──────────────────────────────────────────────────────────

impl TryFrom<PaymentDetailsResponse> for PaymentDetails {
    type Error = CoreError;

    fn try_from(raw: PaymentDetailsResponse) -> Result<Self, Self::Error> {
        let payment_status = match raw.payment_status.as_deref() {
            None => PaymentStatus::Pending,
            Some(s) => PaymentStatus::from_str(s).map_err(|_| {
                CoreError::malformed(format!("unknown payment status `{s}`"), payload_of(&raw))
            })?,
        };

        Ok(Self {
            payment_status,
            provider: lenient::<PaymentProvider>("provider", raw.provider.as_deref()),
            payment_id: raw.payment_id.unwrap_or_default(),
            amount: raw.amount.unwrap_or(Decimal::ZERO),
            payment_email: raw.payment_email.unwrap_or_default(),
        })
    }
}

impl TryFrom<OrderResponse> for Order {
    type Error = CoreError;

    fn try_from(raw: OrderResponse) -> Result<Self, Self::Error> {
        let customer_id = ref_id(raw.customer_id.as_ref());
        let mut voucher = Voucher::try_from(raw.voucher)?;
        if voucher.customer_id.is_none() {
            voucher.customer_id.clone_from(&customer_id);
        }

        Ok(Self {
            id: EntityId::from(raw.id),
            customer_id,
            voucher,
            payment_details: PaymentDetails::try_from(raw.payment_details)?,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

// ── Catalog / accounts ─────────────────────────────────────────────

impl TryFrom<StoreResponse> for Store {
    type Error = CoreError;

    fn try_from(raw: StoreResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EntityId::from(raw.id),
            name: raw.name,
            email: raw.email,
            phone: raw.phone,
            address: raw.address,
            logo: raw.logo,
        })
    }
}

impl TryFrom<ProductResponse> for Product {
    type Error = CoreError;

    fn try_from(raw: ProductResponse) -> Result<Self, Self::Error> {
        if raw.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(CoreError::malformed(
                format!("product {} has a negative price", raw.id),
                payload_of(&raw),
            ));
        }
        Ok(Self {
            id: EntityId::from(raw.id),
            name: raw.name,
            description: raw.description,
            price: raw.price,
            store_id: ref_id(raw.store_id.as_ref()),
            is_active: raw.is_active.unwrap_or(true),
        })
    }
}

impl TryFrom<CustomerResponse> for Customer {
    type Error = CoreError;

    fn try_from(raw: CustomerResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EntityId::from(raw.id),
            name: raw.name.unwrap_or_default(),
            email: raw.email,
            phone: raw.phone,
        })
    }
}

impl TryFrom<UserResponse> for User {
    type Error = CoreError;

    fn try_from(raw: UserResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EntityId::from(raw.id),
            name: raw.name.unwrap_or_default(),
            role: lenient::<UserRole>("role", raw.role.as_deref()),
            email: raw.email,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn voucher(raw: Value) -> Result<Voucher, CoreError> {
        Voucher::try_from(serde_json::from_value::<VoucherResponse>(raw).unwrap())
    }

    #[test]
    fn redeemed_at_forces_redeemed_status() {
        let v = voucher(json!({
            "code": "AB12CD34",
            "status": "active",
            "expirationDate": "2030-01-01T00:00:00Z",
            "redeemedAt": "2026-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(v.status, VoucherState::Redeemed);
    }

    #[test]
    fn redeemed_without_timestamp_is_not_trusted() {
        let v = voucher(json!({
            "code": "AB12CD34",
            "status": "redeemed",
            "expirationDate": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(v.status, VoucherState::Active);
        assert!(v.redeemed_at.is_none());
    }

    #[test]
    fn unknown_status_is_malformed() {
        let err = voucher(json!({
            "code": "AB12CD34",
            "status": "frozen",
            "expirationDate": "2030-01-01T00:00:00Z"
        }))
        .unwrap_err();
        assert!(matches!(err, CoreError::MalformedResponse { ref payload, .. } if payload["code"] == "AB12CD34"));
    }

    #[test]
    fn template_is_normalized_and_unknown_dropped() {
        let v = voucher(json!({
            "code": "X", "expirationDate": "2030-01-01T00:00:00Z", "template": "template4"
        }))
        .unwrap();
        assert_eq!(v.template, Some(Template::Template4));

        let v = voucher(json!({
            "code": "X", "expirationDate": "2030-01-01T00:00:00Z", "template": "retro"
        }))
        .unwrap();
        assert_eq!(v.template, None);
    }

    #[test]
    fn order_voucher_inherits_customer() {
        let raw: OrderResponse = serde_json::from_value(json!({
            "_id": "o1",
            "customerId": {"_id": "c7", "name": "Rosa"},
            "voucher": {"code": "AB12CD34", "expirationDate": "2030-01-01T00:00:00Z"},
            "paymentDetails": {"paymentStatus": "completed", "provider": "paypal", "amount": "12.50"}
        }))
        .unwrap();
        let order = Order::try_from(raw).unwrap();
        assert_eq!(order.voucher.customer_id, Some(EntityId::from("c7")));
        assert_eq!(order.payment_details.provider, Some(PaymentProvider::Paypal));
        assert_eq!(order.payment_details.amount, Decimal::new(1250, 2));
    }

    #[test]
    fn user_role_parses_snake_case() {
        let raw: UserResponse = serde_json::from_value(json!({
            "_id": "u1", "email": "m@example.com", "role": "store_manager"
        }))
        .unwrap();
        assert_eq!(User::try_from(raw).unwrap().role, Some(UserRole::StoreManager));
    }
}
