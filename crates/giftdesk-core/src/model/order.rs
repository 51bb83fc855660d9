// ── Order domain types ──

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::entity_id::EntityId;
use super::voucher::{Voucher, VoucherState};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Paypal,
    Mercadopago,
}

/// Payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub payment_id: String,
    pub payment_status: PaymentStatus,
    pub provider: Option<PaymentProvider>,
    pub amount: Decimal,
    pub payment_email: String,
}

/// Order status, derived from payment and voucher state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Failed,
    Active,
    Redeemed,
    Expired,
}

impl OrderStatus {
    /// Derive the status from the payment and the voucher's effective state.
    pub fn derive(payment: PaymentStatus, voucher: VoucherState) -> Self {
        match payment {
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Completed => match voucher {
                VoucherState::Active => Self::Active,
                VoucherState::Redeemed => Self::Redeemed,
                VoucherState::Expired => Self::Expired,
            },
        }
    }

    /// Whether moving from `self` to `next` would undo a settled state.
    pub fn is_backward_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Redeemed | Self::Expired, Self::Active | Self::Pending | Self::Failed)
                | (Self::Active, Self::Pending | Self::Failed)
        )
    }
}

/// A customer's purchase: exactly one voucher and one payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: EntityId,
    pub customer_id: Option<EntityId>,
    pub voucher: Voucher,
    pub payment_details: PaymentDetails,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn status(&self, now: DateTime<Utc>) -> OrderStatus {
        OrderStatus::derive(
            self.payment_details.payment_status,
            self.voucher.effective_state(now),
        )
    }
}
