// ── Voucher domain types ──

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::entity_id::EntityId;
use super::template::Template;

/// Lifecycle state of a voucher.
///
/// Used both for the status the backend stores and for the effective
/// state computed by [`crate::lifecycle::effective_state`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum VoucherState {
    Active,
    Redeemed,
    Expired,
}

impl VoucherState {
    /// Redeemed and expired vouchers never become active again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Redeemed | Self::Expired)
    }
}

/// Personal message block printed on the voucher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftDetails {
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub sender_name: Option<String>,
    pub message: Option<String>,
}

impl GiftDetails {
    pub fn is_empty(&self) -> bool {
        self.recipient_name.is_none()
            && self.recipient_email.is_none()
            && self.sender_name.is_none()
            && self.message.is_none()
    }
}

/// A redeemable gift voucher.
///
/// `status` is whatever the backend last stored and may be stale; use
/// [`Voucher::effective_state`] for anything that decides redeemability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: Option<EntityId>,
    pub code: String,
    pub status: VoucherState,
    pub expiration_date: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub store_id: Option<EntityId>,
    pub product_id: Option<EntityId>,
    pub customer_id: Option<EntityId>,
    pub amount: Decimal,
    pub qr_code: Option<String>,
    pub template: Option<Template>,
    pub gift_details: GiftDetails,
    pub created_at: Option<DateTime<Utc>>,
}

impl Voucher {
    pub fn effective_state(&self, now: DateTime<Utc>) -> VoucherState {
        crate::lifecycle::effective_state(self, now)
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }
}
