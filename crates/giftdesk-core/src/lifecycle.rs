// ── Voucher lifecycle ──
//
// active -> redeemed | expired. Both targets are terminal. The checks
// here are a client-side shortcut only: the backend decides whether a
// redemption succeeds.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Voucher, VoucherState};

/// State computed from stored fields and `now`.
///
/// A redemption timestamp wins, then expiry; the stored status is ignored.
pub fn effective_state(voucher: &Voucher, now: DateTime<Utc>) -> VoucherState {
    if voucher.redeemed_at.is_some() {
        VoucherState::Redeemed
    } else if now > voucher.expiration_date {
        VoucherState::Expired
    } else {
        VoucherState::Active
    }
}

/// `Ok(())` when `voucher` may be sent to the redemption endpoint.
pub fn check_redeemable(voucher: &Voucher, now: DateTime<Utc>) -> Result<(), CoreError> {
    match effective_state(voucher, now) {
        VoucherState::Active => Ok(()),
        VoucherState::Redeemed => {
            warn!(code = %voucher.code, "voucher already redeemed");
            Err(CoreError::AlreadyRedeemed {
                code: voucher.code.clone(),
                redeemed_at: voucher.redeemed_at,
            })
        }
        VoucherState::Expired => {
            warn!(code = %voucher.code, "voucher expired");
            Err(CoreError::Expired {
                code: voucher.code.clone(),
                expired_at: voucher.expiration_date,
            })
        }
    }
}

/// Merge a freshly fetched view into the one already known.
///
/// A known redemption survives a fresh view that lacks one, so a voucher
/// never returns to active on the client.
pub fn reconcile(known: Option<&Voucher>, mut fresh: Voucher) -> Voucher {
    if let Some(known) = known {
        if known.redeemed_at.is_some() && fresh.redeemed_at.is_none() {
            warn!(code = %fresh.code, "fresh voucher view lost its redemption; keeping it");
            fresh.redeemed_at = known.redeemed_at;
            fresh.status = VoucherState::Redeemed;
        }
    }
    fresh
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    use super::*;
    use crate::model::GiftDetails;

    fn voucher(status: VoucherState, expires: DateTime<Utc>, redeemed: Option<DateTime<Utc>>) -> Voucher {
        Voucher {
            id: None,
            code: "AB12CD34".into(),
            status,
            expiration_date: expires,
            redeemed_at: redeemed,
            store_id: None,
            product_id: None,
            customer_id: None,
            amount: Decimal::new(25, 0),
            qr_code: None,
            template: None,
            gift_details: GiftDetails::default(),
            created_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn expiry_overrides_stale_active_status() {
        let v = voucher(VoucherState::Active, now() - Duration::days(1), None);
        assert_eq!(effective_state(&v, now()), VoucherState::Expired);
        assert_eq!(effective_state(&v, now()), effective_state(&v, now()));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let v = voucher(VoucherState::Active, now(), None);
        assert_eq!(effective_state(&v, now()), VoucherState::Active);
    }

    #[test]
    fn redemption_beats_expiry() {
        let v = voucher(
            VoucherState::Active,
            now() - Duration::days(1),
            Some(now() - Duration::days(3)),
        );
        assert_eq!(effective_state(&v, now()), VoucherState::Redeemed);
    }

    #[test]
    fn expired_voucher_is_rejected_with_its_date() {
        let expires = now() - Duration::days(1);
        let v = voucher(VoucherState::Active, expires, None);
        match check_redeemable(&v, now()).unwrap_err() {
            CoreError::Expired { code, expired_at } => {
                assert_eq!(code, "AB12CD34");
                assert_eq!(expired_at, expires);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn redeemed_voucher_is_rejected() {
        let v = voucher(VoucherState::Redeemed, now() + Duration::days(30), Some(now()));
        assert!(matches!(
            check_redeemable(&v, now()),
            Err(CoreError::AlreadyRedeemed { .. })
        ));
    }

    #[test]
    fn reconcile_never_unredeems() {
        let known = voucher(VoucherState::Redeemed, now() + Duration::days(30), Some(now()));
        let stale = voucher(VoucherState::Active, now() + Duration::days(30), None);
        let merged = reconcile(Some(&known), stale);
        assert_eq!(merged.redeemed_at, Some(now()));
        assert_eq!(merged.status, VoucherState::Redeemed);
    }
}
