//! Voucher command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use giftdesk_core::{Backoffice, Voucher, VoucherState};

use crate::cli::{GlobalOpts, VouchersArgs, VouchersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VoucherRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Redeemed")]
    redeemed: String,
    #[tabled(rename = "Recipient")]
    recipient: String,
}

impl VoucherRow {
    fn new(v: &Voucher, now: DateTime<Utc>, color: bool) -> Self {
        Self {
            code: v.code.clone(),
            state: output::state_label(v.effective_state(now), color),
            amount: v.amount.to_string(),
            expires: v.expiration_date.format("%Y-%m-%d").to_string(),
            redeemed: v
                .redeemed_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            recipient: v.gift_details.recipient_name.clone().unwrap_or_default(),
        }
    }
}

pub(crate) fn detail(v: &Voucher, now: DateTime<Utc>, link: &str) -> String {
    let details = &v.gift_details;
    let mut lines = vec![
        format!("Code:       {}", v.code),
        format!("State:      {}", v.effective_state(now)),
        format!("Amount:     {}", v.amount),
        format!("Expires:    {}", v.expiration_date.format("%Y-%m-%d %H:%M UTC")),
        format!(
            "Redeemed:   {}",
            v.redeemed_at
                .map_or_else(|| "-".into(), |at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        ),
        format!("Store:      {}", util::or_dash(v.store_id.as_ref().map(|id| id.as_str()))),
        format!("Product:    {}", util::or_dash(v.product_id.as_ref().map(|id| id.as_str()))),
        format!("Template:   {}", util::or_dash(v.template.map(|t| t.as_str()))),
    ];
    if !details.is_empty() {
        lines.push(format!("Recipient:  {}", util::or_dash(details.recipient_name.as_deref())));
        lines.push(format!("  Email:    {}", util::or_dash(details.recipient_email.as_deref())));
        lines.push(format!("From:       {}", util::or_dash(details.sender_name.as_deref())));
        if let Some(ref message) = details.message {
            lines.push(format!("Message:    {message}"));
        }
    }
    lines.push(format!("Link:       {link}"));
    lines.join("\n")
}

// ── Structured views ────────────────────────────────────────────────

/// Structured-output form of a voucher. `status` holds the effective state
/// at render time; the value the backend stored moves to `stored_status`.
#[derive(Serialize)]
struct VoucherView {
    #[serde(flatten)]
    voucher: Voucher,
    stored_status: VoucherState,
}

impl VoucherView {
    fn new(mut voucher: Voucher, now: DateTime<Utc>) -> Self {
        let stored_status = voucher.status;
        voucher.status = voucher.effective_state(now);
        Self {
            voucher,
            stored_status,
        }
    }

    fn voucher(&self) -> &Voucher {
        &self.voucher
    }
}

#[derive(Serialize)]
struct VoucherLink {
    code: String,
    link: String,
    qr: String,
}

#[derive(Serialize)]
struct VoucherStatus {
    code: String,
    state: VoucherState,
    redeemable: bool,
    expiration_date: DateTime<Utc>,
    redeemed_at: Option<DateTime<Utc>>,
}

impl VoucherStatus {
    fn new(v: &Voucher, now: DateTime<Utc>) -> Self {
        let state = v.effective_state(now);
        Self {
            code: v.code.clone(),
            state,
            redeemable: state == VoucherState::Active,
            expiration_date: v.expiration_date,
            redeemed_at: v.redeemed_at,
        }
    }
}

fn status_detail(s: &VoucherStatus, color: bool) -> String {
    let hint = match s.state {
        VoucherState::Active => format!(
            "can be redeemed until {}",
            s.expiration_date.format("%Y-%m-%d")
        ),
        VoucherState::Redeemed => s.redeemed_at.map_or_else(
            || "already redeemed".into(),
            |at| format!("redeemed on {}", at.format("%Y-%m-%d %H:%M UTC")),
        ),
        VoucherState::Expired => {
            format!("expired on {}", s.expiration_date.format("%Y-%m-%d"))
        }
    };
    format!("{}: {} ({hint})", s.code, output::state_label(s.state, color))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    args: VouchersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let now = Utc::now();

    match args.command {
        VouchersCommand::List(list) => {
            let page = backoffice
                .list_vouchers(&util::list_query(&list))
                .await?
                .map(|v| VoucherView::new(v, now));
            let out = output::render_page(
                &global.output,
                &page,
                |v| VoucherRow::new(v.voucher(), now, color),
                |v| v.voucher.code.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VouchersCommand::Get { code } => {
            let voucher = backoffice.get_voucher(&code).await?;
            let (link, _) = backoffice.voucher_link(&voucher);
            let out = output::render_single(
                &global.output,
                &VoucherView::new(voucher, now),
                |v| detail(v.voucher(), now, &link),
                |v| v.voucher.code.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VouchersCommand::Redeem { code } => {
            if !util::confirm(
                &format!("Redeem voucher {code}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            let voucher = backoffice.redeem(&code).await?;
            let out = output::render_single(
                &global.output,
                &VoucherView::new(voucher, now),
                |view| {
                    let v = view.voucher();
                    let at = v
                        .redeemed_at
                        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_default();
                    format!("✓ Voucher {} redeemed at {at} ({})", v.code, v.amount)
                },
                |v| v.voucher.code.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VouchersCommand::Link { code } => {
            let voucher = backoffice.get_voucher(&code).await?;
            let (link, qr) = backoffice.voucher_link(&voucher);
            let view = VoucherLink {
                code: voucher.code,
                link,
                qr,
            };
            let out = output::render_single(
                &global.output,
                &view,
                |l| format!("Link: {}\nQR:   {}", l.link, l.qr),
                |l| l.link.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VouchersCommand::Status { code } => {
            let voucher = backoffice.get_voucher(&code).await?;
            let status = VoucherStatus::new(&voucher, now);
            let out = output::render_single(
                &global.output,
                &status,
                |s| status_detail(s, color),
                |s| s.state.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;

    fn stale_active(now: DateTime<Utc>) -> Voucher {
        Voucher {
            id: None,
            code: "AB12CD34".into(),
            status: VoucherState::Active,
            expiration_date: now - Duration::days(1),
            redeemed_at: None,
            store_id: None,
            product_id: None,
            customer_id: None,
            amount: Decimal::new(25, 0),
            qr_code: None,
            template: None,
            gift_details: giftdesk_core::GiftDetails::default(),
            created_at: None,
        }
    }

    #[test]
    fn structured_view_reports_effective_state() {
        let now = Utc::now();
        let json = serde_json::to_value(VoucherView::new(stale_active(now), now)).unwrap();
        assert_eq!(json["status"], "expired");
        assert_eq!(json["stored_status"], "active");
        assert_eq!(json["code"], "AB12CD34");
    }
}
