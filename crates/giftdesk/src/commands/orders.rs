//! Order command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use giftdesk_core::{
    Backoffice, CodeReconciliation, EntityId, GiftDetails, Order, OrderDraft, OrderStatus,
    PaymentProvider, PaymentStatus, Resource, Template,
};

use crate::cli::{GlobalOpts, OrderFormArgs, OrdersArgs, OrdersCommand, PaymentStatusArg, ProviderArg};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl OrderRow {
    fn new(o: &Order, now: DateTime<Utc>) -> Self {
        let payment = &o.payment_details;
        Self {
            id: o.id.to_string(),
            status: o.status(now).to_string(),
            code: o.voucher.code.clone(),
            amount: payment.amount.to_string(),
            payment: match payment.provider {
                Some(provider) => format!("{} / {provider}", payment.payment_status),
                None => payment.payment_status.to_string(),
            },
            created: o
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn detail(o: &Order, now: DateTime<Utc>, link: &str) -> String {
    let payment = &o.payment_details;
    let lines = [
        format!("ID:         {}", o.id),
        format!("Status:     {}", o.status(now)),
        format!("Customer:   {}", util::or_dash(o.customer_id.as_ref().map(EntityId::as_str))),
        format!(
            "Payment:    {} via {} ({})",
            payment.payment_status,
            payment
                .provider
                .map_or_else(|| "-".into(), |p| p.to_string()),
            util::or_dash(Some(payment.payment_id.as_str()).filter(|id| !id.is_empty())),
        ),
        format!("Paid by:    {}", util::or_dash(Some(payment.payment_email.as_str()).filter(|e| !e.is_empty()))),
        format!("Amount:     {}", payment.amount),
        String::new(),
        super::vouchers::detail(&o.voucher, now, link),
    ];
    lines.join("\n")
}

/// Structured-output form of an order: the derived `status` next to the
/// order, with the embedded voucher's `status` set to its effective state.
#[derive(Serialize)]
struct OrderView {
    #[serde(flatten)]
    order: Order,
    status: OrderStatus,
}

impl OrderView {
    fn new(mut order: Order, now: DateTime<Utc>) -> Self {
        let status = order.status(now);
        order.voucher.status = order.voucher.effective_state(now);
        Self { order, status }
    }
}

// ── Form → draft ────────────────────────────────────────────────────

fn payment_status(arg: PaymentStatusArg) -> PaymentStatus {
    match arg {
        PaymentStatusArg::Pending => PaymentStatus::Pending,
        PaymentStatusArg::Completed => PaymentStatus::Completed,
        PaymentStatusArg::Failed => PaymentStatus::Failed,
    }
}

fn provider(arg: ProviderArg) -> PaymentProvider {
    match arg {
        ProviderArg::Stripe => PaymentProvider::Stripe,
        ProviderArg::Paypal => PaymentProvider::Paypal,
        ProviderArg::Mercadopago => PaymentProvider::Mercadopago,
    }
}

/// Apply the given form fields to `draft`. Store and product changes go
/// through the draft so the amount always follows the product price.
async fn apply_form(
    backoffice: &Backoffice,
    draft: &mut OrderDraft,
    form: OrderFormArgs,
    mut gift: GiftDetails,
) -> Result<(), CliError> {
    if let Some(store) = form.store {
        draft.select_store(EntityId::from(store));
    }
    if let Some(product) = form.product {
        backoffice.load_products(draft).await;
        draft.select_product(&EntityId::from(product))?;
    }
    if let Some(customer) = form.customer {
        draft.select_customer(EntityId::from(customer));
    }
    if let Some(payment_id) = form.payment_id {
        draft.set_payment_id(payment_id);
    }
    if let Some(status) = form.payment_status {
        draft.set_payment_status(payment_status(status));
    }
    if let Some(p) = form.provider {
        draft.set_provider(provider(p));
    }
    if let Some(email) = form.payment_email {
        draft.set_payment_email(email);
    }
    if let Some(ref raw) = form.expires {
        draft.set_expiration_date(util::parse_expiration(raw)?);
    }
    if let Some(ref raw) = form.template {
        let template: Template = raw.trim().parse().map_err(|_| CliError::Validation {
            field: "template".into(),
            reason: format!("expected template1..template5, got '{raw}'"),
        })?;
        draft.set_template(template);
    }

    let mut gift_changed = false;
    for (slot, value) in [
        (&mut gift.recipient_name, form.recipient_name),
        (&mut gift.recipient_email, form.recipient_email),
        (&mut gift.sender_name, form.sender_name),
        (&mut gift.message, form.message),
    ] {
        if let Some(value) = value {
            *slot = Some(value);
            gift_changed = true;
        }
    }
    if gift_changed {
        draft.set_gift_details(gift);
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    args: OrdersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let now = Utc::now();

    match args.command {
        OrdersCommand::List(list) => {
            let page = backoffice
                .list_orders(&util::list_query(&list))
                .await?
                .map(|o| OrderView::new(o, now));
            let out = output::render_page(
                &global.output,
                &page,
                |v| OrderRow::new(&v.order, now),
                |v| v.order.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OrdersCommand::Get { id } => {
            let order = backoffice.get_order(&EntityId::from(id)).await?;
            print_order(backoffice, order, global, now)
        }

        OrdersCommand::Create(form) => {
            let mut draft = OrderDraft::new(now);
            apply_form(backoffice, &mut draft, form, GiftDetails::default()).await?;

            let created = backoffice.create_order(&draft).await?;
            if let CodeReconciliation::Replaced {
                preview,
                authoritative,
            } = &created.reconciliation
            {
                if !global.quiet {
                    eprintln!("note: voucher code {authoritative} assigned (preview was {preview})");
                }
            }
            print_order(backoffice, created.order, global, now)
        }

        OrdersCommand::Update { id, form } => {
            let id = EntityId::from(id);
            let current = backoffice.get_order(&id).await?;
            let mut draft = OrderDraft::from_order(&current);
            apply_form(backoffice, &mut draft, form, current.voucher.gift_details.clone()).await?;

            let order = backoffice.update_order(&id, &draft).await?;
            if !global.quiet {
                eprintln!("✓ Order {id} updated");
            }
            print_order(backoffice, order, global, now)
        }

        OrdersCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete order {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            backoffice
                .delete(Resource::Orders, &EntityId::from(id.as_str()))
                .await?;
            if !global.quiet {
                eprintln!("✓ Order {id} deleted");
            }
            Ok(())
        }
    }
}

fn print_order(
    backoffice: &Backoffice,
    order: Order,
    global: &GlobalOpts,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let (link, _) = backoffice.voucher_link(&order.voucher);
    let out = output::render_single(
        &global.output,
        &OrderView::new(order, now),
        |v| detail(&v.order, now, &link),
        |v| v.order.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
