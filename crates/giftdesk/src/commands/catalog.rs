//! Customer, store, product and user command handlers.

use tabled::Tabled;

use giftdesk_core::{Backoffice, Customer, EntityId, Product, Resource, Store, User};

use crate::cli::{CatalogArgs, CatalogCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

impl From<&Customer> for CustomerRow {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            email: c.email.clone().unwrap_or_default(),
            phone: c.phone.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct StoreRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&Store> for StoreRow {
    fn from(s: &Store) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            email: s.email.clone().unwrap_or_default(),
            address: s.address.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Store")]
    store: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            price: p.price.map(|d| d.to_string()).unwrap_or_default(),
            store: p.store_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            active: if p.is_active { "yes" } else { "no" }.into(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.map(|r| r.to_string()).unwrap_or_default(),
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn customer_detail(c: &Customer) -> String {
    [
        format!("ID:     {}", c.id),
        format!("Name:   {}", c.name),
        format!("Email:  {}", util::or_dash(c.email.as_deref())),
        format!("Phone:  {}", util::or_dash(c.phone.as_deref())),
    ]
    .join("\n")
}

fn store_detail(s: &Store) -> String {
    [
        format!("ID:       {}", s.id),
        format!("Name:     {}", s.name),
        format!("Email:    {}", util::or_dash(s.email.as_deref())),
        format!("Phone:    {}", util::or_dash(s.phone.as_deref())),
        format!("Address:  {}", util::or_dash(s.address.as_deref())),
    ]
    .join("\n")
}

fn product_detail(p: &Product) -> String {
    let mut lines = vec![
        format!("ID:      {}", p.id),
        format!("Name:    {}", p.name),
        format!(
            "Price:   {}",
            p.price.map_or_else(|| "-".into(), |d| d.to_string())
        ),
        format!("Store:   {}", util::or_dash(p.store_id.as_ref().map(EntityId::as_str))),
        format!("Active:  {}", p.is_active),
    ];
    if let Some(ref description) = p.description {
        lines.push(format!("About:   {description}"));
    }
    lines.join("\n")
}

pub(crate) fn user_detail(u: &User) -> String {
    [
        format!("ID:     {}", u.id),
        format!("Name:   {}", u.name),
        format!("Email:  {}", u.email),
        format!(
            "Role:   {}",
            u.role.map_or_else(|| "-".into(), |r| r.to_string())
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backoffice: &Backoffice,
    resource: Resource,
    args: CatalogArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        CatalogCommand::List(list) => {
            let query = util::list_query(&list);
            match resource {
                Resource::Customers => {
                    let page = backoffice.list_customers(&query).await?;
                    output::render_page(&global.output, &page, |x| CustomerRow::from(x), |c| c.id.to_string())?
                }
                Resource::Stores => {
                    let page = backoffice.list_stores(&query).await?;
                    output::render_page(&global.output, &page, |x| StoreRow::from(x), |s| s.id.to_string())?
                }
                Resource::Products => {
                    let page = backoffice.list_products(&query).await?;
                    output::render_page(&global.output, &page, |x| ProductRow::from(x), |p| p.id.to_string())?
                }
                Resource::Users => {
                    let page = backoffice.list_users(&query).await?;
                    output::render_page(&global.output, &page, |x| UserRow::from(x), |u| u.id.to_string())?
                }
                Resource::Orders | Resource::Vouchers => unreachable_resource(resource)?,
            }
        }

        CatalogCommand::Get { id } => {
            let id = EntityId::from(id);
            match resource {
                Resource::Customers => {
                    let c = backoffice.get_customer(&id).await?;
                    output::render_single(&global.output, &c, customer_detail, |c| c.id.to_string())?
                }
                Resource::Stores => {
                    let s = backoffice.get_store(&id).await?;
                    output::render_single(&global.output, &s, store_detail, |s| s.id.to_string())?
                }
                Resource::Products => {
                    let p = backoffice.get_product(&id).await?;
                    output::render_single(&global.output, &p, product_detail, |p| p.id.to_string())?
                }
                Resource::Users => {
                    let u = backoffice.get_user(&id).await?;
                    output::render_single(&global.output, &u, user_detail, |u| u.id.to_string())?
                }
                Resource::Orders | Resource::Vouchers => unreachable_resource(resource)?,
            }
        }

        CatalogCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete {resource} entry {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            backoffice.delete(resource, &EntityId::from(id.as_str())).await?;
            if !global.quiet {
                eprintln!("✓ Deleted {id} from {resource}");
            }
            return Ok(());
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn unreachable_resource(resource: Resource) -> Result<String, CliError> {
    Err(CliError::Validation {
        field: "resource".into(),
        reason: format!("{resource} has its own command group"),
    })
}
