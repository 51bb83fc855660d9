//! Clap derive structures for the `giftdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// giftdesk -- back office for gift voucher stores
#[derive(Debug, Parser)]
#[command(
    name = "giftdesk",
    version,
    about = "Manage gift vouchers, orders and catalog from the command line",
    long_about = "Back-office CLI for a gift voucher store.\n\n\
        Sell vouchers through orders, redeem them at the counter, share\n\
        redemption links, and browse customers, stores, products and users.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "GIFTDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// REST API base URL (overrides profile)
    #[arg(long, env = "GIFTDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Public app URL used in redemption links (overrides profile)
    #[arg(long, env = "GIFTDESK_APP_URL", global = true)]
    pub app_url: Option<String>,

    /// API key sent as `x-api-key`
    #[arg(long, env = "GIFTDESK_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token
    #[arg(long, env = "GIFTDESK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GIFTDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Diagnostic log format on stderr
    #[arg(
        long,
        env = "GIFTDESK_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, env = "GIFTDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// Single-line compact records
    Compact,
    /// Newline-delimited JSON records
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up, redeem and share vouchers
    #[command(alias = "v")]
    Vouchers(VouchersArgs),

    /// Sell and manage orders
    #[command(alias = "o")]
    Orders(OrdersArgs),

    /// Browse customers
    Customers(CatalogArgs),

    /// Browse stores
    Stores(CatalogArgs),

    /// Browse products
    Products(CatalogArgs),

    /// Browse back-office users
    Users(CatalogArgs),

    /// Show the user behind the configured credentials
    Whoami,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Shared pagination, sorting and filtering arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Items per page
    #[arg(long, short = 'l', default_value = "10", value_parser = clap::value_parser!(u64).range(1..=100))]
    pub limit: u64,

    /// Sort expression passed to the backend (e.g. "-createdAt")
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Filter as key=value, repeatable (e.g. -f storeId=abc)
    #[arg(long, short = 'f', value_parser = parse_key_val)]
    pub filter: Vec<(String, String)>,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.trim().to_owned(), value.trim().to_owned()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VOUCHERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VouchersArgs {
    #[command(subcommand)]
    pub command: VouchersCommand,
}

#[derive(Debug, Subcommand)]
pub enum VouchersCommand {
    /// List vouchers
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a voucher by code
    Get {
        /// Voucher code
        code: String,
    },

    /// Redeem a voucher (cannot be undone)
    Redeem {
        /// Voucher code
        code: String,
    },

    /// Print the public redemption link and QR image URL
    Link {
        /// Voucher code
        code: String,
    },

    /// Show whether a voucher can still be redeemed
    Status {
        /// Voucher code
        code: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ORDERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// List orders
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show an order
    Get {
        /// Order ID
        id: String,
    },

    /// Sell a voucher: create an order for a store product
    Create(OrderFormArgs),

    /// Edit an existing order
    Update {
        /// Order ID
        id: String,

        #[command(flatten)]
        form: OrderFormArgs,
    },

    /// Delete an order
    #[command(alias = "rm")]
    Delete {
        /// Order ID
        id: String,
    },
}

/// Order fields. On update, only the given fields change.
#[derive(Debug, Args)]
pub struct OrderFormArgs {
    /// Store ID
    #[arg(long)]
    pub store: Option<String>,

    /// Product ID (must belong to the store)
    #[arg(long)]
    pub product: Option<String>,

    /// Customer ID
    #[arg(long)]
    pub customer: Option<String>,

    /// Payment ID from the provider
    #[arg(long)]
    pub payment_id: Option<String>,

    /// Payment status
    #[arg(long)]
    pub payment_status: Option<PaymentStatusArg>,

    /// Payment provider
    #[arg(long)]
    pub provider: Option<ProviderArg>,

    /// Payer email
    #[arg(long)]
    pub payment_email: Option<String>,

    /// Voucher expiration (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub expires: Option<String>,

    /// Voucher template (template1..template5)
    #[arg(long)]
    pub template: Option<String>,

    /// Gift recipient name
    #[arg(long)]
    pub recipient_name: Option<String>,

    /// Gift recipient email
    #[arg(long)]
    pub recipient_email: Option<String>,

    /// Gift sender name
    #[arg(long)]
    pub sender_name: Option<String>,

    /// Gift message
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentStatusArg {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProviderArg {
    Stripe,
    Paypal,
    Mercadopago,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CATALOG (customers, stores, products, users)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List entries
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one entry
    Get {
        /// Entry ID
        id: String,
    },

    /// Delete one entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set the default profile
    SetDefault {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token (or API key) in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,

        /// Store the API key instead of the bearer token
        #[arg(long)]
        api_key: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
