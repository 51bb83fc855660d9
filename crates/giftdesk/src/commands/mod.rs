//! Command dispatch: bridges CLI args -> Backoffice calls -> output formatting.

pub mod catalog;
pub mod config_cmd;
pub mod orders;
pub mod util;
pub mod vouchers;

use giftdesk_core::{Backoffice, Resource};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    backoffice: &Backoffice,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Vouchers(args) => vouchers::handle(backoffice, args, global).await,
        Command::Orders(args) => orders::handle(backoffice, args, global).await,
        Command::Customers(args) => {
            catalog::handle(backoffice, Resource::Customers, args, global).await
        }
        Command::Stores(args) => catalog::handle(backoffice, Resource::Stores, args, global).await,
        Command::Products(args) => {
            catalog::handle(backoffice, Resource::Products, args, global).await
        }
        Command::Users(args) => catalog::handle(backoffice, Resource::Users, args, global).await,
        Command::Whoami => {
            let user = backoffice.current_user().await?;
            let out = output::render_single(&global.output, &user, catalog::user_detail, |u| {
                u.email.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a backend".into(),
        }),
    }
}
