mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

use clap::Parser;

use giftdesk_core::Backoffice;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(cli.global.verbose, cli.global.quiet, cli.global.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "giftdesk", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let service_config = config::build_service_config(&cli.global)?;
            let backoffice = Backoffice::new(service_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &backoffice, &cli.global).await
        }
    }
}
