//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`health`].

pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::GatewayError;

pub async fn dispatch(cli: Cli) -> Result<(), GatewayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  fetchgate v{version} \u{2014} HTTP forwarding gateway\n\n  \
         No command provided. To get started:\n\n    \
         fetchgate run --mode development   Start on :3000 without auth\n    \
         fetchgate run                      Start in production (needs ACCESS_KEY)\n    \
         fetchgate health                   Check a running instance\n    \
         fetchgate --help                   See all commands and options\n"
    );
}
