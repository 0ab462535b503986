use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use finsync::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for finsync::AppCommand {
    fn from(cmd: Commands) -> finsync::AppCommand {
        match cmd {
            Commands::Show { user_id } => finsync::AppCommand::Show { user_id },
            Commands::Refresh { user_ids } => finsync::AppCommand::Refresh { user_ids },
            Commands::Rates => finsync::AppCommand::Rates,
            Commands::Convert { amount, from, to } => {
                finsync::AppCommand::Convert { amount, from, to }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display a user's transactions
    Show {
        /// User identifier
        user_id: String,
    },
    /// Force-refresh transactions for one or more users
    Refresh {
        /// User identifiers
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    /// Display the active exchange-rate table
    Rates,
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => finsync::cli::setup::setup(),
        Some(cmd) => finsync::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
