use anyhow::Result;
use clap::{Parser, Subcommand};
use fxdash::core::log::init_logging;

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

impl From<Commands> for fxdash::AppCommand {
    fn from(cmd: Commands) -> fxdash::AppCommand {
        match cmd {
            Commands::Dashboard => fxdash::AppCommand::Dashboard,
            Commands::Rates => fxdash::AppCommand::Rates,
            Commands::Search { code } => fxdash::AppCommand::Search { code },
            Commands::Convert { amount, code } => fxdash::AppCommand::Convert { amount, code },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Open the interactive dashboard (default)
    Dashboard,
    /// List rates for the tracked currencies
    Rates,
    /// Look up the rate for a currency code
    Search {
        /// Currency code, e.g. USD
        code: String,
    },
    /// Convert an amount in the base currency
    Convert {
        /// Amount in the base currency
        amount: String,
        /// Target currency code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxdash::cli::setup::setup(),
        Some(cmd) => fxdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            fxdash::run_command(fxdash::AppCommand::Dashboard, cli.config_path.as_deref()).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
