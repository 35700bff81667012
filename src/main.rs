use anyhow::Result;
use cambio::core::Currency;
use cambio::core::log::init_logging;
use clap::{Args, CommandFactory, Parser, Subcommand};

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

#[derive(Args)]
struct PairArgs {
    /// Source currency (USD, EUR, GBP)
    #[arg(short, long)]
    from: Option<Currency>,

    /// Destination currency (BRL, USD, EUR)
    #[arg(short, long)]
    to: Option<Currency>,
}

impl From<Commands> for cambio::AppCommand {
    fn from(cmd: Commands) -> cambio::AppCommand {
        match cmd {
            Commands::Watch(pair) => cambio::AppCommand::Watch {
                from: pair.from,
                to: pair.to,
            },
            Commands::Rate(pair) => cambio::AppCommand::Rate {
                from: pair.from,
                to: pair.to,
            },
            Commands::Convert { amount, pair } => cambio::AppCommand::Convert {
                amount,
                from: pair.from,
                to: pair.to,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Interactive converter with live rate refresh
    Watch(PairArgs),
    /// Show the current exchange rate
    Rate(PairArgs),
    /// Convert an amount at the current rate
    Convert {
        /// Amount in the source currency
        amount: String,
        #[command(flatten)]
        pair: PairArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => cambio::cli::setup::setup(),
        Some(cmd) => cambio::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
