pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::config;

use crate::core::{Currency, CurrencyPair, RateFetcher};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Commands that need a loaded configuration and a rate provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Watch {
        from: Option<Currency>,
        to: Option<Currency>,
    },
    Rate {
        from: Option<Currency>,
        to: Option<Currency>,
    },
    Convert {
        amount: String,
        from: Option<Currency>,
        to: Option<Currency>,
    },
}

impl AppCommand {
    fn overrides(&self) -> (Option<Currency>, Option<Currency>) {
        match self {
            AppCommand::Watch { from, to }
            | AppCommand::Rate { from, to }
            | AppCommand::Convert { from, to, .. } => (*from, *to),
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cambio starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let (from, to) = command.overrides();
    let pair = CurrencyPair::new(
        from.unwrap_or(config.source),
        to.unwrap_or(config.destination),
    )
    .context("Invalid currency selection")?;

    let provider = providers::AwesomeApiProvider::new(config.base_url())
        .context("Failed to create exchange rate client")?;
    let fetcher: Arc<dyn RateFetcher> = Arc::new(provider);

    match command {
        AppCommand::Watch { .. } => {
            cli::watch::run(fetcher, pair, config.refresh_interval(), config.theme).await
        }
        AppCommand::Rate { .. } => cli::rate::run(fetcher.as_ref(), pair).await,
        AppCommand::Convert { amount, .. } => {
            cli::convert::run(fetcher.as_ref(), pair, &amount).await
        }
    }
}
