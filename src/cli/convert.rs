use super::rate::fetch_once;
use super::ui;
use crate::core::config::Theme;
use crate::core::{ConversionState, CurrencyPair, RateFetcher};
use anyhow::Result;
use console::style;

/// Fetches the current rate once and converts `amount` with it.
pub async fn fetch_and_convert(
    fetcher: &dyn RateFetcher,
    pair: CurrencyPair,
    amount: &str,
) -> Result<ConversionState> {
    let mut state = fetch_once(fetcher, pair).await?;
    state.set_amount(amount);
    state.convert()?;
    Ok(state)
}

pub async fn run(fetcher: &dyn RateFetcher, pair: CurrencyPair, amount: &str) -> Result<()> {
    let state = fetch_and_convert(fetcher, pair, amount).await?;
    let source = pair.source();
    let destination = pair.destination();
    let converted = state.converted().unwrap_or_default();

    println!(
        "{}{} {} = {} {}",
        source.symbol(),
        state.amount(),
        source,
        style(format!("{}{}", destination.symbol(), converted))
            .green()
            .bold(),
        destination
    );
    println!(
        "{}",
        ui::style_text(
            &format!("{} (updated {})", ui::rate_line(&state), state.display_updated_at()),
            ui::StyleType::Subtle,
            Theme::default(),
        )
    );
    Ok(())
}
