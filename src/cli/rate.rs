use super::ui;
use crate::core::{ConversionState, CurrencyPair, RateFetcher, RateStatus};
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Fetches the pair once and returns the resulting state.
pub(crate) async fn fetch_once(
    fetcher: &dyn RateFetcher,
    pair: CurrencyPair,
) -> Result<ConversionState> {
    let mut state = ConversionState::new(pair);
    let seq = state.begin_fetch();

    let pb = ui::new_spinner(&format!("Fetching {pair} exchange rate..."));
    let result = fetcher.fetch(&pair).await;
    pb.finish_and_clear();

    state.apply_fetch(seq, result);
    if let RateStatus::Error(message) = state.status() {
        bail!("{}", message);
    }
    Ok(state)
}

pub fn display_as_table(state: &ConversionState) -> String {
    let pair = state.pair();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell(&format!("Rate ({})", pair.destination())),
        ui::header_cell("Last updated"),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} -> {}", pair.source(), pair.destination())),
        ui::value_cell(&state.display_rate()),
        ui::value_cell(&state.display_updated_at()),
    ]);
    table.to_string()
}

pub async fn run(fetcher: &dyn RateFetcher, pair: CurrencyPair) -> Result<()> {
    let state = fetch_once(fetcher, pair).await?;
    println!("{}\n", ui::rate_line(&state));
    println!("{}", display_as_table(&state));
    Ok(())
}
