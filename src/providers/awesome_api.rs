use crate::core::currency::CurrencyPair;
use crate::core::rate::{FetchError, RateFetcher, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

pub const DEFAULT_BASE_URL: &str = "https://economia.awesomeapi.com.br";

// AwesomeApiProvider implementation for RateFetcher
pub struct AwesomeApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cambio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(AwesomeApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    bid: String,
}

fn parse_quote(text: &str, pair: &CurrencyPair) -> Result<f64, FetchError> {
    let key = pair.quote_key();
    let body: Value = serde_json::from_str(text).map_err(|e| {
        FetchError::UnexpectedResponseShape(format!("Failed to parse JSON response for {key}: {e}"))
    })?;

    let entry = body.get(&key).ok_or_else(|| {
        FetchError::UnexpectedResponseShape(format!("No quote found for key: {key}"))
    })?;
    let quote = QuoteEntry::deserialize(entry).map_err(|e| {
        FetchError::UnexpectedResponseShape(format!("Invalid quote for {key}: {e}"))
    })?;

    let bid: f64 = quote.bid.trim().parse().map_err(|_| {
        FetchError::UnexpectedResponseShape(format!("Invalid bid for {key}: {}", quote.bid))
    })?;
    if !bid.is_finite() || bid <= 0.0 {
        return Err(FetchError::UnexpectedResponseShape(format!(
            "Non-positive bid for {key}: {bid}"
        )));
    }
    Ok(bid)
}

#[async_trait]
impl RateFetcher for AwesomeApiProvider {
    #[instrument(
        name = "AwesomeApiFetch",
        skip(self),
        fields(pair = %pair)
    )]
    async fn fetch(&self, pair: &CurrencyPair) -> Result<RateSnapshot, FetchError> {
        let url = format!(
            "{}/json/last/{}-{}",
            self.base_url,
            pair.source(),
            pair.destination()
        );
        debug!("Requesting exchange rate from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            FetchError::Transport(format!("Request error: {e} for currency pair: {pair}"))
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                pair
            )));
        }

        let text = response.text().await.map_err(|e| {
            FetchError::Transport(format!("Failed to read response for {pair}: {e}"))
        })?;

        let bid = match parse_quote(&text, pair) {
            Ok(bid) => bid,
            Err(e) => {
                error!(error = %e, response = %text, "Unexpected exchange rate response");
                return Err(e);
            }
        };

        Ok(RateSnapshot::new(*pair, bid, Local::now()))
    }
}
