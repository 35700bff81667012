//! Exchange rate snapshots and the fetcher abstraction

use crate::core::currency::CurrencyPair;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

/// The latest known bid rate for a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub pair: CurrencyPair,
    pub bid_rate: f64,
    pub fetched_at: DateTime<Local>,
}

impl RateSnapshot {
    pub fn new(pair: CurrencyPair, bid_rate: f64, fetched_at: DateTime<Local>) -> Self {
        Self {
            pair,
            bid_rate,
            fetched_at,
        }
    }

    /// Rate as shown to the user, four decimals.
    pub fn display_rate(&self) -> String {
        format!("{:.4}", self.bid_rate)
    }

    /// Completion time in local `HH:MM:SS`.
    pub fn display_time(&self) -> String {
        self.fetched_at.format("%H:%M:%S").to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, DNS or non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body did not carry a usable rate for the requested pair.
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::UnexpectedResponseShape(_) => "unexpected_response_shape",
        }
    }
}

#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Issues exactly one request for the pair's current bid rate.
    async fn fetch(&self, pair: &CurrencyPair) -> Result<RateSnapshot, FetchError>;
}
