//! The rate-refresh and conversion state machine
//!
//! `ConversionState` owns the selected pair, the latest snapshot and the
//! typed amount. Fetches are tagged with a sequence number when issued so a
//! completion that arrives after a newer one, or after the pair changed,
//! never overwrites fresher data.

use crate::core::conversion::{self, ConversionError};
use crate::core::currency::{Currency, CurrencyPair};
use crate::core::rate::{FetchError, RateSnapshot};
use anyhow::Result;
use tracing::{debug, warn};

/// Message shown for every fetch failure, whatever its cause.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch exchange rate.";

#[derive(Debug, Clone, PartialEq)]
pub enum RateStatus {
    Loading,
    Ready(RateSnapshot),
    Error(String),
}

#[derive(Debug)]
pub struct ConversionState {
    pair: CurrencyPair,
    status: RateStatus,
    amount: String,
    converted: Option<String>,
    next_seq: u64,
    // Completions issued before this sequence belong to a previous pair.
    accept_from: u64,
    last_applied: Option<u64>,
}

impl ConversionState {
    pub fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            status: RateStatus::Loading,
            amount: String::new(),
            converted: None,
            next_seq: 0,
            accept_from: 0,
            last_applied: None,
        }
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    pub fn status(&self) -> &RateStatus {
        &self.status
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Last successfully converted value, if any.
    pub fn converted(&self) -> Option<&str> {
        self.converted.as_deref()
    }

    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        match &self.status {
            RateStatus::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Allocates the sequence number for a fetch about to be issued.
    pub fn begin_fetch(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Applies a fetch completion. Returns `false` when it was discarded as stale.
    pub fn apply_fetch(&mut self, seq: u64, result: Result<RateSnapshot, FetchError>) -> bool {
        if seq < self.accept_from || self.last_applied.is_some_and(|last| seq <= last) {
            debug!(seq, pair = %self.pair, "Discarding stale fetch result");
            return false;
        }

        match result {
            Ok(snapshot) if snapshot.pair == self.pair => {
                debug!(seq, rate = snapshot.bid_rate, "Exchange rate updated");
                self.status = RateStatus::Ready(snapshot);
            }
            Ok(snapshot) => {
                debug!(seq, got = %snapshot.pair, want = %self.pair, "Discarding result for another pair");
                return false;
            }
            Err(e) => {
                warn!(seq, pair = %self.pair, kind = e.kind(), error = %e, "Failed to fetch exchange rate");
                self.status = RateStatus::Error(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        self.last_applied = Some(seq);
        true
    }

    /// Switches to a new pair. Returns `false` if the pair is unchanged.
    pub fn select_pair(&mut self, pair: CurrencyPair) -> bool {
        if pair == self.pair {
            return false;
        }
        debug!(from = %self.pair, to = %pair, "Currency pair changed");
        self.pair = pair;
        self.status = RateStatus::Loading;
        self.converted = None;
        self.accept_from = self.next_seq;
        true
    }

    pub fn select_source(&mut self, source: Currency) -> Result<bool> {
        let pair = CurrencyPair::new(source, self.pair.destination())?;
        Ok(self.select_pair(pair))
    }

    pub fn select_destination(&mut self, destination: Currency) -> Result<bool> {
        let pair = CurrencyPair::new(self.pair.source(), destination)?;
        Ok(self.select_pair(pair))
    }

    /// Stores the typed amount, dropping characters an amount cannot hold.
    pub fn set_amount(&mut self, text: &str) {
        self.amount = conversion::sanitize_amount(text);
    }

    /// Converts the stored amount at the current rate.
    ///
    /// On error the previously displayed value is left untouched.
    pub fn convert(&mut self) -> Result<String, ConversionError> {
        let snapshot = self.snapshot().ok_or(ConversionError::NoRate)?;
        let value = conversion::convert(&self.amount, snapshot)?;
        self.converted = Some(value.clone());
        Ok(value)
    }

    /// Rate line value: four decimals, or `N/A` without a snapshot.
    pub fn display_rate(&self) -> String {
        self.snapshot()
            .map_or("N/A".to_string(), |s| s.display_rate())
    }

    pub fn display_updated_at(&self) -> String {
        self.snapshot()
            .map_or("N/A".to_string(), |s| s.display_time())
    }
}
