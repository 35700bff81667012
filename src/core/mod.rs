//! Core business logic: currencies, rate fetching and the conversion state machine

pub mod config;
pub mod controller;
pub mod conversion;
pub mod currency;
pub mod log;
pub mod rate;
pub mod refresh;
pub mod state;

// Re-export main types for cleaner imports
pub use controller::{Controller, Event, UserAction};
pub use conversion::ConversionError;
pub use currency::{Currency, CurrencyPair};
pub use rate::{FetchError, RateFetcher, RateSnapshot};
pub use state::{ConversionState, FETCH_ERROR_MESSAGE, RateStatus};
