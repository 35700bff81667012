//! Supported currencies and the pairs they can form

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Brl,
}

/// Currencies that can be converted from.
pub const SOURCE_CURRENCIES: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Gbp];

/// Currencies that can be converted to.
pub const DESTINATION_CURRENCIES: [Currency; 3] = [Currency::Brl, Currency::Usd, Currency::Eur];

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Brl => "BRL",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Brl => "R$",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "Pound Sterling",
            Currency::Brl => "Brazilian Real",
        }
    }

    pub fn is_source(&self) -> bool {
        SOURCE_CURRENCIES.contains(self)
    }

    pub fn is_destination(&self) -> bool {
        DESTINATION_CURRENCIES.contains(self)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "BRL" => Ok(Currency::Brl),
            _ => Err(anyhow!("Unsupported currency: {}", s)),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> String {
        currency.code().to_string()
    }
}

/// A source/destination pair drawn from the supported sets.
///
/// Both sides may name the same currency; the quote service decides what
/// that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    source: Currency,
    destination: Currency,
}

impl CurrencyPair {
    pub fn new(source: Currency, destination: Currency) -> Result<Self> {
        if !source.is_source() {
            return Err(anyhow!("{} is not a supported source currency", source));
        }
        if !destination.is_destination() {
            return Err(anyhow!(
                "{} is not a supported destination currency",
                destination
            ));
        }
        Ok(Self {
            source,
            destination,
        })
    }

    pub fn source(&self) -> Currency {
        self.source
    }

    pub fn destination(&self) -> Currency {
        self.destination
    }

    /// Key under which the quote service reports this pair, e.g. `USDBRL`.
    pub fn quote_key(&self) -> String {
        format!("{}{}", self.source, self.destination)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            source: Currency::Usd,
            destination: Currency::Brl,
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.source, self.destination)
    }
}
