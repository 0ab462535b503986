//! Currency conversion abstractions and the pivot conversion engine.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The pivot currency all cross-rates are routed through.
pub const BASE_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurrencyError {
    /// The rate table carries no entry for this currency code.
    #[error("no exchange rate for currency '{0}'")]
    UnknownCurrency(String),
    /// No rate table has been fetched successfully yet.
    #[error("exchange rates unavailable")]
    RatesUnavailable,
}

/// Exchange rates pinned to a base currency.
///
/// `rates` maps a currency code to its multiplier relative to `base`.
/// `rates[base]` is 1 by construction. Supporting a new currency means
/// adding an entry, nothing structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    /// Unix epoch milliseconds of the fetch that produced this table.
    pub fetched_at: i64,
}

impl RateTable {
    pub fn new(base: &str, mut rates: HashMap<String, f64>, fetched_at: i64) -> Self {
        rates.insert(base.to_string(), 1.0);
        Self {
            base: base.to_string(),
            rates,
            fetched_at,
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }
}

/// Converts `amount` between two currencies through the table's base.
///
/// Identity conversions return `amount` unchanged without consulting the
/// table. For anything else a missing entry is an `UnknownCurrency` error;
/// the conversion never manufactures a NaN out of an absent rate.
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    table: &RateTable,
) -> Result<f64, CurrencyError> {
    if from == to {
        return Ok(amount);
    }

    let in_base = if from == table.base {
        amount
    } else {
        let rate = table
            .rate(from)
            .ok_or_else(|| CurrencyError::UnknownCurrency(from.to_string()))?;
        amount / rate
    };

    if to == table.base {
        Ok(in_base)
    } else {
        let rate = table
            .rate(to)
            .ok_or_else(|| CurrencyError::UnknownCurrency(to.to_string()))?;
        Ok(in_base * rate)
    }
}

/// Asynchronous supplier of a rate table pinned to [`BASE_CURRENCY`].
///
/// Callers must not assume a table exists before the first fetch resolves.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_table(&self) -> Result<RateTable>;
}
