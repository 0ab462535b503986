//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod freshness;
pub mod log;
pub mod transaction;

// Re-export main types for cleaner imports
pub use currency::{BASE_CURRENCY, CurrencyError, RateSource, RateTable, convert};
pub use freshness::{DEFAULT_TTL, NEVER_FETCHED, is_stale};
pub use transaction::{CacheRecord, Transaction, TransactionSource};
