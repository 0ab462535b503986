pub mod cli;
pub mod core;
pub mod providers;
pub mod rates;
pub mod store;
pub mod transactions;

use crate::core::config::AppConfig;
use crate::core::currency::RateSource;
use crate::providers::http_rates::HttpRateSource;
use crate::providers::http_transactions::HttpTransactionSource;
use crate::providers::pinned::PinnedRates;
use crate::rates::RateService;
use crate::store::{SessionStore, SnapshotStore};
use crate::transactions::TransactionCache;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Display a user's cached transactions, refreshing if stale.
    Show { user_id: String },
    /// Force-refresh one or more users, bypassing the TTL gate.
    Refresh { user_ids: Vec<String> },
    /// Display the active exchange-rate table.
    Rates,
    /// Convert an amount between two currencies.
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finsync starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rate_source: Arc<dyn RateSource> = match &config.providers.rates {
        Some(provider) => Arc::new(HttpRateSource::new(&provider.base_url)),
        None => Arc::new(PinnedRates),
    };
    let rates = RateService::new(rate_source, config.cache.ttl(), config.cache.fetch_timeout());

    match command {
        AppCommand::Rates => cli::rates::run(&rates).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&rates, amount, &from, &to).await
        }
        AppCommand::Show { user_id } => {
            let cache = transaction_cache(&config)?;
            cli::show::run(&cache, &rates, &user_id, &config.currency, config.cache.ttl()).await
        }
        AppCommand::Refresh { user_ids } => {
            let cache = transaction_cache(&config)?;
            cli::refresh::run(&cache, &user_ids).await
        }
    }
}

fn transaction_cache(config: &AppConfig) -> Result<TransactionCache> {
    let backend = config.providers.transactions.as_ref().context(
        "No transactions provider configured; run 'finsync setup' and set providers.transactions.base_url",
    )?;
    let source = Arc::new(HttpTransactionSource::new(&backend.base_url));
    let store: Arc<dyn SnapshotStore> =
        Arc::new(SessionStore::open(&config.default_data_path()?));
    Ok(TransactionCache::new(source, store, config.cache.ttl()))
}
