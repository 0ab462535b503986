use super::ui;
use crate::core::currency::{BASE_CURRENCY, CurrencyError};
use crate::core::freshness::is_stale;
use crate::core::transaction::CacheRecord;
use crate::rates::RateService;
use crate::transactions::TransactionCache;
use anyhow::Result;
use comfy_table::Cell;
use std::time::Duration;
use tracing::warn;

/// Displays a user's cached transactions, refreshing first if stale.
///
/// Amounts are converted into the configured display currency. When no rate
/// table is available the amounts are shown unconverted in the base currency
/// instead of failing the whole view.
pub async fn run(
    cache: &TransactionCache,
    rates: &RateService,
    user_id: &str,
    display_currency: &str,
    ttl: Duration,
) -> Result<()> {
    let record = cache.current(user_id).await?;

    let currency = match rates.convert(1.0, BASE_CURRENCY, display_currency).await {
        Ok(_) => display_currency.to_string(),
        Err(CurrencyError::RatesUnavailable) => {
            warn!("No exchange rates available, displaying unconverted amounts");
            BASE_CURRENCY.to_string()
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", render(&record, rates, user_id, &currency, ttl).await?);
    Ok(())
}

async fn render(
    record: &CacheRecord,
    rates: &RateService,
    user_id: &str,
    currency: &str,
    ttl: Duration,
) -> Result<String> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Description"),
        ui::header_cell("Category"),
        ui::header_cell(&format!("Amount ({currency})")),
    ]);

    let mut income = 0.0;
    let mut expenses = 0.0;
    for transaction in &record.transactions {
        let amount = rates
            .convert(transaction.amount, BASE_CURRENCY, currency)
            .await?;
        if amount >= 0.0 {
            income += amount;
        } else {
            expenses += amount;
        }
        table.add_row(vec![
            Cell::new(transaction.date.to_string()),
            Cell::new(&transaction.description),
            Cell::new(&transaction.category),
            ui::amount_cell(amount),
        ]);
    }

    let mut output = format!(
        "Transactions for {}\n\n",
        ui::style_text(user_id, ui::StyleType::Title)
    );
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\nIncome: {}  Expenses: {}  Net: {}",
        ui::style_text(&format!("{income:.2}"), ui::StyleType::TotalValue),
        ui::style_text(&format!("{expenses:.2}"), ui::StyleType::Error),
        ui::style_text(
            &format!("{:.2}", income + expenses),
            ui::StyleType::TotalLabel
        ),
    ));

    let now = chrono::Utc::now().timestamp_millis();
    let fetched = chrono::DateTime::from_timestamp_millis(record.fetched_at)
        .map_or_else(|| "unknown".to_string(), |dt| dt.to_rfc3339());
    let freshness = if is_stale(now, record.fetched_at, ttl) {
        "stale"
    } else {
        "fresh"
    };
    output.push_str(&format!(
        "\n{}",
        ui::style_text(
            &format!("Fetched at {fetched} ({freshness})"),
            ui::StyleType::Subtle
        )
    ));

    Ok(output)
}
