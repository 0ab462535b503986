use super::ui;
use crate::rates::RateService;
use anyhow::Result;
use comfy_table::Cell;

/// Dumps the active exchange-rate table.
pub async fn run(rates: &RateService) -> Result<()> {
    let table = rates.table().await?;

    let mut codes: Vec<&String> = table.rates.keys().collect();
    codes.sort();

    let mut output = ui::new_styled_table();
    output.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per {})", table.base)),
    ]);
    for code in codes {
        output.add_row(vec![
            Cell::new(code),
            ui::numeric_cell(&format!("{:.4}", table.rates[code])),
        ]);
    }

    println!("{output}");

    let fetched = chrono::DateTime::from_timestamp_millis(table.fetched_at)
        .map_or_else(|| "unknown".to_string(), |dt| dt.to_rfc3339());
    println!(
        "{}",
        ui::style_text(&format!("Fetched at {fetched}"), ui::StyleType::Subtle)
    );
    Ok(())
}
