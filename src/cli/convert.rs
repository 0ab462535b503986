use crate::rates::RateService;
use anyhow::Result;

/// Converts one amount between two currencies via the USD pivot.
pub async fn run(rates: &RateService, amount: f64, from: &str, to: &str) -> Result<()> {
    let converted = rates.convert(amount, from, to).await?;
    println!("{amount:.2} {from} = {converted:.2} {to}");
    Ok(())
}
