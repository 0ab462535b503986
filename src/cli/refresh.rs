use super::ui;
use crate::transactions::TransactionCache;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

/// Force-refreshes one or more users' transactions, bypassing the TTL gate.
pub async fn run(cache: &TransactionCache, user_ids: &[String]) -> Result<()> {
    let pb = ui::new_progress_bar(user_ids.len() as u64, true);
    pb.set_message("Refreshing transactions...");

    let refresh_futures = user_ids.iter().map(|user_id| {
        let pb_clone = pb.clone();
        async move {
            let res = cache.refresh(user_id).await;
            pb_clone.inc(1);
            (user_id.clone(), res)
        }
    });
    let results = join_all(refresh_futures).await;
    pb.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("User"),
        ui::header_cell("Transactions"),
        ui::header_cell("Status"),
    ]);

    let mut failures = 0;
    for (user_id, result) in results {
        match result {
            Ok(record) => table.add_row(vec![
                Cell::new(user_id),
                ui::numeric_cell(&record.transactions.len().to_string()),
                Cell::new("refreshed"),
            ]),
            Err(e) => {
                failures += 1;
                table.add_row(vec![
                    Cell::new(user_id),
                    ui::numeric_cell("-"),
                    Cell::new(ui::style_text(&format!("{e:#}"), ui::StyleType::Error)),
                ])
            }
        };
    }

    println!("{table}");

    if failures == user_ids.len() && failures > 0 {
        anyhow::bail!("All {failures} refreshes failed");
    }
    Ok(())
}
