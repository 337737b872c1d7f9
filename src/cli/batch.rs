use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::batches;
use crate::cli::{connect, print_json};
use crate::error::{Result, TitheError};
use crate::fmt::{money, signed_money};
use crate::models::BatchStatus;
use crate::reconciler::{CashCount, Reconciliation, STANDARD_DENOMINATIONS};
use crate::settings::load_settings;
use crate::store;

/// Denomination lines, totals and the variance verdict.
pub(crate) fn print_reconciliation(count: &CashCount, rec: &Reconciliation) {
    let lines = count.lines();
    let mut sheet: Vec<(f64, u32, f64)> = STANDARD_DENOMINATIONS
        .iter()
        .map(|&d| lines.iter().copied().find(|l| l.0 == d).unwrap_or((d, 0, 0.0)))
        .collect();
    // coins and anything else off the standard sheet
    sheet.extend(lines.iter().copied().filter(|l| !STANDARD_DENOMINATIONS.contains(&l.0)));

    let mut table = Table::new();
    table.set_header(vec!["Denomination", "Qty", "Subtotal"]);
    for (denom, qty, subtotal) in sheet {
        table.add_row(vec![Cell::new(money(denom)), Cell::new(qty), Cell::new(money(subtotal))]);
    }
    println!("{table}");
    println!("System cash:   {}", money(rec.system_cash));
    println!("Physical cash: {}", money(rec.physical_cash));
    let variance = signed_money(rec.variance);
    if rec.is_balanced {
        println!("Variance:      {}  {}", variance, "BALANCED".green().bold());
    } else {
        println!("Variance:      {}", variance.red().bold());
        println!("{}", rec.message().yellow());
    }
}

pub fn show() -> Result<()> {
    let conn = connect()?;
    let Some(batch) = store::find_active_batch(&conn)? else {
        println!("No active batch. One opens with the next recorded gift.");
        return Ok(());
    };
    let txns = store::transactions_for_batch(&conn, &batch.id)?;
    let cash: f64 = crate::reconciler::system_cash(&txns);
    let all: f64 = txns.iter().map(|t| t.amount).sum();
    println!("Batch:       {}", batch.id);
    println!("Opened:      {}", batch.date);
    println!("Status:      {}", batch.status);
    println!("Gifts:       {}", txns.len());
    println!("Total:       {}", money(all));
    println!("Cash:        {}", money(cash));
    Ok(())
}

pub fn list(json: bool) -> Result<()> {
    let conn = connect()?;
    let rows = store::list_batches(&conn)?;
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No batches.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Status", "System", "Counted", "Variance", "Finalized By"]);
    for b in &rows {
        table.add_row(vec![
            Cell::new(&b.id),
            Cell::new(&b.date),
            Cell::new(b.status),
            Cell::new(money(b.total_system)),
            Cell::new(money(b.total_cash)),
            Cell::new(signed_money(b.variance)),
            Cell::new(b.finalized_by.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn count(counts: &[String]) -> Result<()> {
    let tally = CashCount::parse_entries(counts)?;
    let conn = connect()?;
    let active = store::find_active_batch(&conn)?.ok_or(TitheError::NoActiveBatch)?;
    let batch = if active.status == BatchStatus::Open {
        batches::begin_count(&conn, &active.id)?
    } else {
        active
    };
    println!("Counting batch {} (entry frozen)", batch.id);
    let rec = batches::preview(&conn, &batch.id, &tally)?;
    print_reconciliation(&tally, &rec);
    Ok(())
}

pub fn finalize(counts: &[String]) -> Result<()> {
    let tally = CashCount::parse_entries(counts)?;
    let conn = connect()?;
    let active = store::find_active_batch(&conn)?.ok_or(TitheError::NoActiveBatch)?;
    let settings = load_settings();
    let rec = batches::preview(&conn, &active.id, &tally)?;
    print_reconciliation(&tally, &rec);
    let (batch, _) = batches::finalize(&conn, &active.id, &tally, settings.officer_label())?;
    println!("Batch {} finalized by {}", batch.id, settings.officer_label());
    Ok(())
}

pub fn sync(id: Option<String>) -> Result<()> {
    let conn = connect()?;
    let id = match id {
        Some(id) => id,
        None => store::list_batches(&conn)?
            .into_iter()
            .rev()
            .find(|b| b.status == BatchStatus::Finalized)
            .map(|b| b.id)
            .ok_or_else(|| TitheError::Other("No finalized batch to sync".to_string()))?,
    };
    let batch = batches::mark_synced(&conn, &id)?;
    println!("Batch {} marked {}", batch.id, batch.status);
    Ok(())
}
