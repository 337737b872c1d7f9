use crate::batches;
use crate::cli::batch::print_reconciliation;
use crate::cli::connect;
use crate::error::{Result, TitheError};
use crate::reconciler::CashCount;
use crate::store;

pub fn run(counts: &[String]) -> Result<()> {
    let tally = CashCount::parse_entries(counts)?;
    let conn = connect()?;
    let batch = store::find_active_batch(&conn)?.ok_or(TitheError::NoActiveBatch)?;
    let rec = batches::preview(&conn, &batch.id, &tally)?;
    println!("Batch {} [{}]", batch.id, batch.status);
    print_reconciliation(&tally, &rec);
    Ok(())
}
