//! Collection batch lifecycle: OPEN -> COUNTING -> FINALIZED -> SYNCED.
//!
//! Moves are one-way and one step at a time. Only the COUNTING -> FINALIZED step
//! is gated, by the cash reconciliation balancing.

use chrono::Local;
use rand::Rng;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, TitheError};
use crate::models::{Batch, BatchStatus};
use crate::reconciler::{self, CashCount, Reconciliation};
use crate::store;

pub const IMPORT_BATCH_PREFIX: &str = "BATCH-IMPORT-";

pub fn import_batch_id(year: i32) -> String {
    format!("{IMPORT_BATCH_PREFIX}{year}")
}

fn new_batch_id(date: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!(
        "BATCH-{}-{}{:04}",
        date.replace('-', ""),
        Local::now().timestamp_millis() % 100_000,
        suffix
    )
}

/// Stored totals are kept to the pesewa.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn allowed(from: BatchStatus, to: BatchStatus) -> bool {
    matches!(
        (from, to),
        (BatchStatus::Open, BatchStatus::Counting)
            | (BatchStatus::Counting, BatchStatus::Finalized)
            | (BatchStatus::Finalized, BatchStatus::Synced)
    )
}

fn check_transition(batch: &Batch, to: BatchStatus) -> Result<()> {
    if allowed(batch.status, to) {
        Ok(())
    } else {
        Err(TitheError::InvalidTransition {
            id: batch.id.clone(),
            from: batch.status.to_string(),
            to: to.to_string(),
        })
    }
}

fn load(conn: &Connection, id: &str) -> Result<Batch> {
    store::get_batch(conn, id)?.ok_or_else(|| TitheError::UnknownBatch(id.to_string()))
}

/// The OPEN or COUNTING batch, creating a fresh OPEN one dated today if none exists.
pub fn active_batch(conn: &Connection) -> Result<Batch> {
    if let Some(b) = store::find_active_batch(conn)? {
        return Ok(b);
    }
    let date = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let batch = Batch {
        id: new_batch_id(&date),
        date,
        status: BatchStatus::Open,
        total_system: 0.0,
        total_cash: 0.0,
        variance: 0.0,
        finalized_by: None,
    };
    store::upsert_batch(conn, &batch)?;
    info!(batch = %batch.id, "opened new batch");
    Ok(batch)
}

/// Active batch, but only if it still accepts entries.
pub fn open_batch_for_entry(conn: &Connection) -> Result<Batch> {
    let batch = active_batch(conn)?;
    if batch.status != BatchStatus::Open {
        return Err(TitheError::BatchNotOpen {
            id: batch.id,
            status: batch.status.to_string(),
        });
    }
    Ok(batch)
}

/// Freeze entry on the batch and snapshot its expected cash.
pub fn begin_count(conn: &Connection, id: &str) -> Result<Batch> {
    let mut batch = load(conn, id)?;
    check_transition(&batch, BatchStatus::Counting)?;
    let txns = store::transactions_for_batch(conn, id)?;
    batch.status = BatchStatus::Counting;
    batch.total_system = round2(reconciler::system_cash(&txns));
    store::upsert_batch(conn, &batch)?;
    debug!(batch = %id, expected = batch.total_system, "counting started");
    Ok(batch)
}

/// Reconcile `count` against the batch's transactions without changing anything.
pub fn preview(conn: &Connection, id: &str, count: &CashCount) -> Result<Reconciliation> {
    let txns = store::transactions_for_batch(conn, id)?;
    Ok(reconciler::reconcile(&txns, count))
}

/// Lock a COUNTING batch. Refused with `Unbalanced` unless the count matches.
pub fn finalize(
    conn: &Connection,
    id: &str,
    count: &CashCount,
    officer: &str,
) -> Result<(Batch, Reconciliation)> {
    let mut batch = load(conn, id)?;
    check_transition(&batch, BatchStatus::Finalized)?;
    let rec = preview(conn, id, count)?;
    if !rec.is_balanced {
        return Err(TitheError::Unbalanced(format!(
            "variance {:.2}. {}",
            rec.variance,
            rec.message()
        )));
    }
    batch.status = BatchStatus::Finalized;
    batch.total_system = round2(rec.system_cash);
    batch.total_cash = round2(rec.physical_cash);
    batch.variance = round2(rec.variance);
    batch.finalized_by = Some(officer.to_string());
    store::upsert_batch(conn, &batch)?;
    info!(batch = %id, total = rec.physical_cash, "batch finalized");
    Ok((batch, rec))
}

pub fn mark_synced(conn: &Connection, id: &str) -> Result<Batch> {
    let mut batch = load(conn, id)?;
    check_transition(&batch, BatchStatus::Synced)?;
    batch.status = BatchStatus::Synced;
    store::upsert_batch(conn, &batch)?;
    info!(batch = %id, "batch synced");
    Ok(batch)
}

/// Container for a year's imported transactions. Created SYNCED: historical
/// data is never counted and must not block a live batch.
pub fn ensure_import_batch(conn: &Connection, year: i32) -> Result<Batch> {
    let id = import_batch_id(year);
    if let Some(existing) = store::get_batch(conn, &id)? {
        return Ok(existing);
    }
    let batch = Batch {
        id,
        date: format!("{year}-01-01"),
        status: BatchStatus::Synced,
        total_system: 0.0,
        total_cash: 0.0,
        variance: 0.0,
        finalized_by: Some("ADMIN-IMPORT".to_string()),
    };
    store::upsert_batch(conn, &batch)?;
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::fellowship::Fellowship;
    use crate::models::{Member, MemberStatus, PaymentMethod, Transaction};

    fn add_cash(conn: &Connection, batch_id: &str, id: &str, amount: f64) {
        if store::get_member(conn, "M1").unwrap().is_none() {
            store::insert_member(
                conn,
                &Member {
                    id: "M1".to_string(),
                    name: "Ama".to_string(),
                    phone: "0000000000".to_string(),
                    fellowship: Fellowship::Sardis,
                    status: MemberStatus::Active,
                    ytd_total: 0.0,
                    last_gift_date: None,
                },
            )
            .unwrap();
        }
        store::insert_transaction(
            conn,
            &Transaction {
                id: id.to_string(),
                batch_id: batch_id.to_string(),
                member_id: "M1".to_string(),
                member_name: "Ama".to_string(),
                fellowship: Fellowship::Sardis,
                amount,
                method: PaymentMethod::Cash,
                timestamp: "2025-01-05T00:00:00.000Z".to_string(),
                officer_id: "sys".to_string(),
                officer_name: String::new(),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_active_batch_is_created_once() {
        let (_dir, conn) = test_db();
        let a = active_batch(&conn).unwrap();
        let b = active_batch(&conn).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.status, BatchStatus::Open);
        assert_eq!(store::list_batches(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_full_lifecycle() {
        let (_dir, conn) = test_db();
        let batch = active_batch(&conn).unwrap();
        add_cash(&conn, &batch.id, "T1", 120.0);

        let counting = begin_count(&conn, &batch.id).unwrap();
        assert_eq!(counting.status, BatchStatus::Counting);
        assert_eq!(counting.total_system, 120.0);

        let count = CashCount::parse_entries(&["100=1", "20=1"]).unwrap();
        let (done, rec) = finalize(&conn, &batch.id, &count, "Deacon Kwesi").unwrap();
        assert!(rec.is_balanced);
        assert_eq!(done.status, BatchStatus::Finalized);
        assert_eq!(done.total_cash, 120.0);
        assert_eq!(done.finalized_by.as_deref(), Some("Deacon Kwesi"));

        let synced = mark_synced(&conn, &batch.id).unwrap();
        assert_eq!(synced.status, BatchStatus::Synced);

        // A finalized batch is no longer active, so a new one opens.
        let next = active_batch(&conn).unwrap();
        assert_ne!(next.id, batch.id);
    }

    #[test]
    fn test_finalize_rejected_when_unbalanced() {
        let (_dir, conn) = test_db();
        let batch = active_batch(&conn).unwrap();
        add_cash(&conn, &batch.id, "T1", 120.0);
        begin_count(&conn, &batch.id).unwrap();

        let short = CashCount::parse_entries(&["100=1"]).unwrap();
        let err = finalize(&conn, &batch.id, &short, "x").unwrap_err();
        assert!(matches!(err, TitheError::Unbalanced(_)));
        let still = store::get_batch(&conn, &batch.id).unwrap().unwrap();
        assert_eq!(still.status, BatchStatus::Counting);
    }

    #[test]
    fn test_finalize_accepts_sub_pesewa_variance_and_stores_rounded_totals() {
        let (_dir, conn) = test_db();
        let batch = active_batch(&conn).unwrap();
        add_cash(&conn, &batch.id, "T1", 100.006);
        begin_count(&conn, &batch.id).unwrap();

        let count = CashCount::parse_entries(&["100=1"]).unwrap();
        let (done, rec) = finalize(&conn, &batch.id, &count, "x").unwrap();
        assert!(rec.is_balanced);
        assert_eq!(done.status, BatchStatus::Finalized);
        assert_eq!(done.total_system, 100.01);
        assert_eq!(done.variance, -0.01);
    }

    #[test]
    fn test_illegal_transitions() {
        let (_dir, conn) = test_db();
        let batch = active_batch(&conn).unwrap();
        let count = CashCount::new();
        assert!(matches!(
            finalize(&conn, &batch.id, &count, "x"),
            Err(TitheError::InvalidTransition { .. })
        ));
        assert!(matches!(
            mark_synced(&conn, &batch.id),
            Err(TitheError::InvalidTransition { .. })
        ));
        begin_count(&conn, &batch.id).unwrap();
        assert!(matches!(
            begin_count(&conn, &batch.id),
            Err(TitheError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_entry_refused_while_counting() {
        let (_dir, conn) = test_db();
        let batch = active_batch(&conn).unwrap();
        assert_eq!(open_batch_for_entry(&conn).unwrap().id, batch.id);
        begin_count(&conn, &batch.id).unwrap();
        assert!(matches!(
            open_batch_for_entry(&conn),
            Err(TitheError::BatchNotOpen { .. })
        ));
    }

    #[test]
    fn test_import_batch_never_active() {
        let (_dir, conn) = test_db();
        let b = ensure_import_batch(&conn, 2024).unwrap();
        assert_eq!(b.id, "BATCH-IMPORT-2024");
        assert_eq!(b.status, BatchStatus::Synced);
        assert!(store::find_active_batch(&conn).unwrap().is_none());
        ensure_import_batch(&conn, 2024).unwrap();
        assert_eq!(store::list_batches(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_batch() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            begin_count(&conn, "nope"),
            Err(TitheError::UnknownBatch(_))
        ));
    }
}
