//! Row-set access to the `members`, `transactions` and `batches` tables.
//!
//! Columns are flat snake_case; every read goes through a `*_from_row` mapper and
//! every write binds struct fields explicitly, so the domain structs never see
//! raw column values.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Batch, Member, Transaction};

const MEMBER_COLUMNS: &str = "id, name, phone, fellowship, status, ytd_total, last_gift_date";
const TRANSACTION_COLUMNS: &str = "id, batch_id, member_id, member_name, fellowship, amount, method, \
     timestamp, officer_id, officer_name";
const BATCH_COLUMNS: &str = "id, date, status, total_system, total_cash, variance, finalized_by";

fn parse_col<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
    })
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

fn member_from_row(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        fellowship: parse_col(row, 3)?,
        status: parse_col(row, 4)?,
        ytd_total: row.get(5)?,
        last_gift_date: row.get(6)?,
    })
}

/// All members in insertion order.
pub fn list_members(conn: &Connection) -> Result<Vec<Member>> {
    let mut stmt = conn.prepare(&format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY rowid"))?;
    let rows = stmt.query_map([], member_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_member(conn: &Connection, id: &str) -> Result<Option<Member>> {
    Ok(conn
        .query_row(
            &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"),
            [id],
            member_from_row,
        )
        .optional()?)
}

pub fn insert_member(conn: &Connection, m: &Member) -> Result<()> {
    conn.execute(
        "INSERT INTO members (id, name, phone, fellowship, status, ytd_total, last_gift_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            m.id,
            m.name,
            m.phone,
            m.fellowship.name(),
            m.status.as_str(),
            m.ytd_total,
            m.last_gift_date
        ],
    )?;
    Ok(())
}

/// Insert or overwrite by id. The row keeps its original position in `list_members`.
pub fn upsert_member(conn: &Connection, m: &Member) -> Result<()> {
    conn.execute(
        "INSERT INTO members (id, name, phone, fellowship, status, ytd_total, last_gift_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, phone = excluded.phone, \
         fellowship = excluded.fellowship, status = excluded.status, \
         ytd_total = excluded.ytd_total, \
         last_gift_date = COALESCE(excluded.last_gift_date, members.last_gift_date)",
        params![
            m.id,
            m.name,
            m.phone,
            m.fellowship.name(),
            m.status.as_str(),
            m.ytd_total,
            m.last_gift_date
        ],
    )?;
    Ok(())
}

pub fn update_member(conn: &Connection, m: &Member) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE members SET name = ?2, phone = ?3, fellowship = ?4, status = ?5, \
         ytd_total = ?6, last_gift_date = ?7 WHERE id = ?1",
        params![
            m.id,
            m.name,
            m.phone,
            m.fellowship.name(),
            m.status.as_str(),
            m.ytd_total,
            m.last_gift_date
        ],
    )?)
}

pub fn set_member_ytd(
    conn: &Connection,
    id: &str,
    ytd_total: f64,
    last_gift_date: Option<&str>,
) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE members SET ytd_total = ?2, last_gift_date = COALESCE(?3, last_gift_date) WHERE id = ?1",
        params![id, ytd_total, last_gift_date],
    )?)
}

/// Deletes the member; its transactions go with it (ON DELETE CASCADE).
pub fn delete_member(conn: &Connection, id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM members WHERE id = ?1", [id])?)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        member_id: row.get(2)?,
        member_name: row.get(3)?,
        fellowship: parse_col(row, 4)?,
        amount: row.get(5)?,
        method: parse_col(row, 6)?,
        timestamp: row.get(7)?,
        officer_id: row.get(8)?,
        officer_name: row.get(9)?,
    })
}

fn query_transactions(
    conn: &Connection,
    filter: &str,
    param: Option<&str>,
) -> Result<Vec<Transaction>> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions {filter} ORDER BY rowid");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match param {
        Some(p) => stmt.query_map([p], transaction_from_row)?,
        None => stmt.query_map([], transaction_from_row)?,
    };
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// All transactions, oldest write first.
pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    query_transactions(conn, "", None)
}

pub fn transactions_for_member(conn: &Connection, member_id: &str) -> Result<Vec<Transaction>> {
    query_transactions(conn, "WHERE member_id = ?1", Some(member_id))
}

pub fn transactions_for_batch(conn: &Connection, batch_id: &str) -> Result<Vec<Transaction>> {
    query_transactions(conn, "WHERE batch_id = ?1", Some(batch_id))
}

pub fn insert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, batch_id, member_id, member_name, fellowship, amount, method, \
         timestamp, officer_id, officer_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            t.id,
            t.batch_id,
            t.member_id,
            t.member_name,
            t.fellowship.name(),
            t.amount,
            t.method.as_str(),
            t.timestamp,
            t.officer_id,
            t.officer_name
        ],
    )?;
    Ok(())
}

/// Insert or overwrite by id; used by import so re-imported cells replace themselves.
pub fn upsert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, batch_id, member_id, member_name, fellowship, amount, method, \
         timestamp, officer_id, officer_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
         ON CONFLICT(id) DO UPDATE SET batch_id = excluded.batch_id, member_id = excluded.member_id, \
         member_name = excluded.member_name, fellowship = excluded.fellowship, \
         amount = excluded.amount, method = excluded.method, timestamp = excluded.timestamp, \
         officer_id = excluded.officer_id, officer_name = excluded.officer_name",
        params![
            t.id,
            t.batch_id,
            t.member_id,
            t.member_name,
            t.fellowship.name(),
            t.amount,
            t.method.as_str(),
            t.timestamp,
            t.officer_id,
            t.officer_name
        ],
    )?;
    Ok(())
}

pub fn delete_transaction(conn: &Connection, id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?)
}

/// Move every transaction of `from` onto `to`, refreshing the denormalized name.
pub fn reassign_transactions(conn: &Connection, from: &str, to: &str) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE transactions SET member_id = ?2, \
         member_name = COALESCE((SELECT name FROM members WHERE id = ?2), member_name) \
         WHERE member_id = ?1",
        params![from, to],
    )?)
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

fn batch_from_row(row: &Row) -> rusqlite::Result<Batch> {
    Ok(Batch {
        id: row.get(0)?,
        date: row.get(1)?,
        status: parse_col(row, 2)?,
        total_system: row.get(3)?,
        total_cash: row.get(4)?,
        variance: row.get(5)?,
        finalized_by: row.get(6)?,
    })
}

pub fn list_batches(conn: &Connection) -> Result<Vec<Batch>> {
    let mut stmt = conn.prepare(&format!("SELECT {BATCH_COLUMNS} FROM batches ORDER BY rowid"))?;
    let rows = stmt.query_map([], batch_from_row)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_batch(conn: &Connection, id: &str) -> Result<Option<Batch>> {
    Ok(conn
        .query_row(
            &format!("SELECT {BATCH_COLUMNS} FROM batches WHERE id = ?1"),
            [id],
            batch_from_row,
        )
        .optional()?)
}

/// The OPEN or COUNTING batch, if any. Oldest wins should more than one exist.
pub fn find_active_batch(conn: &Connection) -> Result<Option<Batch>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {BATCH_COLUMNS} FROM batches WHERE status IN ('OPEN', 'COUNTING') \
                 ORDER BY rowid LIMIT 1"
            ),
            [],
            batch_from_row,
        )
        .optional()?)
}

pub fn upsert_batch(conn: &Connection, b: &Batch) -> Result<()> {
    conn.execute(
        "INSERT INTO batches (id, date, status, total_system, total_cash, variance, finalized_by) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(id) DO UPDATE SET date = excluded.date, status = excluded.status, \
         total_system = excluded.total_system, total_cash = excluded.total_cash, \
         variance = excluded.variance, finalized_by = excluded.finalized_by",
        params![
            b.id,
            b.date,
            b.status.as_str(),
            b.total_system,
            b.total_cash,
            b.variance,
            b.finalized_by
        ],
    )?;
    Ok(())
}
