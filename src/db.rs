use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS members (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '0000000000',
    fellowship TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    ytd_total REAL NOT NULL DEFAULT 0,
    last_gift_date TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS batches (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'OPEN',
    total_system REAL NOT NULL DEFAULT 0,
    total_cash REAL NOT NULL DEFAULT 0,
    variance REAL NOT NULL DEFAULT 0,
    finalized_by TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    batch_id TEXT NOT NULL,
    member_id TEXT NOT NULL,
    member_name TEXT NOT NULL,
    fellowship TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    method TEXT NOT NULL DEFAULT 'CASH',
    timestamp TEXT NOT NULL,
    officer_id TEXT NOT NULL,
    officer_name TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (member_id) REFERENCES members(id) ON DELETE CASCADE,
    FOREIGN KEY (batch_id) REFERENCES batches(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_member ON transactions(member_id);
CREATE INDEX IF NOT EXISTS idx_transactions_batch ON transactions(batch_id);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    fiscal_year INTEGER NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    member_count INTEGER,
    transaction_count INTEGER,
    checksum TEXT
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["members", "transactions", "batches", "imports"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_non_positive_amount_rejected_by_schema() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO members (id, name, fellowship) VALUES ('M1', 'Ama', 'Berea')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO batches (id, date) VALUES ('B1', '2025-01-05')",
            [],
        )
        .unwrap();
        let err = conn.execute(
            "INSERT INTO transactions (id, batch_id, member_id, member_name, fellowship, amount, timestamp, officer_id) \
             VALUES ('T1', 'B1', 'M1', 'Ama', 'Berea', 0, '2025-01-05T00:00:00.000Z', 'sys')",
            [],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_deleting_member_cascades() {
        let (_dir, conn) = test_db();
        conn.execute_batch(
            "INSERT INTO members (id, name, fellowship) VALUES ('M1', 'Ama', 'Berea');
             INSERT INTO batches (id, date) VALUES ('B1', '2025-01-05');
             INSERT INTO transactions (id, batch_id, member_id, member_name, fellowship, amount, timestamp, officer_id)
             VALUES ('T1', 'B1', 'M1', 'Ama', 'Berea', 10, '2025-01-05T00:00:00.000Z', 'sys');
             DELETE FROM members WHERE id = 'M1';",
        )
        .unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
