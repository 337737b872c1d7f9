//! In-process view of the tithe ledger and the commands that change it.
//!
//! Commands update the cached rows first and then write through to the store.
//! If a write fails the cache is rebuilt from the store before the error is
//! returned, so local state may be stale only until the next `fetch`.

use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::batches;
use crate::calendar;
use crate::error::{Result, TitheError};
use crate::fellowship::Fellowship;
use crate::models::{Batch, BatchStatus, Member, MemberStatus, PaymentMethod, Transaction};
use crate::store;

pub const DEFAULT_PHONE: &str = "0000000000";
pub const MIN_SEARCH_LEN: usize = 2;

fn fresh_id(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{prefix}-{}{suffix:04}", Local::now().timestamp_millis())
}

/// Who is recording gifts.
#[derive(Debug, Clone)]
pub struct Officer {
    pub id: String,
    pub name: String,
}

/// The collection week gifts are being entered for.
#[derive(Debug, Clone)]
pub struct EntrySession {
    pub year: i32,
    pub month: String,
    pub week: u32,
}

impl EntrySession {
    pub fn timestamp(&self) -> Result<String> {
        calendar::sunday_of(self.year, &self.month, self.week)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub fellowship: Option<Fellowship>,
    pub status: Option<MemberStatus>,
}

/// Register filters. All present fields must match.
#[derive(Debug, Default, Clone)]
pub struct RegisterFilter {
    pub method: Option<PaymentMethod>,
    pub fellowship: Option<Fellowship>,
    pub member_id: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RegisterFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        if self.method.is_some_and(|m| m != t.method) {
            return false;
        }
        if self.fellowship.is_some_and(|f| f != t.fellowship) {
            return false;
        }
        if self.member_id.as_deref().is_some_and(|id| id != t.member_id) {
            return false;
        }
        if self.min_amount.is_some_and(|min| t.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| t.amount > max) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(day) = calendar::date_of(&t.timestamp) else {
                return false;
            };
            if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    pub page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

pub struct Ledger {
    conn: Connection,
    members: Vec<Member>,
    transactions: Vec<Transaction>,
    batches: Vec<Batch>,
}

impl Ledger {
    /// Wrap a connection. Caches start empty until `fetch`.
    pub fn open(conn: Connection) -> Self {
        Self {
            conn,
            members: Vec::new(),
            transactions: Vec::new(),
            batches: Vec::new(),
        }
    }

    /// `open` followed by `fetch`.
    pub fn load(conn: Connection) -> Result<Self> {
        let mut ledger = Self::open(conn);
        ledger.fetch()?;
        Ok(ledger)
    }

    pub fn fetch(&mut self) -> Result<()> {
        self.members = store::list_members(&self.conn)?;
        self.transactions = store::list_transactions(&self.conn)?;
        self.batches = store::list_batches(&self.conn)?;
        debug!(
            members = self.members.len(),
            transactions = self.transactions.len(),
            batches = self.batches.len(),
            "ledger fetched"
        );
        Ok(())
    }

    pub fn teardown(&mut self) {
        self.members.clear();
        self.transactions.clear();
        self.batches.clear();
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[cfg(test)]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    #[cfg(test)]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn active_batch(&self) -> Option<&Batch> {
        self.batches.iter().find(|b| b.status.is_active())
    }

    /// Pass a store result through, rebuilding the cache if it failed.
    fn settle<T>(&mut self, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            warn!(error = %e, "write failed; refetching ledger");
            if let Err(refetch) = self.fetch() {
                warn!(error = %refetch, "refetch after failed write also failed");
                self.teardown();
            }
        }
        outcome
    }

    // -- members ------------------------------------------------------------

    pub fn add_member(&mut self, name: &str, phone: &str, fellowship: Fellowship) -> Result<Member> {
        self.create_member(name, phone, fellowship, MemberStatus::Active)
    }

    /// Add a walk-in giver during entry. Marked PROVISIONAL until their details
    /// are confirmed with `update_member`.
    pub fn quick_add(&mut self, name: &str, phone: Option<&str>, fellowship: Fellowship) -> Result<Member> {
        self.create_member(
            name,
            phone.unwrap_or(DEFAULT_PHONE),
            fellowship,
            MemberStatus::Provisional,
        )
    }

    fn create_member(
        &mut self,
        name: &str,
        phone: &str,
        fellowship: Fellowship,
        status: MemberStatus,
    ) -> Result<Member> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TitheError::Other("Member name cannot be empty".to_string()));
        }
        let phone = phone.trim();
        let member = Member {
            id: fresh_id("MEM"),
            name: name.to_string(),
            phone: if phone.is_empty() { DEFAULT_PHONE } else { phone }.to_string(),
            fellowship,
            status,
            ytd_total: 0.0,
            last_gift_date: None,
        };
        self.members.push(member.clone());
        let outcome = store::insert_member(&self.conn, &member);
        self.settle(outcome)?;
        info!(member = %member.id, name = %member.name, "member added");
        Ok(member)
    }

    pub fn update_member(&mut self, id: &str, update: MemberUpdate) -> Result<Member> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| TitheError::UnknownMember(id.to_string()))?;
        if let Some(name) = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            member.name = name.to_string();
        }
        if let Some(phone) = update.phone {
            member.phone = phone.trim().to_string();
        }
        if let Some(f) = update.fellowship {
            member.fellowship = f;
        }
        if let Some(s) = update.status {
            member.status = s;
        }
        let updated = member.clone();
        let outcome = store::update_member(&self.conn, &updated);
        self.settle(outcome)?;
        Ok(updated)
    }

    /// Remove a member and, through the cascade, all of their transactions.
    /// Returns how many transactions went with them.
    pub fn delete_member(&mut self, id: &str) -> Result<usize> {
        if self.member(id).is_none() {
            return Err(TitheError::UnknownMember(id.to_string()));
        }
        self.members.retain(|m| m.id != id);
        let before = self.transactions.len();
        self.transactions.retain(|t| t.member_id != id);
        let removed = before - self.transactions.len();
        let outcome = store::delete_member(&self.conn, id);
        self.settle(outcome)?;
        info!(member = %id, transactions = removed, "member deleted");
        Ok(removed)
    }

    /// Rebuild every member's `ytd_total` from their transactions dated in `year`
    /// and `last_gift_date` from their latest gift. Returns the number of members changed.
    pub fn recompute_ytd(&mut self, year: i32) -> Result<usize> {
        let mut changed = Vec::new();
        for m in &mut self.members {
            let mine = self.transactions.iter().filter(|t| t.member_id == m.id);
            let mut total = 0.0;
            let mut latest: Option<&str> = None;
            for t in mine {
                if calendar::date_of(&t.timestamp).is_some_and(|d| d.year() == year) {
                    total += t.amount;
                }
                if latest.map_or(true, |l| t.timestamp.as_str() > l) {
                    latest = Some(&t.timestamp);
                }
            }
            let total = (total * 100.0).round() / 100.0;
            let latest = latest.map(str::to_string);
            if (m.ytd_total - total).abs() >= 0.005 || (latest.is_some() && latest != m.last_gift_date) {
                m.ytd_total = total;
                if latest.is_some() {
                    m.last_gift_date = latest;
                }
                changed.push((m.id.clone(), m.ytd_total, m.last_gift_date.clone()));
            }
        }
        for (id, total, last) in &changed {
            let outcome = store::set_member_ytd(&self.conn, id, *total, last.as_deref());
            self.settle(outcome)?;
        }
        info!(year, changed = changed.len(), "year-to-date totals recomputed");
        Ok(changed.len())
    }

    /// Case-insensitive name match or phone substring. Queries shorter than two
    /// characters return nothing.
    pub fn search(&self, query: &str) -> Vec<&Member> {
        let q = query.trim();
        if q.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }
        let needle = q.to_lowercase();
        self.members
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle) || m.phone.contains(q))
            .collect()
    }

    // -- transactions -------------------------------------------------------

    /// Record a gift against the open batch, dated to the session's Sunday.
    pub fn record_gift(
        &mut self,
        member_id: &str,
        amount: f64,
        method: PaymentMethod,
        session: &EntrySession,
        officer: &Officer,
    ) -> Result<Transaction> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TitheError::InvalidAmount(format!(
                "{amount} (gifts must be greater than zero)"
            )));
        }
        let member = self
            .member(member_id)
            .cloned()
            .ok_or_else(|| TitheError::UnknownMember(member_id.to_string()))?;
        let timestamp = session.timestamp()?;

        let batch = batches::open_batch_for_entry(&self.conn);
        let batch = self.settle(batch)?;
        if !self.batches.iter().any(|b| b.id == batch.id) {
            self.batches.push(batch.clone());
        }

        let txn = Transaction {
            id: fresh_id("TXN"),
            batch_id: batch.id,
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            fellowship: member.fellowship,
            amount,
            method,
            timestamp,
            officer_id: officer.id.clone(),
            officer_name: officer.name.clone(),
        };

        self.transactions.push(txn.clone());
        let (ytd, last) = self.bump_member(&member.id, amount, Some(&txn.timestamp));

        let outcome = store::insert_transaction(&self.conn, &txn);
        self.settle(outcome)?;
        let outcome = store::set_member_ytd(&self.conn, &member.id, ytd, last.as_deref());
        self.settle(outcome)?;
        info!(txn = %txn.id, member = %member.id, amount, "gift recorded");
        Ok(txn)
    }

    /// Adjust a cached member's YTD by `delta` (floored at zero). Returns the new
    /// (ytd, last_gift_date) to persist.
    fn bump_member(&mut self, id: &str, delta: f64, gift_ts: Option<&str>) -> (f64, Option<String>) {
        let Some(m) = self.members.iter_mut().find(|m| m.id == id) else {
            return (0.0, None);
        };
        m.ytd_total = (((m.ytd_total + delta) * 100.0).round() / 100.0).max(0.0);
        if let Some(ts) = gift_ts {
            if m.last_gift_date.as_deref().map_or(true, |l| ts > l) {
                m.last_gift_date = Some(ts.to_string());
            }
        }
        (m.ytd_total, m.last_gift_date.clone())
    }

    /// Delete a gift. Gifts in a counted, finalized or synced batch are locked;
    /// the yearly import batch stays open to corrections.
    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let pos = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TitheError::UnknownTransaction(id.to_string()))?;
        let batch_id = &self.transactions[pos].batch_id;
        if let Some(batch) = self.batches.iter().find(|b| &b.id == batch_id) {
            let locked = match batch.status {
                BatchStatus::Open => false,
                BatchStatus::Synced => !batch.id.starts_with(batches::IMPORT_BATCH_PREFIX),
                BatchStatus::Counting | BatchStatus::Finalized => true,
            };
            if locked {
                return Err(TitheError::BatchNotOpen {
                    id: batch.id.clone(),
                    status: batch.status.to_string(),
                });
            }
        }
        let txn = self.transactions.remove(pos);
        let (ytd, _) = self.bump_member(&txn.member_id, -txn.amount, None);

        let outcome = store::delete_transaction(&self.conn, id);
        self.settle(outcome)?;
        if self.member(&txn.member_id).is_some() {
            let outcome = store::set_member_ytd(&self.conn, &txn.member_id, ytd, None);
            self.settle(outcome)?;
        }
        info!(txn = %id, amount = txn.amount, "transaction deleted");
        Ok(txn)
    }

    /// Delete the latest gift recorded in the open batch.
    pub fn undo_last(&mut self) -> Result<Option<Transaction>> {
        let batch = self.active_batch().cloned().ok_or(TitheError::NoActiveBatch)?;
        if batch.status != BatchStatus::Open {
            return Err(TitheError::BatchNotOpen {
                id: batch.id,
                status: batch.status.to_string(),
            });
        }
        let Some(last_id) = self
            .transactions
            .iter()
            .rev()
            .find(|t| t.batch_id == batch.id)
            .map(|t| t.id.clone())
        else {
            return Ok(None);
        };
        self.delete_transaction(&last_id).map(Some)
    }

    /// Filtered register, newest first, `per_page` rows per 1-based page.
    pub fn register(&self, filter: &RegisterFilter, page: usize, per_page: usize) -> Page<'_, Transaction> {
        let mut rows: Vec<&Transaction> = self.transactions.iter().filter(|t| filter.matches(t)).collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let per_page = per_page.max(1);
        let total_items = rows.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);
        let items = rows.into_iter().skip((page - 1) * per_page).take(per_page).collect();
        Page {
            items,
            page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn ledger() -> (tempfile::TempDir, Ledger) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, Ledger::load(conn).unwrap())
    }

    fn officer() -> Officer {
        Officer {
            id: "OFF-1".to_string(),
            name: "Deacon Kwesi".to_string(),
        }
    }

    fn session(week: u32) -> EntrySession {
        EntrySession {
            year: 2025,
            month: "JANUARY".to_string(),
            week,
        }
    }

    #[test]
    fn test_add_member_defaults() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("  Ama Boateng ", "", Fellowship::Thyatira).unwrap();
        assert!(m.id.starts_with("MEM-"));
        assert_eq!(m.name, "Ama Boateng");
        assert_eq!(m.phone, DEFAULT_PHONE);
        assert_eq!(m.status, MemberStatus::Active);
        assert_eq!(store::get_member(l.conn(), &m.id).unwrap(), Some(m));
    }

    #[test]
    fn test_quick_add_is_provisional() {
        let (_dir, mut l) = ledger();
        let m = l.quick_add("Yaw", None, Fellowship::Berea).unwrap();
        assert_eq!(m.status, MemberStatus::Provisional);
        let m = l
            .update_member(
                &m.id,
                MemberUpdate {
                    phone: Some("0244111222".to_string()),
                    status: Some(MemberStatus::Active),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(m.status, MemberStatus::Active);
        assert_eq!(store::get_member(l.conn(), &m.id).unwrap().unwrap().phone, "0244111222");
    }

    #[test]
    fn test_record_gift_updates_ytd_and_batch() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "0244000000", Fellowship::Smyrna).unwrap();
        let t = l
            .record_gift(&m.id, 50.0, PaymentMethod::Cash, &session(2), &officer())
            .unwrap();
        assert_eq!(t.timestamp, "2025-01-12T00:00:00.000Z");
        assert_eq!(t.fellowship, Fellowship::Smyrna);
        assert_eq!(t.officer_name, "Deacon Kwesi");
        assert_eq!(l.member(&m.id).unwrap().ytd_total, 50.0);

        let stored = store::get_member(l.conn(), &m.id).unwrap().unwrap();
        assert_eq!(stored.ytd_total, 50.0);
        assert_eq!(stored.last_gift_date.as_deref(), Some("2025-01-12T00:00:00.000Z"));
        assert_eq!(l.active_batch().unwrap().id, t.batch_id);
    }

    #[test]
    fn test_record_gift_validation_happens_before_writes() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        assert!(matches!(
            l.record_gift(&m.id, 0.0, PaymentMethod::Cash, &session(1), &officer()),
            Err(TitheError::InvalidAmount(_))
        ));
        assert!(matches!(
            l.record_gift(&m.id, -5.0, PaymentMethod::Cash, &session(1), &officer()),
            Err(TitheError::InvalidAmount(_))
        ));
        assert!(matches!(
            l.record_gift("MEM-x", 5.0, PaymentMethod::Cash, &session(1), &officer()),
            Err(TitheError::UnknownMember(_))
        ));
        assert!(matches!(
            l.record_gift(&m.id, 5.0, PaymentMethod::Cash, &session(6), &officer()),
            Err(TitheError::InvalidWeek(6))
        ));
        assert!(store::list_batches(l.conn()).unwrap().is_empty());
        assert!(store::list_transactions(l.conn()).unwrap().is_empty());
    }

    #[test]
    fn test_record_gift_refused_while_counting() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        let t = l
            .record_gift(&m.id, 10.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap();
        batches::begin_count(l.conn(), &t.batch_id).unwrap();
        l.fetch().unwrap();
        let err = l
            .record_gift(&m.id, 10.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap_err();
        assert!(matches!(err, TitheError::BatchNotOpen { .. }));
        assert_eq!(l.member(&m.id).unwrap().ytd_total, 10.0);
    }

    #[test]
    fn test_delete_transaction_floors_ytd() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        let t = l
            .record_gift(&m.id, 30.0, PaymentMethod::Momo, &session(1), &officer())
            .unwrap();
        store::set_member_ytd(l.conn(), &m.id, 10.0, None).unwrap();
        l.fetch().unwrap();
        l.delete_transaction(&t.id).unwrap();
        assert_eq!(l.member(&m.id).unwrap().ytd_total, 0.0);
        assert!(store::list_transactions(l.conn()).unwrap().iter().all(|x| x.id != t.id));
        assert!(matches!(
            l.delete_transaction(&t.id),
            Err(TitheError::UnknownTransaction(_))
        ));
    }

    #[test]
    fn test_delete_transaction_refused_in_finalized_batch() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        let t = l
            .record_gift(&m.id, 50.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap();
        batches::begin_count(l.conn(), &t.batch_id).unwrap();
        l.fetch().unwrap();
        assert!(matches!(
            l.delete_transaction(&t.id),
            Err(TitheError::BatchNotOpen { .. })
        ));

        let count = crate::reconciler::CashCount::parse_entries(&["50=1"]).unwrap();
        batches::finalize(l.conn(), &t.batch_id, &count, "x").unwrap();
        l.fetch().unwrap();
        let err = l.delete_transaction(&t.id).unwrap_err();
        assert!(matches!(err, TitheError::BatchNotOpen { ref status, .. } if status == "FINALIZED"));

        assert_eq!(store::transactions_for_batch(l.conn(), &t.batch_id).unwrap().len(), 1);
        assert_eq!(l.member(&m.id).unwrap().ytd_total, 50.0);
        let batch = store::get_batch(l.conn(), &t.batch_id).unwrap().unwrap();
        assert_eq!(batch.total_system, 50.0);
    }

    #[test]
    fn test_delete_transaction_allowed_in_import_batch() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        let batch = batches::ensure_import_batch(l.conn(), 2025).unwrap();
        let t = Transaction {
            id: "IMP-1".to_string(),
            batch_id: batch.id,
            member_id: m.id.clone(),
            member_name: m.name.clone(),
            fellowship: m.fellowship,
            amount: 20.0,
            method: PaymentMethod::Cash,
            timestamp: "2025-01-05T00:00:00.000Z".to_string(),
            officer_id: "ADMIN-IMPORT".to_string(),
            officer_name: "Excel Import".to_string(),
        };
        store::insert_transaction(l.conn(), &t).unwrap();
        l.fetch().unwrap();
        assert_eq!(l.delete_transaction("IMP-1").unwrap().id, "IMP-1");
        assert!(l.transactions().is_empty());
    }

    #[test]
    fn test_undo_last_removes_latest_in_open_batch() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        l.record_gift(&m.id, 10.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap();
        let second = l
            .record_gift(&m.id, 25.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap();
        let undone = l.undo_last().unwrap().unwrap();
        assert_eq!(undone.id, second.id);
        assert_eq!(l.member(&m.id).unwrap().ytd_total, 10.0);
        l.undo_last().unwrap();
        assert_eq!(l.undo_last().unwrap(), None);
    }

    #[test]
    fn test_undo_without_batch() {
        let (_dir, mut l) = ledger();
        assert!(matches!(l.undo_last(), Err(TitheError::NoActiveBatch)));
    }

    #[test]
    fn test_delete_member_cascades() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        l.record_gift(&m.id, 10.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap();
        assert_eq!(l.delete_member(&m.id).unwrap(), 1);
        assert!(store::list_transactions(l.conn()).unwrap().is_empty());
        l.fetch().unwrap();
        assert!(l.members().is_empty());
    }

    #[test]
    fn test_recompute_ytd_counts_only_the_year() {
        let (_dir, mut l) = ledger();
        let m = l.add_member("Ama", "", Fellowship::Smyrna).unwrap();
        l.record_gift(&m.id, 40.0, PaymentMethod::Cash, &session(1), &officer())
            .unwrap();
        let old = EntrySession {
            year: 2024,
            month: "DECEMBER".to_string(),
            week: 1,
        };
        l.record_gift(&m.id, 60.0, PaymentMethod::Cash, &old, &officer())
            .unwrap();
        assert_eq!(l.member(&m.id).unwrap().ytd_total, 100.0);

        assert_eq!(l.recompute_ytd(2025).unwrap(), 1);
        assert_eq!(store::get_member(l.conn(), &m.id).unwrap().unwrap().ytd_total, 40.0);
        assert_eq!(l.recompute_ytd(2025).unwrap(), 0);
    }

    #[test]
    fn test_search() {
        let (_dir, mut l) = ledger();
        l.add_member("Ama Boateng", "0244123456", Fellowship::Thyatira).unwrap();
        l.add_member("Kofi Mensah", "0200999888", Fellowship::Berea).unwrap();
        assert_eq!(l.search("a").len(), 0);
        assert_eq!(l.search("boat").len(), 1);
        assert_eq!(l.search("0200").len(), 1);
        assert_eq!(l.search("zz").len(), 0);
    }

    #[test]
    fn test_register_filters_and_pages() {
        let (_dir, mut l) = ledger();
        let a = l.add_member("Ama", "", Fellowship::Thyatira).unwrap();
        let b = l.add_member("Kofi", "", Fellowship::Berea).unwrap();
        for week in 1..=4 {
            l.record_gift(&a.id, 10.0 * week as f64, PaymentMethod::Cash, &session(week), &officer())
                .unwrap();
        }
        l.record_gift(&b.id, 500.0, PaymentMethod::Momo, &session(2), &officer())
            .unwrap();

        let all = l.register(&RegisterFilter::default(), 1, 2);
        assert_eq!(all.total_items, 5);
        assert_eq!(all.total_pages, 3);
        assert_eq!(all.items[0].timestamp, "2025-01-26T00:00:00.000Z");

        let momo = RegisterFilter {
            method: Some(PaymentMethod::Momo),
            ..Default::default()
        };
        assert_eq!(l.register(&momo, 1, 50).total_items, 1);

        let ranged = RegisterFilter {
            fellowship: Some(Fellowship::Thyatira),
            min_amount: Some(20.0),
            max_amount: Some(30.0),
            from: NaiveDate::from_ymd_opt(2025, 1, 1),
            to: NaiveDate::from_ymd_opt(2025, 1, 31),
            ..Default::default()
        };
        let page = l.register(&ranged, 9, 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_items, 2);
    }
}
