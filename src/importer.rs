use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use calamine::{Data, Reader};
use regex::Regex;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::batches;
use crate::calendar::{self, WEEKS_PER_MONTH};
use crate::error::Result;
use crate::fellowship::Fellowship;
use crate::identity::{derive_id, plan_merge};
use crate::ledger::DEFAULT_PHONE;
use crate::models::{Member, MemberStatus, PaymentMethod, Transaction};
use crate::store;

pub const IMPORT_OFFICER_ID: &str = "ADMIN-IMPORT";
pub const IMPORT_OFFICER_NAME: &str = "Excel Import";
pub const CHUNK_SIZE: usize = 500;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn week_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^WEEK\s*(\d+)").expect("static regex"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

fn upper(cell: &Data) -> String {
    cell_text(cell).to_uppercase()
}

/// Numeric cells only; text that merely looks like a number is not an amount.
fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// First `limit` warnings, then a single "...and N more" line.
pub fn summarize_warnings(warnings: &[String], limit: usize) -> Vec<String> {
    let mut out: Vec<String> = warnings.iter().take(limit).cloned().collect();
    if warnings.len() > limit {
        out.push(format!("...and {} more", warnings.len() - limit));
    }
    out
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ImportPreview {
    pub members: Vec<Member>,
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<String>,
    /// Fellowship sheets read, with the member rows each contributed.
    pub sheets: Vec<(String, Fellowship, usize)>,
}

impl ImportPreview {
    /// Add a sheet's rows. Ids are deterministic, so a repeat of a member or a
    /// (member, week) cell replaces the earlier one like the store upsert would.
    fn absorb(&mut self, sheet: ImportPreview) {
        let mut member_idx: HashMap<String, usize> = self
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        for m in sheet.members {
            match member_idx.get(&m.id) {
                Some(&i) => {
                    self.warnings.push(format!(
                        "\"{}\" appears more than once; the row in {} wins",
                        m.name, m.fellowship
                    ));
                    self.members[i] = m;
                }
                None => {
                    member_idx.insert(m.id.clone(), self.members.len());
                    self.members.push(m);
                }
            }
        }
        let mut txn_idx: HashMap<String, usize> = self
            .transactions
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        for t in sheet.transactions {
            match txn_idx.get(&t.id) {
                Some(&i) => self.transactions[i] = t,
                None => {
                    txn_idx.insert(t.id.clone(), self.transactions.len());
                    self.transactions.push(t);
                }
            }
        }
        self.warnings.extend(sheet.warnings);
        self.sheets.extend(sheet.sheets);
    }

    pub fn total_amount(&self) -> f64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}

/// Read every fellowship sheet of a collection workbook for `year`.
pub fn parse_workbook(file_path: &Path, year: i32) -> Result<ImportPreview> {
    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let mut preview = ImportPreview::default();

    for sheet_name in workbook.sheet_names() {
        let Some(fellowship) = Fellowship::match_sheet_name(&sheet_name) else {
            debug!(sheet = %sheet_name, "no fellowship match; skipping");
            continue;
        };
        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(r) => r,
            Err(e) => {
                warn!(sheet = %sheet_name, error = %e, "unreadable sheet");
                preview
                    .warnings
                    .push(format!("Skipping sheet \"{sheet_name}\": {e}"));
                continue;
            }
        };
        let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
        preview.absorb(parse_sheet(&sheet_name, fellowship, &rows, year));
    }

    info!(
        members = preview.members.len(),
        transactions = preview.transactions.len(),
        warnings = preview.warnings.len(),
        "workbook parsed"
    );
    Ok(preview)
}

fn find_header(rows: &[Vec<Data>], a: &str, b: &str) -> Option<usize> {
    rows.iter().position(|row| {
        let joined = row.iter().map(upper).collect::<Vec<_>>().join(" ");
        joined.contains(a) && joined.contains(b)
    })
}

fn find_column(header: &[Data], label: &str) -> Option<usize> {
    header.iter().position(|c| upper(c).contains(label))
}

/// Parse one fellowship sheet. Layout problems become warnings, never errors.
pub fn parse_sheet(
    sheet_name: &str,
    fellowship: Fellowship,
    rows: &[Vec<Data>],
    year: i32,
) -> ImportPreview {
    let mut out = ImportPreview::default();

    let Some(header_idx) = find_header(rows, "MEMBER NAME", "CONTACT")
        .or_else(|| find_header(rows, "MEMBER NAME", "MEMBER ID"))
    else {
        warn!(sheet = %sheet_name, "no header row");
        out.warnings.push(format!(
            "Skipping sheet \"{sheet_name}\": Could not find 'MEMBER NAME' and 'CONTACT' header row."
        ));
        return out;
    };
    let header = &rows[header_idx];
    let month_row = header_idx.checked_sub(1).map(|i| &rows[i]);

    let Some(name_col) = find_column(header, "MEMBER NAME") else {
        return out;
    };
    let contact_col = find_column(header, "CONTACT");
    let ytd_col = find_column(header, "YEAR TO DATE TOTAL");

    // column -> (month, week); month labels carry forward across merged cells
    let mut week_cols: Vec<(usize, &'static str, u32)> = Vec::new();
    let mut current_month: Option<&'static str> = None;
    let mut orphan_weeks = 0usize;
    for (col, cell) in header.iter().enumerate() {
        if let Some(label) = month_row.and_then(|r| r.get(col)) {
            if let Some(m) = calendar::find_month_in(&cell_text(label)) {
                current_month = Some(m);
            }
        }
        let text = upper(cell);
        let Some(caps) = week_header().captures(&text) else {
            continue;
        };
        let Ok(week) = caps[1].parse::<u32>() else {
            continue;
        };
        match current_month {
            Some(m) if (1..=WEEKS_PER_MONTH).contains(&week) => week_cols.push((col, m, week)),
            Some(m) => out.warnings.push(format!(
                "Sheet \"{sheet_name}\": ignoring {text} under {m}"
            )),
            None => orphan_weeks += 1,
        }
    }
    if orphan_weeks > 0 {
        out.warnings.push(format!(
            "Sheet \"{sheet_name}\": {orphan_weeks} week column(s) have no month label above them"
        ));
    }

    let mut member_rows = 0usize;
    for row in &rows[header_idx + 1..] {
        let name = row.get(name_col).map(cell_text).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let member_id = derive_id(&name);
        let phone = contact_col
            .and_then(|c| row.get(c))
            .map(cell_text)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PHONE.to_string());
        let ytd = ytd_col
            .and_then(|c| row.get(c))
            .and_then(cell_number)
            .unwrap_or(0.0);

        let mut last_gift: Option<String> = None;
        for &(col, month, week) in &week_cols {
            let Some(amount) = row.get(col).and_then(cell_number).filter(|a| *a > 0.0) else {
                continue;
            };
            let timestamp = match calendar::sunday_of(year, month, week) {
                Ok(ts) => ts,
                Err(e) => {
                    out.warnings.push(format!("Sheet \"{sheet_name}\", {name}: {e}"));
                    continue;
                }
            };
            if last_gift.as_deref().map_or(true, |l| timestamp.as_str() > l) {
                last_gift = Some(timestamp.clone());
            }
            out.transactions.push(Transaction {
                id: format!("IMP-{member_id}-{timestamp}-{week}"),
                batch_id: batches::import_batch_id(year),
                member_id: member_id.clone(),
                member_name: name.clone(),
                fellowship,
                amount,
                method: PaymentMethod::Cash,
                timestamp,
                officer_id: IMPORT_OFFICER_ID.to_string(),
                officer_name: IMPORT_OFFICER_NAME.to_string(),
            });
        }

        out.members.push(Member {
            id: member_id,
            name,
            phone,
            fellowship,
            status: MemberStatus::Active,
            ytd_total: ytd,
            last_gift_date: last_gift,
        });
        member_rows += 1;
    }

    debug!(sheet = %sheet_name, members = member_rows, weeks = week_cols.len(), "sheet parsed");
    out.sheets.push((sheet_name.to_string(), fellowship, member_rows));
    out
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
pub struct ImportOutcome {
    pub members_written: usize,
    pub transactions_written: usize,
    /// Existing duplicate members folded into a survivor.
    pub merged: usize,
    /// Incoming members that landed on an existing member with another id.
    pub redirected: usize,
    /// The same file (by checksum) was imported before.
    pub previously_imported: bool,
}

/// Write a parsed preview: fold duplicates, upsert members and the year's import
/// batch, then upsert transactions in chunks of `CHUNK_SIZE`, one SQLite
/// transaction per chunk. A failed chunk stops the import; earlier chunks stay.
pub fn commit_import(
    conn: &Connection,
    preview: &ImportPreview,
    year: i32,
    source: Option<&Path>,
) -> Result<ImportOutcome> {
    let mut outcome = ImportOutcome::default();

    let checksum = source.map(compute_checksum).transpose()?;
    if let Some(sum) = &checksum {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        outcome.previously_imported = stmt.exists([sum])?;
        if outcome.previously_imported {
            info!("file was imported before; re-applying");
        }
    }

    let existing = store::list_members(conn)?;
    let plan = plan_merge(&existing, &preview.members);

    {
        let tx = conn.unchecked_transaction()?;
        for (victim, survivor) in &plan.victims {
            let moved = store::reassign_transactions(&tx, victim, survivor)?;
            store::delete_member(&tx, victim)?;
            debug!(victim = %victim, survivor = %survivor, moved, "merged duplicate member");
        }
        outcome.merged = plan.victims.len();

        for m in &preview.members {
            let target = plan.target_for(&m.id);
            if target != m.id {
                outcome.redirected += 1;
            }
            let member = Member {
                id: target.to_string(),
                ..m.clone()
            };
            store::upsert_member(&tx, &member)?;
            outcome.members_written += 1;
        }
        batches::ensure_import_batch(&tx, year)?;
        tx.commit()?;
    }

    let redirected: Vec<Transaction> = preview
        .transactions
        .iter()
        .map(|t| Transaction {
            member_id: plan.target_for(&t.member_id).to_string(),
            ..t.clone()
        })
        .collect();

    for (i, chunk) in redirected.chunks(CHUNK_SIZE).enumerate() {
        let tx = conn.unchecked_transaction()?;
        for t in chunk {
            if let Err(e) = store::upsert_transaction(&tx, t) {
                warn!(chunk = i, txn = %t.id, error = %e, "import chunk failed; stopping");
                return Err(e);
            }
        }
        tx.commit()?;
        outcome.transactions_written += chunk.len();
        debug!(chunk = i, rows = chunk.len(), "import chunk committed");
    }

    let filename = source
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");
    conn.execute(
        "INSERT INTO imports (filename, fiscal_year, member_count, transaction_count, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            filename,
            year,
            outcome.members_written as i64,
            outcome.transactions_written as i64,
            checksum,
        ],
    )?;

    info!(
        members = outcome.members_written,
        transactions = outcome.transactions_written,
        merged = outcome.merged,
        "import committed"
    );
    Ok(outcome)
}

/// Parse then commit.
pub fn import_workbook(
    conn: &Connection,
    file_path: &Path,
    year: i32,
) -> Result<(ImportPreview, ImportOutcome)> {
    let preview = parse_workbook(file_path, year)?;
    let outcome = commit_import(conn, &preview, year, Some(file_path))?;
    Ok((preview, outcome))
}
