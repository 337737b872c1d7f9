pub mod backup;
pub mod batch;
pub mod export;
pub mod give;
pub mod import;
pub mod init;
pub mod members;
pub mod reconcile;
pub mod report;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use crate::db::get_connection;
use crate::error::{Result, TitheError};
use crate::ledger::{Ledger, Officer};
use crate::settings::{db_path, Settings};

/// Connection to the configured database, refusing to create one implicitly.
pub(crate) fn connect() -> Result<Connection> {
    let path = db_path();
    if !path.exists() {
        return Err(TitheError::Other(format!(
            "Database not found at {}. Run `tithe init` first.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn open_ledger() -> Result<Ledger> {
    Ledger::load(connect()?)
}

pub(crate) fn officer(settings: &Settings) -> Officer {
    Officer {
        id: settings.officer_id.clone(),
        name: settings.officer_name.clone(),
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| TitheError::Other(e.to_string()))?;
    println!("{json}");
    Ok(())
}

#[derive(Parser)]
#[command(
    name = "tithe",
    version,
    about = "Church tithe ledger: members, weekly gifts, cash counts and Excel import/export."
)]
pub struct Cli {
    /// Log level for this crate when RUST_LOG is not set.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for tithe data (default: ~/Documents/tithe)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Officer id stamped on recorded gifts
        #[arg(long = "officer-id")]
        officer_id: Option<String>,
        /// Officer display name
        #[arg(long = "officer-name")]
        officer_name: Option<String>,
        /// Default fiscal year for commands that take --year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show the database location and ledger counts.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/tithe-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Manage the member directory.
    Members {
        #[command(subcommand)]
        command: MembersCommands,
    },
    /// Record a gift in the open batch.
    Give {
        /// Member id
        member_id: String,
        /// Amount in GH₵
        amount: f64,
        /// CASH, MOMO or CHECK
        #[arg(long, default_value = "CASH")]
        method: String,
        /// Collection year (default: settings fiscal year)
        #[arg(long)]
        year: Option<i32>,
        /// Collection month, e.g. JANUARY
        #[arg(long)]
        month: String,
        /// Collection week of the month (1-5)
        #[arg(long)]
        week: u32,
    },
    /// Browse and correct recorded gifts.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Count, finalize and sync collection batches.
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },
    /// Preview a cash count against the active batch without changing it.
    Reconcile {
        /// Denomination tally as DENOM=QTY, e.g. --count 200=3 --count 0.5=4
        #[arg(long = "count")]
        counts: Vec<String>,
    },
    /// Import a collection workbook (one sheet per fellowship).
    Import {
        /// Path to the .xlsx workbook
        file: String,
        /// Year the sheet's months belong to
        #[arg(long)]
        year: Option<i32>,
        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Export the year's gifts to a collection workbook.
    Export {
        /// Output path (default: <data_dir>/exports/Tithing_Report_<year>.xlsx)
        file: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Period reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
pub enum MembersCommands {
    /// Add a member.
    Add {
        name: String,
        #[arg(long)]
        fellowship: String,
        #[arg(long)]
        phone: Option<String>,
        /// Add as a provisional walk-in giver
        #[arg(long)]
        provisional: bool,
    },
    /// List members.
    List {
        #[arg(long)]
        fellowship: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one member and their gift history.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Find members by name or phone (at least 2 characters).
    Search {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Change a member's details.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        fellowship: Option<String>,
        /// ACTIVE or PROVISIONAL
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a member and all of their gifts.
    Delete { id: String },
    /// Rebuild year-to-date totals from recorded gifts.
    RecomputeYtd {
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// Filtered register, newest first.
    List {
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        fellowship: Option<String>,
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        /// From date: YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// To date: YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long = "per-page", default_value_t = 50)]
        per_page: usize,
        /// Write every matching row as CSV to stdout
        #[arg(long, conflicts_with = "json")]
        csv: bool,
        #[arg(long)]
        json: bool,
    },
    /// Delete one gift.
    Delete { id: String },
    /// Delete the latest gift in the open batch.
    Undo,
}

#[derive(Subcommand)]
pub enum BatchCommands {
    /// Show the active batch.
    Show,
    /// List all batches.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Freeze entry on the active batch and preview the count.
    Count {
        #[arg(long = "count")]
        counts: Vec<String>,
    },
    /// Finalize the counting batch; refused unless the count balances.
    Finalize {
        #[arg(long = "count")]
        counts: Vec<String>,
    },
    /// Mark a finalized batch as synced.
    Sync {
        /// Batch id (default: latest finalized batch)
        id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Fellowship breakdown, standings and weekly trends.
    Summary {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: String,
        /// Week bucket 1-5 (days 1-7, 8-14, ...); omit for the whole month
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Write the financial report as PDF.
    #[cfg(feature = "pdf")]
    Pdf {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: String,
        #[arg(long)]
        week: Option<u32>,
        /// Output path (default: <data_dir>/exports/Tithe Report (...).pdf)
        #[arg(long)]
        output: Option<String>,
    },
}
