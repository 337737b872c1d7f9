use std::path::PathBuf;

use crate::cli::connect;
use crate::error::Result;
use crate::exporter::{default_export_path, export_workbook};
use crate::fmt::money;
use crate::settings::{get_data_dir, load_settings};
use crate::store;

pub fn run(file: Option<String>, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| load_settings().year());
    let path = match file {
        Some(f) => PathBuf::from(f),
        None => default_export_path(&get_data_dir(), year),
    };

    let conn = connect()?;
    let members = store::list_members(&conn)?;
    let transactions = store::list_transactions(&conn)?;
    let summary = export_workbook(&members, &transactions, year, &path)?;

    println!("Exported {year} to {}", path.display());
    println!(
        "{} sheets, {} members, {} filled weeks ({})",
        summary.sheets,
        summary.members,
        summary.cells,
        money(summary.total)
    );
    Ok(())
}
