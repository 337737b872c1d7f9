use std::path::PathBuf;

use comfy_table::{Cell, Table};

use crate::cli::connect;
use crate::error::Result;
use crate::fmt::money;
use crate::importer::{import_workbook, parse_workbook, summarize_warnings, ImportPreview};
use crate::settings::load_settings;

const WARNING_LIMIT: usize = 5;

fn print_preview(preview: &ImportPreview, year: i32) {
    let mut table = Table::new();
    table.set_header(vec!["Sheet", "Fellowship", "Members"]);
    for (sheet, fellowship, count) in &preview.sheets {
        table.add_row(vec![Cell::new(sheet), Cell::new(fellowship), Cell::new(count)]);
    }
    if !preview.sheets.is_empty() {
        println!("{table}");
    }
    println!(
        "{} members, {} gifts totalling {} for {year}",
        preview.members.len(),
        preview.transactions.len(),
        money(preview.total_amount())
    );
    if !preview.warnings.is_empty() {
        println!("Warnings:");
        for w in summarize_warnings(&preview.warnings, WARNING_LIMIT) {
            println!("  - {w}");
        }
    }
}

pub fn run(file: &str, year: Option<i32>, dry_run: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let year = year.unwrap_or_else(|| load_settings().year());

    if dry_run {
        print_preview(&parse_workbook(&file_path, year)?, year);
        println!("Dry run: nothing written.");
        return Ok(());
    }

    let conn = connect()?;
    let (preview, outcome) = import_workbook(&conn, &file_path, year)?;
    print_preview(&preview, year);
    if outcome.previously_imported {
        println!("Note: this file was imported before; existing rows were updated in place.");
    }
    println!(
        "{} members and {} gifts written",
        outcome.members_written, outcome.transactions_written
    );
    if outcome.merged > 0 || outcome.redirected > 0 {
        println!(
            "{} duplicate member(s) merged, {} matched to existing members",
            outcome.merged, outcome.redirected
        );
    }
    Ok(())
}
