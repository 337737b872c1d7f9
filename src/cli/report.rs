use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{connect, print_json};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::{period_report, Period, PeriodReport};
use crate::settings::load_settings;
use crate::store;

fn build(year: Option<i32>, month: &str, week: Option<u32>) -> Result<PeriodReport> {
    let year = year.unwrap_or_else(|| load_settings().year());
    let period = Period::new(year, month, week)?;
    let conn = connect()?;
    let txns = store::list_transactions(&conn)?;
    Ok(period_report(&txns, &period))
}

/// Terminal rendering of a period report.
pub(crate) fn format_summary(report: &PeriodReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", report.period.title().bold()));

    let mut table = Table::new();
    table.set_header(vec!["Fellowship", "Pastor", "Amount"]);
    for row in &report.breakdown {
        table.add_row(vec![
            Cell::new(row.fellowship),
            Cell::new(row.fellowship.pastor()),
            Cell::new(money(row.amount)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL".bold()),
        Cell::new(""),
        Cell::new(money(report.total).bold()),
    ]);
    out.push_str(&format!("{table}\n"));

    out.push_str(&format!(
        "Highest: {} ({})\n",
        report.best.names.green(),
        money(report.best.amount)
    ));
    out.push_str(&format!(
        "Lowest:  {} ({})\n",
        report.worst.names.red(),
        money(report.worst.amount)
    ));
    out.push_str(&format!(
        "{} gifts from {} givers, average {}\n",
        report.stats.gifts,
        report.stats.givers,
        money(report.stats.average_gift)
    ));
    let methods: Vec<String> = report
        .methods
        .iter()
        .map(|m| format!("{} {} ({})", m.method, money(m.amount), m.count))
        .collect();
    out.push_str(&format!("By method: {}\n", methods.join("  ")));

    let mut weekly = Table::new();
    weekly.set_header(vec!["Fellowship", "W1", "W2", "W3", "W4", "W5", "Total"]);
    for row in &report.weekly {
        let mut cells = vec![Cell::new(row.fellowship)];
        cells.extend(row.weeks.iter().map(|w| Cell::new(money(*w))));
        cells.push(Cell::new(money(row.total())));
        weekly.add_row(cells);
    }
    out.push_str(&format!("\nWeekly trends ({})\n{weekly}", report.period.month_name()));
    out
}

pub fn summary(year: Option<i32>, month: &str, week: Option<u32>, json: bool) -> Result<()> {
    let report = build(year, month, week)?;
    if json {
        return print_json(&report);
    }
    println!("{}", format_summary(&report));
    Ok(())
}

#[cfg(feature = "pdf")]
pub fn pdf(year: Option<i32>, month: &str, week: Option<u32>, output: Option<String>) -> Result<()> {
    use std::path::PathBuf;

    let report = build(year, month, week)?;
    let path = match output {
        Some(p) => PathBuf::from(p),
        None => crate::settings::get_data_dir()
            .join("exports")
            .join(report.period.pdf_file_name()),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = crate::pdf::render_period_report(&report)?;
    std::fs::write(&path, bytes)?;
    println!("Report saved to {}", path.display());
    Ok(())
}
