use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use crate::cli::{open_ledger, print_json};
use crate::error::{Result, TitheError};
use crate::fmt::money;
use crate::ledger::RegisterFilter;
use crate::models::Transaction;

fn parse_date(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| TitheError::Other(format!("--{flag} must be YYYY-MM-DD, got {s:?}")))
    })
    .transpose()
}

pub struct ListArgs<'a> {
    pub method: Option<&'a str>,
    pub fellowship: Option<&'a str>,
    pub member: Option<&'a str>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub page: usize,
    pub per_page: usize,
    pub csv: bool,
    pub json: bool,
}

fn write_csv(rows: &[&Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    wtr.write_record([
        "id", "date", "member_id", "member_name", "fellowship", "amount", "method", "batch_id", "officer",
    ])?;
    for t in rows {
        let amount = format!("{:.2}", t.amount);
        wtr.write_record([
            t.id.as_str(),
            t.date(),
            t.member_id.as_str(),
            t.member_name.as_str(),
            t.fellowship.name(),
            amount.as_str(),
            t.method.as_str(),
            t.batch_id.as_str(),
            t.officer_id.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn list(args: ListArgs) -> Result<()> {
    let filter = RegisterFilter {
        method: args.method.map(str::parse).transpose()?,
        fellowship: args.fellowship.map(str::parse).transpose()?,
        member_id: args.member.map(str::to_string),
        min_amount: args.min,
        max_amount: args.max,
        from: parse_date(args.from, "from")?,
        to: parse_date(args.to, "to")?,
    };
    let ledger = open_ledger()?;

    if args.csv {
        let all = ledger.register(&filter, 1, usize::MAX);
        return write_csv(&all.items);
    }

    let page = ledger.register(&filter, args.page, args.per_page);
    if args.json {
        return print_json(&page.items);
    }
    if page.total_items == 0 {
        println!("No transactions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Member", "Fellowship", "Method", "Amount", "Batch"]);
    let mut sum = 0.0;
    for t in &page.items {
        sum += t.amount;
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(t.date()),
            Cell::new(&t.member_name),
            Cell::new(t.fellowship),
            Cell::new(t.method),
            Cell::new(money(t.amount)),
            Cell::new(&t.batch_id),
        ]);
    }
    println!("{table}");
    println!(
        "Page {}/{}  |  {} matching  |  {} on this page",
        page.page,
        page.total_pages,
        page.total_items,
        money(sum)
    );
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut ledger = open_ledger()?;
    let t = ledger.delete_transaction(id)?;
    println!("Deleted {} gift of {} from {}", t.method, money(t.amount), t.member_name);
    Ok(())
}

pub fn undo() -> Result<()> {
    let mut ledger = open_ledger()?;
    match ledger.undo_last()? {
        Some(t) => println!("Undid {} from {} ({})", money(t.amount), t.member_name, t.id),
        None => println!("Nothing to undo in the open batch."),
    }
    Ok(())
}
