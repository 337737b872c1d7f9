use comfy_table::{Cell, Table};

use crate::cli::{connect, open_ledger, print_json};
use crate::error::{Result, TitheError};
use crate::fellowship::Fellowship;
use crate::fmt::money;
use crate::ledger::MemberUpdate;
use crate::models::{Member, MemberStatus};
use crate::settings::load_settings;
use crate::store;

fn members_table(members: &[&Member]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Phone", "Fellowship", "Status", "YTD", "Last Gift"]);
    for m in members {
        table.add_row(vec![
            Cell::new(&m.id),
            Cell::new(&m.name),
            Cell::new(&m.phone),
            Cell::new(m.fellowship),
            Cell::new(m.status.as_str()),
            Cell::new(money(m.ytd_total)),
            Cell::new(m.last_gift_date.as_deref().map(|d| d.get(..10).unwrap_or(d)).unwrap_or("")),
        ]);
    }
    table
}

pub fn add(name: &str, fellowship: &str, phone: Option<&str>, provisional: bool) -> Result<()> {
    let fellowship: Fellowship = fellowship.parse()?;
    let mut ledger = open_ledger()?;
    let member = if provisional {
        ledger.quick_add(name, phone, fellowship)?
    } else {
        ledger.add_member(name, phone.unwrap_or(""), fellowship)?
    };
    println!("Added {} ({}) to {}", member.name, member.id, member.fellowship);
    Ok(())
}

pub fn list(fellowship: Option<&str>, json: bool) -> Result<()> {
    let filter: Option<Fellowship> = fellowship.map(str::parse).transpose()?;
    let ledger = open_ledger()?;
    let mut members: Vec<&Member> = ledger
        .members()
        .iter()
        .filter(|m| filter.map_or(true, |f| m.fellowship == f))
        .collect();
    members.sort_by(|a, b| {
        a.fellowship
            .cmp(&b.fellowship)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    if json {
        return print_json(&members);
    }
    if members.is_empty() {
        println!("No members.");
        return Ok(());
    }
    println!("Members ({})\n{}", members.len(), members_table(&members));
    Ok(())
}

/// One member with their gift history, read straight from the database.
pub fn show(id: &str, json: bool) -> Result<()> {
    let conn = connect()?;
    let member = store::get_member(&conn, id)?.ok_or_else(|| TitheError::UnknownMember(id.to_string()))?;
    let gifts = store::transactions_for_member(&conn, id)?;
    if json {
        return print_json(&serde_json::json!({ "member": member, "gifts": gifts }));
    }

    println!("{}", members_table(&[&member]));
    if gifts.is_empty() {
        println!("No gifts recorded.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Method", "Amount", "Batch", "Officer"]);
    for t in &gifts {
        table.add_row(vec![
            Cell::new(t.date()),
            Cell::new(t.method),
            Cell::new(money(t.amount)),
            Cell::new(&t.batch_id),
            Cell::new(&t.officer_id),
        ]);
    }
    let total: f64 = gifts.iter().map(|t| t.amount).sum();
    println!("{table}");
    println!("{} gift(s), {} in all", gifts.len(), money(total));
    Ok(())
}

pub fn search(query: &str, json: bool) -> Result<()> {
    let ledger = open_ledger()?;
    let found = ledger.search(query);
    if json {
        return print_json(&found);
    }
    if found.is_empty() {
        println!("No members match \"{query}\" (searches need at least 2 characters).");
        return Ok(());
    }
    println!("{}", members_table(&found));
    Ok(())
}

pub fn edit(
    id: &str,
    name: Option<String>,
    phone: Option<String>,
    fellowship: Option<&str>,
    status: Option<&str>,
) -> Result<()> {
    let update = MemberUpdate {
        name,
        phone,
        fellowship: fellowship.map(str::parse).transpose()?,
        status: status.map(str::parse::<MemberStatus>).transpose()?,
    };
    let mut ledger = open_ledger()?;
    let m = ledger.update_member(id, update)?;
    println!(
        "Updated {}: {} / {} / {} / {}",
        m.id,
        m.name,
        m.phone,
        m.fellowship,
        m.status.as_str()
    );
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut ledger = open_ledger()?;
    let name = ledger.member(id).map(|m| m.name.clone()).unwrap_or_default();
    let removed = ledger.delete_member(id)?;
    println!("Deleted {name} ({id}) and {removed} gift(s)");
    Ok(())
}

pub fn recompute_ytd(year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| load_settings().year());
    let mut ledger = open_ledger()?;
    let changed = ledger.recompute_ytd(year)?;
    println!("Recomputed {year} totals: {changed} member(s) corrected");
    Ok(())
}
