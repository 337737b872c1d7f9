use crate::cli::{officer, open_ledger};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::EntrySession;
use crate::models::PaymentMethod;
use crate::settings::load_settings;

pub fn run(
    member_id: &str,
    amount: f64,
    method: &str,
    year: Option<i32>,
    month: &str,
    week: u32,
) -> Result<()> {
    let method: PaymentMethod = method.parse()?;
    let settings = load_settings();
    let session = EntrySession {
        year: year.unwrap_or_else(|| settings.year()),
        month: month.to_string(),
        week,
    };

    let mut ledger = open_ledger()?;
    let txn = ledger.record_gift(member_id, amount, method, &session, &officer(&settings))?;
    let ytd = ledger.member(member_id).map_or(0.0, |m| m.ytd_total);

    println!(
        "Recorded {} {} from {} for {} {} week {} ({})",
        money(txn.amount),
        txn.method,
        txn.member_name,
        session.month.to_uppercase(),
        session.year,
        session.week,
        txn.date()
    );
    println!("Batch {}  |  {} YTD: {}", txn.batch_id, txn.member_name, money(ytd));
    Ok(())
}
