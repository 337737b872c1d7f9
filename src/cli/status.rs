use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::settings::load_settings;
use crate::store;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("tithe.db");

    println!("Officer:    {}", settings.officer_label());
    println!("Year:       {}", settings.year());
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `tithe init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&db_path)?;
    let members: i64 = conn.query_row("SELECT count(*) FROM members", [], |r| r.get(0))?;
    let provisional: i64 = conn.query_row(
        "SELECT count(*) FROM members WHERE status = 'PROVISIONAL'",
        [],
        |r| r.get(0),
    )?;
    let (gifts, total): (i64, f64) = conn.query_row(
        "SELECT count(*), COALESCE(SUM(amount), 0) FROM transactions",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

    println!();
    println!("Members:       {members} ({provisional} provisional)");
    println!("Gifts:         {gifts} ({})", money(total));
    println!("Imports:       {imports}");
    match store::find_active_batch(&conn)? {
        Some(b) => println!("Active batch:  {} [{}] opened {}", b.id, b.status, b.date),
        None => println!("Active batch:  (none)"),
    }
    Ok(())
}
