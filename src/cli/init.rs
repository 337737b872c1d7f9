use std::path::PathBuf;

use tracing::info;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(
    data_dir: Option<String>,
    officer_id: Option<String>,
    officer_name: Option<String>,
    year: Option<i32>,
) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(id) = officer_id {
        settings.officer_id = id;
    }
    if let Some(name) = officer_name {
        settings.officer_name = name;
    }
    if year.is_some() {
        settings.fiscal_year = year;
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;
    std::fs::create_dir_all(resolved.join("backups"))?;

    let conn = get_connection(&resolved.join("tithe.db"))?;
    init_db(&conn)?;
    info!(dir = %resolved.display(), "database initialized");

    println!("Initialized tithe at {}", resolved.display());
    Ok(())
}
