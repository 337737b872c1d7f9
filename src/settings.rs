use std::path::PathBuf;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TitheError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_officer_id")]
    pub officer_id: String,
    #[serde(default)]
    pub officer_name: String,
    /// Year used when a command does not pass `--year`.
    #[serde(default)]
    pub fiscal_year: Option<i32>,
}

fn default_officer_id() -> String {
    "sys".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            officer_id: default_officer_id(),
            officer_name: String::new(),
            fiscal_year: None,
        }
    }
}

impl Settings {
    pub fn year(&self) -> i32 {
        self.fiscal_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn officer_label(&self) -> &str {
        if self.officer_name.is_empty() {
            &self.officer_id
        } else {
            &self.officer_name
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tithe")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tithe")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TitheError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn db_path() -> PathBuf {
    get_data_dir().join("tithe.db")
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
