use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use tracing::{debug, info};

use crate::calendar::{self, MONTHS, WEEKS_PER_MONTH};
use crate::error::Result;
use crate::fellowship::{Fellowship, ALL_FELLOWSHIPS};
use crate::models::{Member, Transaction};

const FIRST_WEEK_COL: u16 = 2;

pub fn default_export_path(data_dir: &Path, year: i32) -> PathBuf {
    data_dir.join("exports").join(format!("Tithing_Report_{year}.xlsx"))
}

/// One (month, week) column of the sheet and the Sunday it stands for.
#[derive(Debug, Clone)]
struct WeekSlot {
    col: u16,
    date: NaiveDate,
    /// A week 5 that falls in the next month shares its Sunday with that month's
    /// week 1. Only one of the two columns may carry the amount.
    writes: bool,
}

fn week_slots(year: i32) -> Result<Vec<WeekSlot>> {
    let mut slots = Vec::with_capacity(MONTHS.len() * WEEKS_PER_MONTH as usize);
    let mut col = FIRST_WEEK_COL;
    for month in 1..=MONTHS.len() as u32 {
        for week in 1..=WEEKS_PER_MONTH {
            let date = calendar::sunday_date(year, month, week)?;
            let spills = date.month() != month;
            slots.push(WeekSlot {
                col,
                date,
                writes: !spills || month == 12,
            });
            col += 1;
        }
    }
    Ok(slots)
}

fn tab_color(fellowship: Fellowship) -> Color {
    let hex = fellowship.color_hex().trim_start_matches('#');
    Color::RGB(u32::from_str_radix(hex, 16).unwrap_or(0))
}

#[derive(Debug, Default, PartialEq)]
pub struct ExportSummary {
    pub sheets: usize,
    pub members: usize,
    pub cells: usize,
    pub total: f64,
}

/// Write the year's collection workbook: one sheet per fellowship, members by
/// name, month labels merged over their five week columns.
pub fn export_workbook(
    members: &[Member],
    transactions: &[Transaction],
    year: i32,
    path: &Path,
) -> Result<ExportSummary> {
    let slots = week_slots(year)?;

    // member id -> date -> summed amount
    let mut by_member: HashMap<&str, HashMap<&str, f64>> = HashMap::new();
    for t in transactions {
        *by_member
            .entry(t.member_id.as_str())
            .or_default()
            .entry(t.date())
            .or_default() += t.amount;
    }

    let header = Format::new().set_bold();
    let month_header = Format::new().set_bold().set_align(FormatAlign::Center);
    let ytd_col = FIRST_WEEK_COL + slots.len() as u16;

    let mut workbook = Workbook::new();
    let mut summary = ExportSummary::default();

    for fellowship in ALL_FELLOWSHIPS {
        let mut rows: Vec<&Member> = members.iter().filter(|m| m.fellowship == fellowship).collect();
        rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });

        let sheet = workbook.add_worksheet();
        sheet.set_name(fellowship.name())?;
        sheet.set_tab_color(tab_color(fellowship));
        sheet.write_string_with_format(1, 0, "MEMBER NAME", &header)?;
        sheet.write_string_with_format(1, 1, "CONTACT", &header)?;
        for (i, month) in MONTHS.iter().enumerate() {
            let first = FIRST_WEEK_COL + (i as u16) * WEEKS_PER_MONTH as u16;
            sheet.merge_range(0, first, 0, first + WEEKS_PER_MONTH as u16 - 1, month, &month_header)?;
            for w in 0..WEEKS_PER_MONTH as u16 {
                sheet.write_string_with_format(1, first + w, &format!("WEEK {}", w + 1), &header)?;
            }
        }
        sheet.write_string_with_format(1, ytd_col, "YEAR TO DATE TOTAL", &header)?;
        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(1, 14)?;

        for (i, m) in rows.iter().enumerate() {
            let row = 2 + i as u32;
            sheet.write_string(row, 0, &m.name)?;
            sheet.write_string(row, 1, &m.phone)?;
            if let Some(days) = by_member.get(m.id.as_str()) {
                for slot in slots.iter().filter(|s| s.writes) {
                    let key = slot.date.format("%Y-%m-%d").to_string();
                    let amount = days.get(key.as_str()).copied().unwrap_or(0.0);
                    if amount > 0.0 {
                        sheet.write_number(row, slot.col, amount)?;
                        summary.cells += 1;
                        summary.total += amount;
                    }
                }
            }
            sheet.write_number(row, ytd_col, m.ytd_total)?;
        }
        debug!(fellowship = %fellowship, members = rows.len(), "sheet written");
        summary.members += rows.len();
        summary.sheets += 1;
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    workbook.save(path)?;
    info!(path = %path.display(), members = summary.members, cells = summary.cells, "workbook exported");
    Ok(summary)
}
