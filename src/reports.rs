use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar::{self, week_of_month, WEEKS_PER_MONTH};
use crate::error::{Result, TitheError};
use crate::fellowship::{Fellowship, ALL_FELLOWSHIPS};
use crate::models::{PaymentMethod, Transaction, ALL_METHODS};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// A reporting month, optionally narrowed to one week bucket (`week_of_month`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
    pub week: Option<u32>,
}

impl Period {
    pub fn new(year: i32, month_name: &str, week: Option<u32>) -> Result<Self> {
        let month = calendar::month_number(month_name)?;
        if let Some(w) = week {
            if !(1..=WEEKS_PER_MONTH).contains(&w) {
                return Err(TitheError::InvalidWeek(w));
            }
        }
        Ok(Self { year, month, week })
    }

    pub fn month_name(&self) -> &'static str {
        calendar::month_name(self.month).unwrap_or("")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year
            && date.month() == self.month
            && self.week.map_or(true, |w| week_of_month(date) == w)
    }

    /// Report subtitle, e.g. "JANUARY 2025 - WEEK 2" or "JANUARY 2025 - MONTHLY SUMMARY".
    pub fn title(&self) -> String {
        match self.week {
            Some(w) => format!("{} {} - WEEK {w}", self.month_name(), self.year),
            None => format!("{} {} - MONTHLY SUMMARY", self.month_name(), self.year),
        }
    }

    pub fn pdf_file_name(&self) -> String {
        let scope = match self.week {
            Some(w) => format!("Week {w}"),
            None => "Monthly".to_string(),
        };
        format!("Tithe Report ({} {} - {scope}).pdf", self.month_name(), self.year)
    }
}

// ---------------------------------------------------------------------------
// Period report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FellowshipTotal {
    pub fellowship: Fellowship,
    pub amount: f64,
}

/// Best or worst fellowship. Ties are listed together, comma separated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub names: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRow {
    pub fellowship: Fellowship,
    pub weeks: [f64; WEEKS_PER_MONTH as usize],
}

impl WeeklyRow {
    pub fn total(&self) -> f64 {
        self.weeks.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: f64,
    pub gifts: usize,
    pub givers: usize,
    pub average_gift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodShare {
    pub method: PaymentMethod,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period: Period,
    /// All ten fellowships, highest first; zeros included.
    pub breakdown: Vec<FellowshipTotal>,
    pub total: f64,
    pub best: Standing,
    pub worst: Standing,
    /// Whole-month weekly totals per fellowship, whatever week the period selects.
    pub weekly: Vec<WeeklyRow>,
    pub stats: DashboardStats,
    pub methods: Vec<MethodShare>,
}

fn standing(breakdown: &[FellowshipTotal], pick: f64) -> Standing {
    let names: Vec<&str> = breakdown
        .iter()
        .filter(|f| f.amount == pick)
        .map(|f| f.fellowship.name())
        .collect();
    Standing {
        names: if names.is_empty() {
            "N/A".to_string()
        } else {
            names.join(", ")
        },
        amount: pick,
    }
}

pub fn period_report(transactions: &[Transaction], period: &Period) -> PeriodReport {
    let dated: Vec<(NaiveDate, &Transaction)> = transactions
        .iter()
        .filter_map(|t| calendar::date_of(&t.timestamp).map(|d| (d, t)))
        .collect();
    let selected: Vec<&Transaction> = dated
        .iter()
        .filter(|(d, _)| period.contains(*d))
        .map(|(_, t)| *t)
        .collect();

    let mut breakdown: Vec<FellowshipTotal> = ALL_FELLOWSHIPS
        .iter()
        .map(|&f| FellowshipTotal {
            fellowship: f,
            amount: round2(selected.iter().filter(|t| t.fellowship == f).map(|t| t.amount).sum()),
        })
        .collect();
    // stable: equal amounts keep fellowship order
    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let total = round2(selected.iter().map(|t| t.amount).sum());
    let max = breakdown.first().map_or(0.0, |f| f.amount);
    let min = breakdown.last().map_or(0.0, |f| f.amount);

    let month = Period { week: None, ..*period };
    let weekly = ALL_FELLOWSHIPS
        .iter()
        .map(|&f| {
            let mut weeks = [0.0; WEEKS_PER_MONTH as usize];
            for (d, t) in dated.iter().filter(|(d, t)| t.fellowship == f && month.contains(*d)) {
                weeks[(week_of_month(*d) - 1) as usize] += t.amount;
            }
            WeeklyRow {
                fellowship: f,
                weeks: weeks.map(round2),
            }
        })
        .collect();

    let givers: HashSet<&str> = selected.iter().map(|t| t.member_id.as_str()).collect();
    let stats = DashboardStats {
        total,
        gifts: selected.len(),
        givers: givers.len(),
        average_gift: if selected.is_empty() {
            0.0
        } else {
            round2(total / selected.len() as f64)
        },
    };

    let methods = ALL_METHODS
        .iter()
        .map(|&m| {
            let of_method: Vec<&&Transaction> = selected.iter().filter(|t| t.method == m).collect();
            MethodShare {
                method: m,
                amount: round2(of_method.iter().map(|t| t.amount).sum()),
                count: of_method.len(),
            }
        })
        .collect();

    PeriodReport {
        period: *period,
        best: standing(&breakdown, max),
        worst: standing(&breakdown, min),
        breakdown,
        total,
        weekly,
        stats,
        methods,
    }
}
