use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, TitheError};
use crate::models::{PaymentMethod, Transaction};

/// Note denominations in GH₵, largest first.
pub const STANDARD_DENOMINATIONS: [f64; 8] = [200.0, 100.0, 50.0, 20.0, 10.0, 5.0, 2.0, 1.0];

/// Largest denomination accepted in a count, in GH₵.
pub const MAX_DENOMINATION: f64 = 1000.0;

pub const SHORTAGE_HINT: &str = "Please recount or check for missing transaction slips.";
pub const OVERAGE_HINT: &str = "Please check for unentered transactions.";

/// Physical tally of a cash drawer. Keys are denominations in pesewas so that
/// coins (0.50, 0.20, ...) sort and compare exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashCount {
    counts: BTreeMap<u64, u32>,
    pesewas: u64,
}

impl CashCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for a denomination, replacing any earlier entry.
    /// The count's total must stay representable in pesewas.
    pub fn set(&mut self, denomination: f64, quantity: u32) -> Result<()> {
        if !denomination.is_finite() || denomination <= 0.0 {
            return Err(TitheError::InvalidCount(format!(
                "denomination must be positive, got {denomination}"
            )));
        }
        if denomination > MAX_DENOMINATION {
            return Err(TitheError::InvalidCount(format!(
                "denomination {denomination} exceeds {MAX_DENOMINATION}"
            )));
        }
        let pesewas = (denomination * 100.0).round() as u64;
        if pesewas == 0 {
            return Err(TitheError::InvalidCount(format!(
                "denomination {denomination} is below one pesewa"
            )));
        }
        let previous = self.counts.get(&pesewas).map_or(0, |&q| pesewas * q as u64);
        let total = pesewas
            .checked_mul(quantity as u64)
            .and_then(|line| (self.pesewas - previous).checked_add(line))
            .ok_or_else(|| {
                TitheError::InvalidCount(format!("{quantity} x {denomination} overflows the count total"))
            })?;
        if quantity == 0 {
            self.counts.remove(&pesewas);
        } else {
            self.counts.insert(pesewas, quantity);
        }
        self.pesewas = total;
        Ok(())
    }

    /// Parse `"200=3"` style entries as given on the command line.
    pub fn parse_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut count = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (denom, qty) = entry
                .split_once('=')
                .ok_or_else(|| TitheError::InvalidCount(format!("expected DENOM=QTY, got {entry:?}")))?;
            let denom: f64 = denom
                .trim()
                .parse()
                .map_err(|_| TitheError::InvalidCount(format!("bad denomination in {entry:?}")))?;
            let qty: u32 = qty
                .trim()
                .parse()
                .map_err(|_| TitheError::InvalidCount(format!("bad quantity in {entry:?}")))?;
            count.set(denom, qty)?;
        }
        Ok(count)
    }

    /// (denomination, quantity, subtotal), largest denomination first.
    pub fn lines(&self) -> Vec<(f64, u32, f64)> {
        self.counts
            .iter()
            .rev()
            .map(|(&p, &q)| {
                let d = p as f64 / 100.0;
                (d, q, d * q as f64)
            })
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.pesewas as f64 / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Balanced,
    Shortage,
    Overage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub system_cash: f64,
    pub physical_cash: f64,
    /// physical - system; negative means cash is missing.
    pub variance: f64,
    pub is_balanced: bool,
    pub verdict: Verdict,
}

impl Reconciliation {
    pub fn message(&self) -> &'static str {
        match self.verdict {
            Verdict::Balanced => "Cash balanced.",
            Verdict::Shortage => SHORTAGE_HINT,
            Verdict::Overage => OVERAGE_HINT,
        }
    }
}

/// Sum of CASH amounts; MoMo and cheques never reach the drawer.
pub fn system_cash(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.method == PaymentMethod::Cash)
        .map(|t| t.amount)
        .sum()
}

/// Amounts are left unrounded; the balance test runs on the exact variance.
pub fn reconcile(transactions: &[Transaction], count: &CashCount) -> Reconciliation {
    let system = system_cash(transactions);
    let physical = count.total();
    let variance = physical - system;
    let is_balanced = variance.abs() < 0.01;
    let verdict = if is_balanced {
        Verdict::Balanced
    } else if variance < 0.0 {
        Verdict::Shortage
    } else {
        Verdict::Overage
    };
    Reconciliation {
        system_cash: system,
        physical_cash: physical,
        variance,
        is_balanced,
        verdict,
    }
}
