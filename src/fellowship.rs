use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TitheError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fellowship {
    Thyatira,
    Philippi,
    Laodicea,
    Balance,
    Ephesus,
    Smyrna,
    Sardis,
    Pergamos,
    Berea,
    Philadelphia,
}

pub const ALL_FELLOWSHIPS: [Fellowship; 10] = [
    Fellowship::Thyatira,
    Fellowship::Philippi,
    Fellowship::Laodicea,
    Fellowship::Balance,
    Fellowship::Ephesus,
    Fellowship::Smyrna,
    Fellowship::Sardis,
    Fellowship::Pergamos,
    Fellowship::Berea,
    Fellowship::Philadelphia,
];

impl Fellowship {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Thyatira => "Thyatira",
            Self::Philippi => "Philippi",
            Self::Laodicea => "Laodicea",
            Self::Balance => "Balance",
            Self::Ephesus => "Ephesus",
            Self::Smyrna => "Smyrna",
            Self::Sardis => "Sardis",
            Self::Pergamos => "Pergamos",
            Self::Berea => "Berea",
            Self::Philadelphia => "Philadelphia",
        }
    }

    pub fn pastor(&self) -> &'static str {
        match self {
            Self::Thyatira => "Ps Francis",
            Self::Philippi => "Ps Carismond",
            Self::Laodicea => "Ps Nathaniel",
            Self::Balance => "Ps Brandon",
            Self::Ephesus => "Senior Prophet Moses",
            Self::Smyrna => "Ps Collins",
            Self::Sardis => "Ps Jamil",
            Self::Pergamos => "Ps Daniel",
            Self::Berea => "Ps Dominic",
            Self::Philadelphia => "Ps Elisha",
        }
    }

    /// Display colour as `#rrggbb`.
    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::Thyatira => "#ef4444",
            Self::Philippi => "#3b82f6",
            Self::Laodicea => "#f97316",
            Self::Balance => "#78716c",
            Self::Ephesus => "#10b981",
            Self::Smyrna => "#a855f7",
            Self::Sardis => "#ec4899",
            Self::Pergamos => "#06b6d4",
            Self::Berea => "#f59e0b",
            Self::Philadelphia => "#6366f1",
        }
    }

    /// Match a worksheet name to a fellowship. Either name may contain the other,
    /// ignoring case and surrounding whitespace, so "THYATIRA 2024" and "Thy" both hit.
    pub fn match_sheet_name(sheet_name: &str) -> Option<Fellowship> {
        let sheet = sheet_name.trim().to_uppercase();
        if sheet.is_empty() {
            return None;
        }
        ALL_FELLOWSHIPS.iter().copied().find(|f| {
            let name = f.name().to_uppercase();
            sheet.contains(&name) || name.contains(&sheet)
        })
    }
}

impl fmt::Display for Fellowship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fellowship {
    type Err = TitheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL_FELLOWSHIPS
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TitheError::UnknownFellowship(s.to_string()))
    }
}
