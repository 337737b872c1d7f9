use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TitheError;
use crate::fellowship::Fellowship;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    Provisional,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Provisional => "PROVISIONAL",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = TitheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "PROVISIONAL" => Ok(Self::Provisional),
            other => Err(TitheError::Other(format!("Unknown member status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Momo,
    Check,
}

pub const ALL_METHODS: [PaymentMethod; 3] =
    [PaymentMethod::Cash, PaymentMethod::Momo, PaymentMethod::Check];

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Momo => "MOMO",
            Self::Check => "CHECK",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TitheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "MOMO" => Ok(Self::Momo),
            "CHECK" | "CHEQUE" => Ok(Self::Check),
            _ => Err(TitheError::UnknownMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Open,
    Counting,
    Finalized,
    Synced,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Counting => "COUNTING",
            Self::Finalized => "FINALIZED",
            Self::Synced => "SYNCED",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Counting)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = TitheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "COUNTING" => Ok(Self::Counting),
            "FINALIZED" => Ok(Self::Finalized),
            "SYNCED" => Ok(Self::Synced),
            other => Err(TitheError::Other(format!("Unknown batch status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub fellowship: Fellowship,
    pub status: MemberStatus,
    pub ytd_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_gift_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub batch_id: String,
    pub member_id: String,
    pub member_name: String,
    pub fellowship: Fellowship,
    pub amount: f64,
    pub method: PaymentMethod,
    /// ISO date-time; its date part is the only period key.
    pub timestamp: String,
    pub officer_id: String,
    pub officer_name: String,
}

impl Transaction {
    pub fn date(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub date: String,
    pub status: BatchStatus,
    pub total_system: f64,
    pub total_cash: f64,
    pub variance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_by: Option<String>,
}
