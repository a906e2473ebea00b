use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    #[serde(rename = "Lunas")]
    Paid,
    #[serde(rename = "Belum Lunas")]
    Unpaid,
    #[serde(rename = "Tunggakan")]
    Overdue,
    #[serde(rename = "Free")]
    Free,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Paid,
        PaymentStatus::Unpaid,
        PaymentStatus::Overdue,
        PaymentStatus::Free,
    ];

    /// Value as stored in the `status` column.
    pub fn as_stored(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Lunas",
            PaymentStatus::Unpaid => "Belum Lunas",
            PaymentStatus::Overdue => "Tunggakan",
            PaymentStatus::Free => "Free",
        }
    }

    /// Exact match against the stored spelling; anything else is `None`.
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_stored() == value)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Overdue => "Overdue",
            PaymentStatus::Free => "Free",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" | "lunas" => Ok(PaymentStatus::Paid),
            "unpaid" | "pending" | "belum lunas" => Ok(PaymentStatus::Unpaid),
            "overdue" | "tunggakan" => Ok(PaymentStatus::Overdue),
            "free" => Ok(PaymentStatus::Free),
            _ => Err(AppError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    #[serde(rename = "pelanggan_id")]
    pub customer_id: String,
    #[serde(rename = "bulan")]
    pub month: u32,
    #[serde(rename = "tahun")]
    pub year: i32,
    #[serde(rename = "tgl_bayar", default)]
    pub paid_on: Option<NaiveDate>,
    #[serde(deserialize_with = "crate::model::amount::deserialize")]
    pub nominal: i64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewPayment {
    #[serde(rename = "pelanggan_id")]
    pub customer_id: String,
    #[serde(rename = "bulan")]
    pub month: u32,
    #[serde(rename = "tahun")]
    pub year: i32,
    pub nominal: i64,
    pub status: PaymentStatus,
    #[serde(rename = "tgl_bayar")]
    pub paid_on: Option<NaiveDate>,
}

/// The two columns aggregation needs. Status stays a raw string so rows with
/// a value outside the four known statuses (or null) can be skipped instead
/// of failing the whole month.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PaymentTally {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::model::amount::deserialize_opt")]
    pub nominal: Option<i64>,
}

impl PaymentTally {
    pub fn bucket(&self) -> Option<PaymentStatus> {
        self.status.as_deref().and_then(PaymentStatus::from_stored)
    }

    pub fn amount(&self) -> i64 {
        self.nominal.unwrap_or(0)
    }
}
