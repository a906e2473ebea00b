use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    #[serde(rename = "ISP")]
    Isp,
    #[serde(rename = "listrik")]
    Electricity,
    #[serde(rename = "perangkat")]
    Equipment,
    #[serde(rename = "perawatan")]
    Maintenance,
    #[serde(rename = "lain-lain")]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Isp,
        ExpenseCategory::Electricity,
        ExpenseCategory::Equipment,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Other,
    ];

    pub fn as_stored(self) -> &'static str {
        match self {
            ExpenseCategory::Isp => "ISP",
            ExpenseCategory::Electricity => "listrik",
            ExpenseCategory::Equipment => "perangkat",
            ExpenseCategory::Maintenance => "perawatan",
            ExpenseCategory::Other => "lain-lain",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseCategory::Isp => "ISP",
            ExpenseCategory::Electricity => "Electricity",
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Accepts the English label or the stored spelling, case-insensitively.
impl FromStr for ExpenseCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_stored().to_lowercase() == wanted || c.to_string().to_lowercase() == wanted)
            .ok_or_else(|| AppError::InvalidCategory(s.to_string()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Expense {
    pub id: String,
    #[serde(rename = "kategori")]
    pub category: ExpenseCategory,
    #[serde(rename = "deskripsi", default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "crate::model::amount::deserialize")]
    pub nominal: i64,
    #[serde(rename = "tgl_pengeluaran")]
    pub spent_on: NaiveDate,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewExpense {
    #[serde(rename = "kategori")]
    pub category: ExpenseCategory,
    #[serde(rename = "deskripsi")]
    pub description: String,
    pub nominal: i64,
    #[serde(rename = "tgl_pengeluaran")]
    pub spent_on: NaiveDate,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    #[serde(rename = "kategori", skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    #[serde(rename = "deskripsi", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal: Option<i64>,
    #[serde(rename = "tgl_pengeluaran", skip_serializing_if = "Option::is_none")]
    pub spent_on: Option<NaiveDate>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
