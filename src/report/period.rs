use chrono::{Datelike, NaiveDate};

use crate::error::{AppError, Result};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A (year, month) pair scoping payment and expense queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn new(year: i32, month: u32) -> Result<Self> {
        // Validating through chrono also rejects years it cannot represent.
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(AppError::InvalidMonth(month))?;
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month; December rolls into January of the
    /// next year. Exclusive upper bound for date-range queries.
    pub fn next_start(self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    /// Last calendar day of the month (leap-year aware).
    pub fn last_day(self) -> NaiveDate {
        self.next_start().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn label(self) -> &'static str {
        MONTH_NAMES[self.month as usize - 1]
    }

    pub fn short_label(self) -> &'static str {
        &self.label()[..3]
    }
}

/// ISO `YYYY-MM-DD` form used in store filters.
pub fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
