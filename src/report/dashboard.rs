use chrono::{Datelike, NaiveDate};

use super::aggregate::{aggregate_month, MonthlyReport};
use super::period::Period;
use crate::error::Result;
use crate::ledger::count_customers;
use crate::store::RecordStore;

/// One point of the yearly income/expense chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: &'static str,
    pub income: i64,
    pub expense: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Every customer on record, regardless of registration date.
    pub total_customers: u64,
    pub current: MonthlyReport,
    /// January through December of the current year.
    pub series: Vec<ChartPoint>,
}

/// Current-month figures plus the twelve-month chart series for `today`'s year.
pub fn summarize(store: &dyn RecordStore, today: NaiveDate) -> Result<DashboardSummary> {
    let total_customers = count_customers(store)?;
    let current = aggregate_month(store, today.year(), today.month())?;

    let mut series = Vec::with_capacity(12);
    for month in 1..=12 {
        let report = if month == today.month() {
            current.clone()
        } else {
            aggregate_month(store, today.year(), month)?
        };
        series.push(ChartPoint {
            label: Period::new(today.year(), month)?.short_label(),
            income: report.income,
            expense: report.expenses,
        });
    }

    Ok(DashboardSummary {
        total_customers,
        current,
        series,
    })
}
