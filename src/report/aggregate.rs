use serde::Deserialize;

use super::period::{iso, Period};
use crate::error::Result;
use crate::model::{PaymentStatus, PaymentTally};
use crate::store::{from_rows, tables, Query, RecordStore};

/// Number of payments in each status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub paid: u64,
    pub unpaid: u64,
    pub overdue: u64,
    pub free: u64,
}

impl StatusCounts {
    pub fn get(&self, status: PaymentStatus) -> u64 {
        match status {
            PaymentStatus::Paid => self.paid,
            PaymentStatus::Unpaid => self.unpaid,
            PaymentStatus::Overdue => self.overdue,
            PaymentStatus::Free => self.free,
        }
    }

    fn bump(&mut self, status: PaymentStatus) {
        match status {
            PaymentStatus::Paid => self.paid += 1,
            PaymentStatus::Unpaid => self.unpaid += 1,
            PaymentStatus::Overdue => self.overdue += 1,
            PaymentStatus::Free => self.free += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.paid + self.unpaid + self.overdue + self.free
    }

    /// Percentage of all bucketed payments that have `status`; 0 when there
    /// are none at all.
    pub fn share(&self, status: PaymentStatus) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(status) as f64 / total as f64 * 100.0
    }
}

/// Financial summary of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub period: Period,
    pub month: String,
    pub income: i64,
    pub expenses: i64,
    pub profit: i64,
    /// Customers registered on or before the last day of the month.
    pub customers: u64,
    pub payments: StatusCounts,
}

#[derive(Debug, Deserialize)]
struct AmountRow {
    #[serde(default, deserialize_with = "crate::model::amount::deserialize_opt")]
    nominal: Option<i64>,
}

/// Income and status counts for a set of payment rows. Rows whose status is
/// not one of the four known values count toward nothing.
pub fn tally_payments(rows: &[PaymentTally]) -> (i64, StatusCounts) {
    let mut counts = StatusCounts::default();
    let mut income = 0i64;

    for row in rows {
        match row.bucket() {
            Some(status) => {
                counts.bump(status);
                if status == PaymentStatus::Paid {
                    income += row.amount();
                }
            }
            None => {
                tracing::warn!(status = ?row.status, "skipping payment with unrecognized status");
            }
        }
    }

    (income, counts)
}

/// Income and status counts for the payments billed in `period`.
pub fn payment_totals(store: &dyn RecordStore, period: Period) -> Result<(i64, StatusCounts)> {
    let rows = store.select(
        &Query::table(tables::PAYMENTS)
            .eq("bulan", period.month())
            .eq("tahun", period.year()),
    )?;
    let tallies: Vec<PaymentTally> = from_rows(rows)?;
    Ok(tally_payments(&tallies))
}

/// Sum of expenses dated within `period` (first day inclusive, first day of
/// the next month exclusive).
pub fn expense_total(store: &dyn RecordStore, period: Period) -> Result<i64> {
    let rows = store.select(
        &Query::table(tables::EXPENSES)
            .gte("tgl_pengeluaran", iso(period.first_day()))
            .lt("tgl_pengeluaran", iso(period.next_start())),
    )?;
    let amounts: Vec<AmountRow> = from_rows(rows)?;
    Ok(amounts.iter().filter_map(|r| r.nominal).sum())
}

/// Customers registered up to and including the last day of `period`.
pub fn customers_as_of(store: &dyn RecordStore, period: Period) -> Result<u64> {
    Ok(store.count(
        &Query::table(tables::CUSTOMERS).lte("tgl_registrasi", iso(period.last_day())),
    )?)
}

/// Build the report for one month. Read-only.
pub fn aggregate_month(store: &dyn RecordStore, year: i32, month: u32) -> Result<MonthlyReport> {
    let period = Period::new(year, month)?;

    let (income, payments) = payment_totals(store, period)?;
    let expenses = expense_total(store, period)?;
    let customers = customers_as_of(store, period)?;

    tracing::debug!(year, month, income, expenses, "aggregated month");

    Ok(MonthlyReport {
        period,
        month: period.label().to_string(),
        income,
        expenses,
        profit: income - expenses,
        customers,
        payments,
    })
}

/// Reports for January through December of `year`, in order.
pub fn aggregate_year(store: &dyn RecordStore, year: i32) -> Result<Vec<MonthlyReport>> {
    (1..=12)
        .map(|month| aggregate_month(store, year, month))
        .collect()
}
