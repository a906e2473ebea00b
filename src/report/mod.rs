//! Monthly financial aggregation and everything built on it: the yearly
//! spreadsheet export, the dashboard summary and refresh ordering.

mod aggregate;
mod dashboard;
mod export;
mod period;
mod refresh;

pub use aggregate::{
    aggregate_month, aggregate_year, customers_as_of, expense_total, payment_totals,
    tally_payments, MonthlyReport, StatusCounts,
};
pub use dashboard::{summarize, ChartPoint, DashboardSummary};
pub use export::{export_file_name, sheet_name, write_report_xlsx, ReportTable, HEADERS, TOTAL_LABEL};
pub use period::{iso, Period};
pub use refresh::{RefreshLoop, RefreshSequencer};
