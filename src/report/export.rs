use std::path::{Path, PathBuf};

use super::aggregate::MonthlyReport;
use crate::error::Result;
use crate::transfer::workbook::{write_sheets, Cell, Sheet};

pub const HEADERS: [&str; 8] = [
    "Month",
    "Income",
    "Expense",
    "Profit",
    "Total Customers",
    "Paid Count",
    "Pending Count",
    "Overdue Count",
];

const COLUMN_WIDTHS: [f64; 8] = [12.0, 15.0, 15.0, 15.0, 16.0, 12.0, 14.0, 14.0];

pub const TOTAL_LABEL: &str = "TOTAL";

/// Monthly rows followed by a `TOTAL` row. The totals row sums income,
/// expense and profit; its customer and status cells stay empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn from_reports(reports: &[MonthlyReport]) -> Self {
        let mut rows: Vec<Vec<Cell>> = reports
            .iter()
            .map(|r| {
                vec![
                    r.month.clone().into(),
                    r.income.into(),
                    r.expenses.into(),
                    r.profit.into(),
                    r.customers.into(),
                    r.payments.paid.into(),
                    r.payments.unpaid.into(),
                    r.payments.overdue.into(),
                ]
            })
            .collect();

        let income: i64 = reports.iter().map(|r| r.income).sum();
        let expenses: i64 = reports.iter().map(|r| r.expenses).sum();
        let profit: i64 = reports.iter().map(|r| r.profit).sum();

        rows.push(vec![
            TOTAL_LABEL.into(),
            income.into(),
            expenses.into(),
            profit.into(),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ]);

        Self { rows }
    }

    pub fn totals(&self) -> Option<&[Cell]> {
        self.rows.last().map(Vec::as_slice)
    }

    fn to_sheet(&self, year: i32) -> Sheet {
        let mut sheet = Sheet::new(&sheet_name(year), &HEADERS).with_widths(&COLUMN_WIDTHS);
        for row in &self.rows {
            sheet.push(row.clone());
        }
        sheet
    }
}

pub fn export_file_name(year: i32) -> String {
    format!("Report_WiFi_{year}.xlsx")
}

pub fn sheet_name(year: i32) -> String {
    format!("Report {year}")
}

/// Write the table as `Report_WiFi_{year}.xlsx` inside `dir`.
pub fn write_report_xlsx(table: &ReportTable, year: i32, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(year));
    write_sheets(&path, &[table.to_sheet(year)])?;
    tracing::info!(path = %path.display(), "report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate::StatusCounts;
    use crate::report::period::Period;

    fn report(month: u32, income: i64, expenses: i64) -> MonthlyReport {
        let period = Period::new(2024, month).unwrap();
        MonthlyReport {
            period,
            month: period.label().to_string(),
            income,
            expenses,
            profit: income - expenses,
            customers: 3,
            payments: StatusCounts {
                paid: 2,
                unpaid: 1,
                overdue: 0,
                free: 0,
            },
        }
    }

    #[test]
    fn totals_row_sums_money_and_leaves_counts_empty() {
        let table = ReportTable::from_reports(&[report(1, 300_000, 100_000), report(2, 0, 50_000)]);

        assert_eq!(table.rows.len(), 3);
        let totals = table.totals().unwrap();
        assert_eq!(totals[0], Cell::Text("TOTAL".into()));
        assert_eq!(totals[1], Cell::Number(300_000.0));
        assert_eq!(totals[2], Cell::Number(150_000.0));
        assert_eq!(totals[3], Cell::Number(150_000.0));
        assert!(totals[4..].iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn file_and_sheet_names() {
        assert_eq!(export_file_name(2024), "Report_WiFi_2024.xlsx");
        assert_eq!(sheet_name(2024), "Report 2024");
    }
}
