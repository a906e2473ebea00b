use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;
use crate::ledger::{list_customers, list_expenses};
use crate::model::PaymentStatus;
use crate::store::{from_rows, tables, Query, RecordStore};

use super::workbook::{write_sheets, Cell, Sheet};
use super::{CUSTOMERS_SHEET, EXPENSES_SHEET, PAYMENTS_SHEET};

pub const CUSTOMER_COLUMNS: [&str; 7] = [
    "Name",
    "Address",
    "Phone",
    "Package",
    "Registration Date",
    "Payment Day",
    "Payment Note",
];

pub const PAYMENT_COLUMNS: [&str; 7] = [
    "Customer", "Phone", "Month", "Year", "Amount", "Status", "Paid On",
];

pub const EXPENSE_COLUMNS: [&str; 4] = ["Category", "Description", "Amount", "Date"];

pub fn backup_file_name(today: NaiveDate) -> String {
    format!("Backup_WiFi_{}.xlsx", today.format("%Y-%m-%d"))
}

/// A payment row as written to the backup. Every column is optional and the
/// status is kept verbatim, so rows the ledger cannot classify are still
/// carried into the workbook.
#[derive(Debug, Deserialize)]
struct BackupPayment {
    #[serde(rename = "pelanggan_id", default)]
    customer_id: Option<String>,
    #[serde(rename = "bulan", default)]
    month: Option<u32>,
    #[serde(rename = "tahun", default)]
    year: Option<i32>,
    #[serde(default, deserialize_with = "crate::model::amount::deserialize_opt")]
    nominal: Option<i64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "tgl_bayar", default)]
    paid_on: Option<NaiveDate>,
}

impl BackupPayment {
    /// English label for known statuses, the stored text otherwise.
    fn status_label(&self) -> Option<String> {
        let raw = self.status.as_deref()?;
        Some(PaymentStatus::from_stored(raw).map_or_else(|| raw.to_string(), |s| s.to_string()))
    }
}

fn optional(value: Option<&str>) -> Cell {
    value.map_or(Cell::Empty, Cell::from)
}

/// Snapshot every customer, payment and expense into one workbook in `dir`.
/// The customer and expense sheets use the import column labels, so a backup
/// can be fed back through `import`.
pub fn write_backup(store: &dyn RecordStore, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
    let customers = list_customers(store)?;
    let expenses = list_expenses(store)?;
    let payments: Vec<BackupPayment> = from_rows(
        store.select(&Query::table(tables::PAYMENTS).order("created_at", false))?,
    )?;

    let mut customer_sheet = Sheet::new(CUSTOMERS_SHEET, &CUSTOMER_COLUMNS)
        .with_widths(&[24.0, 30.0, 16.0, 14.0, 18.0, 12.0, 30.0]);
    for c in &customers {
        customer_sheet.push(vec![
            c.name.as_str().into(),
            optional(c.address.as_deref()),
            c.phone.as_str().into(),
            c.package.as_str().into(),
            c.registered_on.into(),
            i64::from(c.payment_day).into(),
            optional(c.payment_note.as_deref()),
        ]);
    }

    let by_id: HashMap<&str, (&str, &str)> = customers
        .iter()
        .map(|c| (c.id.as_str(), (c.name.as_str(), c.phone.as_str())))
        .collect();

    let mut payment_sheet = Sheet::new(PAYMENTS_SHEET, &PAYMENT_COLUMNS)
        .with_widths(&[24.0, 16.0, 8.0, 8.0, 14.0, 12.0, 14.0]);
    for p in &payments {
        let (name, phone) = p
            .customer_id
            .as_deref()
            .and_then(|id| by_id.get(id).copied())
            .unwrap_or(("", ""));
        payment_sheet.push(vec![
            name.into(),
            phone.into(),
            p.month.map_or(Cell::Empty, |m| i64::from(m).into()),
            p.year.map_or(Cell::Empty, |y| i64::from(y).into()),
            p.nominal.map_or(Cell::Empty, Cell::from),
            optional(p.status_label().as_deref()),
            p.paid_on.map_or(Cell::Empty, Cell::from),
        ]);
    }

    let mut expense_sheet = Sheet::new(EXPENSES_SHEET, &EXPENSE_COLUMNS)
        .with_widths(&[14.0, 36.0, 14.0, 14.0]);
    for e in &expenses {
        expense_sheet.push(vec![
            e.category.to_string().into(),
            optional(e.description.as_deref()),
            e.nominal.into(),
            e.spent_on.into(),
        ]);
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(today));
    write_sheets(&path, &[customer_sheet, payment_sheet, expense_sheet])?;

    tracing::info!(
        path = %path.display(),
        customers = customers.len(),
        payments = payments.len(),
        expenses = expenses.len(),
        "backup written"
    );
    Ok(path)
}
