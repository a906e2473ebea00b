//! Spreadsheet import and full backup.

mod backup;
mod import;
pub mod workbook;

pub use backup::{backup_file_name, write_backup, CUSTOMER_COLUMNS, EXPENSE_COLUMNS, PAYMENT_COLUMNS};
pub use import::{import_file, import_sheets, ImportSummary};

pub const CUSTOMERS_SHEET: &str = "Customers";
pub const PAYMENTS_SHEET: &str = "Payments";
pub const EXPENSES_SHEET: &str = "Expenses";
