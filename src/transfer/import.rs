use std::path::Path;

use crate::error::AppError;
use crate::ledger::{add_customer, add_expense};
use crate::model::{ExpenseCategory, NewCustomer, NewExpense};
use crate::store::RecordStore;

use super::workbook::{read_sheets, Record, Sheet};
use super::{CUSTOMERS_SHEET, EXPENSES_SHEET};

/// What an import did. Every row that was skipped has one entry in `errors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub customers: usize,
    pub expenses: usize,
    pub errors: Vec<String>,
}

fn required(record: &Record<'_>, header: &str) -> Result<String, String> {
    record
        .text(header)
        .ok_or_else(|| format!("{header} is required"))
}

fn customer_from_record(record: &Record<'_>) -> Result<NewCustomer, String> {
    let name = required(record, "Name")?;
    let phone = required(record, "Phone")?;
    let package = required(record, "Package")?;
    let registered_on = record
        .date("Registration Date")?
        .ok_or_else(|| "Registration Date is required".to_string())?;

    let payment_day = match record.integer("Payment Day")? {
        None => 1,
        Some(day) if (1..=31).contains(&day) => day as u32,
        Some(day) => return Err(format!("Payment Day {day} must be between 1 and 31")),
    };

    Ok(NewCustomer {
        name,
        address: record.text("Address").unwrap_or_default(),
        phone,
        package,
        registered_on,
        payment_day,
        payment_note: record.text("Payment Note").unwrap_or_default(),
    })
}

fn expense_from_record(record: &Record<'_>) -> Result<NewExpense, String> {
    let category: ExpenseCategory = required(record, "Category")?
        .parse()
        .map_err(|e: AppError| e.to_string())?;
    let nominal = record
        .integer("Amount")?
        .ok_or_else(|| "Amount is required".to_string())?;
    if nominal < 0 {
        return Err(AppError::NegativeAmount.to_string());
    }
    let spent_on = record
        .date("Date")?
        .ok_or_else(|| "Date is required".to_string())?;

    Ok(NewExpense {
        category,
        description: record.text("Description").unwrap_or_default(),
        nominal,
        spent_on,
    })
}

/// Run `insert` for every non-blank row of `sheet`, collecting failures
/// instead of stopping. Returns the number of rows stored.
fn import_rows<T>(
    sheet: &Sheet,
    errors: &mut Vec<String>,
    parse: impl Fn(&Record<'_>) -> Result<T, String>,
    insert: impl Fn(&T) -> crate::Result<()>,
) -> usize {
    let mut stored = 0;
    for (row_no, record) in sheet.records() {
        if record.is_blank() {
            continue;
        }
        let outcome = parse(&record).and_then(|item| insert(&item).map_err(|e| e.to_string()));
        match outcome {
            Ok(()) => stored += 1,
            Err(message) => {
                tracing::warn!(sheet = %sheet.name, row = row_no, %message, "import row skipped");
                errors.push(format!("{} row {row_no}: {message}", sheet.name));
            }
        }
    }
    stored
}

/// Import customers and expenses from already-read sheets. Sheets other than
/// `Customers` and `Expenses` are ignored.
pub fn import_sheets(store: &dyn RecordStore, sheets: &[Sheet]) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for sheet in sheets {
        if sheet.name.eq_ignore_ascii_case(CUSTOMERS_SHEET) {
            summary.customers += import_rows(sheet, &mut summary.errors, customer_from_record, |c| {
                add_customer(store, c).map(|_| ())
            });
        } else if sheet.name.eq_ignore_ascii_case(EXPENSES_SHEET) {
            summary.expenses += import_rows(sheet, &mut summary.errors, expense_from_record, |e| {
                add_expense(store, e).map(|_| ())
            });
        }
    }

    tracing::info!(
        customers = summary.customers,
        expenses = summary.expenses,
        errors = summary.errors.len(),
        "import finished"
    );
    summary
}

/// Read `path` and import its `Customers` and `Expenses` sheets. Either sheet
/// may be missing. Only failing to open the workbook is an error; bad rows
/// are reported in the summary.
pub fn import_file(store: &dyn RecordStore, path: &Path) -> crate::Result<ImportSummary> {
    let sheets = read_sheets(path, &[CUSTOMERS_SHEET, EXPENSES_SHEET])?;
    Ok(import_sheets(store, &sheets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use crate::transfer::workbook::Cell;

    fn customers_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        let mut sheet = Sheet::new(
            "Customers",
            &["Name", "Address", "Phone", "Package", "Registration Date", "Payment Day", "Payment Note"],
        );
        for row in rows {
            sheet.push(row);
        }
        sheet
    }

    fn customer_row(name: &str, phone: &str, date: &str, day: Cell) -> Vec<Cell> {
        vec![
            name.into(),
            "Jl. Mawar 1".into(),
            phone.into(),
            "10 Mbps".into(),
            date.into(),
            day,
            Cell::Empty,
        ]
    }

    #[test]
    fn payment_day_defaults_to_first() {
        let store = LocalStore::in_memory();
        let sheet = customers_sheet(vec![customer_row("Ani", "0811", "2024-01-05", Cell::Empty)]);

        let summary = import_sheets(&store, &[sheet]);
        assert_eq!(summary.customers, 1);
        let customers = crate::ledger::list_customers(&store).unwrap();
        assert_eq!(customers[0].payment_day, 1);
    }

    #[test]
    fn out_of_range_payment_day_names_row() {
        let store = LocalStore::in_memory();
        let sheet = customers_sheet(vec![customer_row("Ani", "0811", "2024-01-05", Cell::Number(32.0))]);

        let summary = import_sheets(&store, &[sheet]);
        assert_eq!(summary.customers, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("Customers row 2:"));
        assert!(summary.errors[0].contains("Payment Day"));
    }

    #[test]
    fn blank_rows_are_not_errors() {
        let store = LocalStore::in_memory();
        let sheet = customers_sheet(vec![
            customer_row("Ani", "0811", "2024-01-05", Cell::Empty),
            vec![Cell::Empty; 7],
        ]);

        let summary = import_sheets(&store, &[sheet]);
        assert_eq!(summary.customers, 1);
        assert!(summary.errors.is_empty());
    }
}
