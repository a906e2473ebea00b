use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use isp_ledger::ledger::{add_customer, list_customers, list_expenses};
use isp_ledger::model::{ExpenseCategory, NewCustomer};
use isp_ledger::store::{tables, LocalStore, RecordStore, Row};
use isp_ledger::transfer::workbook::{read_sheets, write_sheets, Cell, Sheet};
use isp_ledger::transfer::{
    import_file, import_sheets, write_backup, CUSTOMER_COLUMNS, EXPENSE_COLUMNS,
};

fn customer_row(name: &str, phone: &str, registered: &str) -> Vec<Cell> {
    vec![
        name.into(),
        "Jl. Melati 2".into(),
        phone.into(),
        "10 Mbps".into(),
        registered.into(),
        Cell::Number(10.0),
        Cell::Empty,
    ]
}

fn customers_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
    let mut sheet = Sheet::new("Customers", &CUSTOMER_COLUMNS);
    for row in rows {
        sheet.push(row);
    }
    sheet
}

#[test]
fn one_malformed_row_among_five() {
    let store = LocalStore::in_memory();
    let sheet = customers_sheet(vec![
        customer_row("Ani", "0811", "2024-01-01"),
        customer_row("Budi", "0812", "2024-01-02"),
        customer_row("Citra", "0813", "not a date"),
        customer_row("Dewi", "0814", "04/01/2024"),
        customer_row("Eko", "0815", "2024-01-05"),
    ]);

    let summary = import_sheets(&store, &[sheet]);

    assert_eq!(summary.customers, 4);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("Customers row 4:"));
    assert!(summary.errors[0].contains("not a date"));
    assert_eq!(list_customers(&store).unwrap().len(), 4);
}

#[test]
fn missing_required_field_is_reported() {
    let store = LocalStore::in_memory();
    let mut row = customer_row("Ani", "0811", "2024-01-01");
    row[3] = Cell::Empty;

    let summary = import_sheets(&store, &[customers_sheet(vec![row])]);
    assert_eq!(summary.customers, 0);
    assert_eq!(summary.errors, vec!["Customers row 2: Package is required".to_string()]);
}

#[test]
fn duplicate_phone_says_already_registered() {
    let store = LocalStore::in_memory();
    add_customer(
        &store,
        &NewCustomer {
            name: "Existing".into(),
            address: String::new(),
            phone: "0811".into(),
            package: "5 Mbps".into(),
            registered_on: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            payment_day: 1,
            payment_note: String::new(),
        },
    )
    .unwrap();

    let sheet = customers_sheet(vec![
        customer_row("Ani", "0811", "2024-01-01"),
        customer_row("Budi", "0812", "2024-01-02"),
    ]);
    let summary = import_sheets(&store, &[sheet]);

    assert_eq!(summary.customers, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("Customers row 2"));
    assert!(summary.errors[0].contains("0811 is already registered"));
}

#[test]
fn expense_rows_validate_category_and_amount() {
    let store = LocalStore::in_memory();
    let mut sheet = Sheet::new("Expenses", &EXPENSE_COLUMNS);
    sheet.push(vec!["listrik".into(), "PLN".into(), Cell::Number(250_000.0), "2024-03-02".into()]);
    sheet.push(vec!["Food".into(), "Lunch".into(), Cell::Number(30_000.0), "2024-03-02".into()]);
    sheet.push(vec!["ISP".into(), Cell::Empty, Cell::Empty, "2024-03-02".into()]);
    sheet.push(vec!["Equipment".into(), "Router".into(), "1.200.000".into(), "15/03/2024".into()]);

    let summary = import_sheets(&store, &[sheet]);

    assert_eq!(summary.expenses, 2);
    assert_eq!(summary.errors.len(), 2);
    assert!(summary.errors[0].starts_with("Expenses row 3:"));
    assert!(summary.errors[0].contains("Invalid expense category 'Food'"));
    assert_eq!(summary.errors[1], "Expenses row 4: Amount is required");

    let expenses = list_expenses(&store).unwrap();
    let router = expenses
        .iter()
        .find(|e| e.category == ExpenseCategory::Equipment)
        .unwrap();
    assert_eq!(router.nominal, 1_200_000);
    assert_eq!(router.spent_on, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
}

#[test]
fn decimal_amount_text_is_rounded_not_scaled() {
    let store = LocalStore::in_memory();
    let mut sheet = Sheet::new("Expenses", &EXPENSE_COLUMNS);
    sheet.push(vec!["ISP".into(), "Uplink".into(), "250000.00".into(), "2024-03-01".into()]);
    sheet.push(vec!["Equipment".into(), "Cable".into(), "150,000.50".into(), "2024-03-02".into()]);
    sheet.push(vec!["Other".into(), "Typo".into(), "1.2345".into(), "2024-03-03".into()]);

    let summary = import_sheets(&store, &[sheet]);

    assert_eq!(summary.expenses, 2);
    assert_eq!(summary.errors, vec!["Expenses row 4: Amount '1.2345' is not a number".to_string()]);

    let mut amounts: Vec<i64> = list_expenses(&store).unwrap().iter().map(|e| e.nominal).collect();
    amounts.sort();
    assert_eq!(amounts, vec![150_001, 250_000]);
}

#[test]
fn workbook_without_known_sheets_imports_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.xlsx");
    let mut sheet = Sheet::new("Notes", &["Text"]);
    sheet.push(vec!["hello".into()]);
    write_sheets(&path, &[sheet]).unwrap();

    let store = LocalStore::in_memory();
    let summary = import_file(&store, &path).unwrap();
    assert_eq!(summary.customers, 0);
    assert_eq!(summary.expenses, 0);
    assert!(summary.errors.is_empty());
}

#[test]
fn missing_file_is_an_error() {
    let store = LocalStore::in_memory();
    let dir = TempDir::new().unwrap();
    assert!(import_file(&store, &dir.path().join("absent.xlsx")).is_err());
}

#[test]
fn backup_restores_through_import() {
    let source = LocalStore::in_memory();
    import_sheets(
        &source,
        &[customers_sheet(vec![
            customer_row("Ani", "0811", "2024-01-01"),
            customer_row("Budi", "0812", "2024-02-29"),
        ])],
    );

    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let path = write_backup(&source, dir.path(), today).unwrap();
    assert!(path.ends_with("Backup_WiFi_2024-06-01.xlsx"));

    let sheets = read_sheets(&path, &["Customers", "Payments", "Expenses"]).unwrap();
    assert_eq!(sheets.len(), 3);
    assert_eq!(sheets[1].headers[0], "Customer");

    let target = LocalStore::in_memory();
    let summary = import_file(&target, &path).unwrap();
    assert_eq!(summary.customers, 2);
    assert!(summary.errors.is_empty());

    let restored = list_customers(&target).unwrap();
    let budi = restored.iter().find(|c| c.phone == "0812").unwrap();
    assert_eq!(budi.registered_on, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(budi.payment_day, 10);
}

#[test]
fn backup_keeps_payments_with_unknown_status() {
    let store = LocalStore::in_memory();
    import_sheets(&store, &[customers_sheet(vec![customer_row("Ani", "0811", "2024-01-01")])]);
    let ani = list_customers(&store).unwrap().remove(0);

    for status in ["Lunas", "Cicilan"] {
        let mut row = Row::new();
        row.insert("pelanggan_id".into(), json!(ani.id));
        row.insert("bulan".into(), json!(5));
        row.insert("tahun".into(), json!(2024));
        row.insert("nominal".into(), json!(120_000));
        row.insert("status".into(), json!(status));
        store.insert(tables::PAYMENTS, row).unwrap();
    }

    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let path = write_backup(&store, dir.path(), today).unwrap();

    let sheets = read_sheets(&path, &["Payments"]).unwrap();
    let statuses: Vec<&Cell> = sheets[0].rows.iter().map(|r| &r[5]).collect();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.contains(&&Cell::Text("Paid".into())));
    assert!(statuses.contains(&&Cell::Text("Cicilan".into())));
    assert!(sheets[0].rows.iter().all(|r| r[0] == Cell::Text("Ani".into())));
}
