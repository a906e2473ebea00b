use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use isp_ledger::report::HEADERS;
use isp_ledger::transfer::workbook::{read_sheets, Cell};

fn ledger_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("isp-ledger"))
}

/// Fresh config directory in local mode.
fn setup() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ledger-config");

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    (temp_dir, config_path)
}

fn run_ok(config_path: &Path, args: &[&str]) -> String {
    let output = ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Id printed in parentheses at the end of an "Added ..." line.
fn printed_id(stdout: &str) -> String {
    let start = stdout.rfind('(').unwrap() + 1;
    let end = stdout.rfind(')').unwrap();
    stdout[start..end].to_string()
}

fn add_customer(config_path: &Path, name: &str, phone: &str) -> String {
    let out = run_ok(
        config_path,
        &[
            "customers",
            "add",
            "--name",
            name,
            "--phone",
            phone,
            "--package",
            "10 Mbps",
            "--registered",
            "2024-01-15",
        ],
    );
    printed_id(&out)
}

#[test]
fn test_help() {
    ledger_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledger for small ISPs"));
}

#[test]
fn test_version() {
    ledger_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("isp-ledger"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("ledger-config");

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized isp-ledger config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let (_temp, config_path) = setup();

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap(), "customers", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_remote_mode_requires_login() {
    let (_temp, config_path) = setup();
    let config = fs::read_to_string(config_path.join("config.toml")).unwrap();
    let config = config
        .replace("mode = \"local\"", "mode = \"remote\"")
        .replace("# url = ", "url = ")
        .replace("# anon_key = \"...\"", "anon_key = \"key\"");
    fs::write(config_path.join("config.toml"), config).unwrap();

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap(), "customers", "list"])
        .env_remove("ISP_LEDGER_ANON_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_customers_add_and_list() {
    let (_temp, config_path) = setup();

    run_ok(&config_path, &["customers", "list"]);
    add_customer(&config_path, "Siti Aminah", "081234567890");
    add_customer(&config_path, "Budi Santoso", "081298765432");

    let out = run_ok(&config_path, &["customers", "list"]);
    assert!(out.contains("Siti Aminah"));
    assert!(out.contains("Budi Santoso"));
    assert!(out.contains("2 of 2 customers"));

    let out = run_ok(&config_path, &["customers", "list", "--search", "siti"]);
    assert!(out.contains("Siti Aminah"));
    assert!(!out.contains("Budi Santoso"));
}

#[test]
fn test_duplicate_phone_is_rejected() {
    let (_temp, config_path) = setup();
    add_customer(&config_path, "Siti Aminah", "081234567890");

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args([
            "customers",
            "add",
            "--name",
            "Another Siti",
            "--phone",
            "081234567890",
            "--package",
            "5 Mbps",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn test_customer_show_and_edit() {
    let (_temp, config_path) = setup();
    let id = add_customer(&config_path, "Siti Aminah", "081234567890");

    run_ok(&config_path, &["customers", "edit", &id, "--package", "20 Mbps"]);
    let out = run_ok(&config_path, &["customers", "show", &id]);
    assert!(out.contains("20 Mbps"));
    assert!(out.contains("No payments recorded."));
}

#[test]
fn test_invalid_payment_day() {
    let (_temp, config_path) = setup();

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args([
            "customers", "add", "--name", "X", "--phone", "0811", "--package", "5 Mbps",
            "--payment-day", "32",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payment day 32"));
}

#[test]
fn test_payments_and_report() {
    let (_temp, config_path) = setup();
    let customer = add_customer(&config_path, "Siti Aminah", "081234567890");

    run_ok(
        &config_path,
        &[
            "payments", "add", "--customer", &customer, "--month", "8", "--year", "2024",
            "--amount", "150000", "--status", "paid",
        ],
    );
    let out = run_ok(
        &config_path,
        &[
            "payments", "add", "--customer", &customer, "--month", "9", "--year", "2024",
            "--amount", "150000",
        ],
    );
    let pending = printed_id(&out);

    run_ok(
        &config_path,
        &[
            "expenses", "add", "--category", "electricity", "--amount", "40000", "--date",
            "2024-08-20",
        ],
    );

    let out = run_ok(&config_path, &["payments", "list", "--status", "unpaid"]);
    assert!(out.contains("Sep 2024"));
    assert!(!out.contains("Aug 2024"));

    let out = run_ok(&config_path, &["report", "--year", "2024"]);
    assert!(out.contains("TOTAL"));
    assert!(out.contains("150.000"));
    assert!(out.contains("110.000"));

    let out = run_ok(&config_path, &["payments", "status", &pending, "paid"]);
    assert!(out.contains("is now Paid"));

    let out = run_ok(&config_path, &["report", "--year", "2024"]);
    assert!(out.contains("300.000"));
}

#[test]
fn test_invalid_status_and_category() {
    let (_temp, config_path) = setup();
    let customer = add_customer(&config_path, "Siti Aminah", "081234567890");

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args([
            "payments", "add", "--customer", &customer, "--month", "8", "--year", "2024",
            "--amount", "1000", "--status", "refunded",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payment status"));

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["expenses", "add", "--category", "food", "--amount", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid expense category"));
}

#[test]
fn test_payment_month_out_of_range() {
    let (_temp, config_path) = setup();
    let customer = add_customer(&config_path, "Siti Aminah", "081234567890");

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args([
            "payments", "add", "--customer", &customer, "--month", "13", "--year", "2024",
            "--amount", "1000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month 13"));
}

#[test]
fn test_report_export_writes_workbook() {
    let (_temp, config_path) = setup();

    let out = run_ok(&config_path, &["report", "--year", "2023", "--export"]);
    assert!(out.contains("Report_WiFi_2023.xlsx"));
    let path = config_path.join("output").join("Report_WiFi_2023.xlsx");
    assert!(path.exists());

    let sheets = read_sheets(&path, &["Report 2023"]).unwrap();
    assert_eq!(sheets.len(), 1);
    let sheet = &sheets[0];
    assert_eq!(sheet.headers, HEADERS.map(String::from).to_vec());
    assert_eq!(sheet.rows.len(), 13);
    assert_eq!(sheet.rows[0][0], Cell::Text("January".into()));

    let totals = sheet.rows.last().unwrap();
    assert_eq!(totals[0], Cell::Text("TOTAL".into()));
    assert_eq!(totals[1], Cell::Number(0.0));
    for idx in 4..HEADERS.len() {
        assert_eq!(totals.get(idx).unwrap_or(&Cell::Empty), &Cell::Empty, "column {idx}");
    }
}

#[test]
fn test_backup_then_import_into_new_ledger() {
    let (temp, config_path) = setup();
    add_customer(&config_path, "Siti Aminah", "081234567890");
    add_customer(&config_path, "Budi Santoso", "081298765432");
    run_ok(
        &config_path,
        &[
            "expenses", "add", "--category", "isp", "--amount", "500000", "--date",
            "2024-02-01", "--description", "Upstream bandwidth",
        ],
    );

    let backup_dir = temp.path().join("backups");
    let out = run_ok(
        &config_path,
        &["backup", "--output", backup_dir.to_str().unwrap()],
    );
    assert!(out.contains("Backup_WiFi_"));
    let backup = fs::read_dir(&backup_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();

    let other_path = temp.path().join("other-config");
    ledger_cmd()
        .args(["-C", other_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    let out = run_ok(&other_path, &["import", backup.to_str().unwrap()]);
    assert!(out.contains("Imported 2 customers and 1 expenses"));

    // Importing the same workbook again trips the phone uniqueness check.
    let out = run_ok(&other_path, &["import", backup.to_str().unwrap()]);
    assert!(out.contains("Imported 0 customers and 1 expenses"));
    assert!(out.contains("Customers row 2"));
    assert!(out.contains("already registered"));
}

#[test]
fn test_invoice_links_without_pdf() {
    let (_temp, config_path) = setup();
    let customer = add_customer(&config_path, "Siti Aminah", "081234567890");
    let out = run_ok(
        &config_path,
        &[
            "payments", "add", "--customer", &customer, "--month", "8", "--year", "2024",
            "--amount", "150000", "--status", "paid",
        ],
    );
    let payment = printed_id(&out);

    let out = run_ok(
        &config_path,
        &["invoice", &payment, "--no-pdf", "--whatsapp", "--email"],
    );
    assert!(out.contains("Invoice INV"));
    assert!(out.contains("Rp 150.000"));
    assert!(out.contains("https://wa.me/6281234567890?text="));
    assert!(out.contains("Subject: WiFi Payment Invoice - INV"));
}

#[test]
fn test_dashboard_and_settings() {
    let (_temp, config_path) = setup();
    add_customer(&config_path, "Siti Aminah", "081234567890");

    let out = run_ok(&config_path, &["dashboard"]);
    assert!(out.contains("Customers: 1"));
    assert!(out.contains("(0.0%)"));

    let out = run_ok(&config_path, &["settings", "set", "--reminders", "false"]);
    assert!(out.contains("Reminders:      off"));
    let out = run_ok(&config_path, &["settings", "show"]);
    assert!(out.contains("Settings for local"));
    assert!(out.contains("Reminders:      off"));
}

#[test]
fn test_delete_missing_customer() {
    let (_temp, config_path) = setup();

    ledger_cmd()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["customers", "delete", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Customer 'nope' not found"));
}
