use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

use isp_ledger::auth::{demo_sign_in, AuthClient, Session};
use isp_ledger::config::{
    self, clear_session, config_dir, load_config, load_session, local_store_file, save_session,
    Config, StoreMode, CONFIG_TEMPLATE,
};
use isp_ledger::error::{AppError, Result};
use isp_ledger::invoice::{invoice_path, whatsapp_link, EmailMessage, InvoiceData};
use isp_ledger::ledger;
use isp_ledger::model::{
    CustomerChanges, ExpenseCategory, ExpenseChanges, NewCustomer, NewExpense, NewPayment,
    PaymentStatus, SettingsChanges,
};
use isp_ledger::money::{format_grouped_int, format_money};
use isp_ledger::pdf::generate_invoice_pdf;
use isp_ledger::report::{
    aggregate_year, summarize, write_report_xlsx, DashboardSummary, Period, RefreshLoop,
    ReportTable, HEADERS,
};
use isp_ledger::store::{LocalStore, RecordStore, RestStore};
use isp_ledger::transfer::workbook::{parse_date, Cell};
use isp_ledger::transfer::{import_file, write_backup};

#[derive(Parser)]
#[command(name = "isp-ledger")]
#[command(version, about = "Customer, payment and expense ledger for small ISPs", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.isp-ledger or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Show debug logs on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Sign in to the hosted backend
    Login {
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account on the hosted backend
    Signup {
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Manage monthly payments
    Payments {
        #[command(subcommand)]
        action: PaymentAction,
    },

    /// Manage operating expenses
    Expenses {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Show this month's figures and the yearly chart
    Dashboard {
        /// Refresh every SECS seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Monthly financial report for a year
    Report {
        /// Year to report on (default: current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Also write Report_WiFi_<year>.xlsx to the output directory
        #[arg(long)]
        export: bool,
    },

    /// Write every record to a Backup_WiFi_<date>.xlsx workbook
    Backup {
        /// Directory to write into (default: output dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import customers and expenses from an .xlsx workbook
    Import {
        file: PathBuf,
    },

    /// Build the invoice for a payment
    Invoice {
        /// Payment id
        payment: String,

        /// Open the generated PDF with the system default viewer
        #[arg(long)]
        open: bool,

        /// Print a WhatsApp link with the invoice message
        #[arg(long)]
        whatsapp: bool,

        /// Print the email subject, body and mailto link
        #[arg(long)]
        email: bool,

        /// Skip PDF rendering
        #[arg(long)]
        no_pdf: bool,
    },

    /// Per-user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List customers, newest first
    List {
        /// Filter by name or phone
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        package: String,
        #[arg(long, default_value = "")]
        address: String,
        /// Registration date YYYY-MM-DD (default: today)
        #[arg(long)]
        registered: Option<String>,
        /// Usual payment day of month (1-31)
        #[arg(long, default_value_t = 1)]
        payment_day: u32,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Change a customer's details
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        package: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        registered: Option<String>,
        #[arg(long)]
        payment_day: Option<u32>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show a customer and their payment history
    Show { id: String },
    /// Delete a customer
    Delete { id: String },
}

#[derive(Subcommand)]
enum PaymentAction {
    /// List payments, newest first
    List {
        /// Filter by customer name or phone
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by status (paid, unpaid, overdue, free)
        #[arg(long)]
        status: Option<String>,
    },
    /// Record a payment for a billing month
    Add {
        /// Customer id
        #[arg(long)]
        customer: String,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        amount: i64,
        /// paid, unpaid, overdue or free
        #[arg(long, default_value = "unpaid")]
        status: String,
    },
    /// Change a payment's status
    Status { id: String, status: String },
    /// Delete a payment
    Delete { id: String },
}

#[derive(Subcommand)]
enum ExpenseAction {
    /// List expenses, newest first
    List,
    /// Log an expense
    Add {
        /// isp, electricity, equipment, maintenance or other
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: i64,
        /// Expense date YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change an expense
    Edit {
        id: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<i64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an expense
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,
    /// Change settings
    Set {
        #[arg(long)]
        business_name: Option<String>,
        #[arg(long)]
        reminders: Option<bool>,
        #[arg(long)]
        email_reports: Option<bool>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    isp_ledger::logging::init(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Login { email, password } => cmd_login(&cfg_dir, &email, password),
        Commands::Signup { email, password } => cmd_signup(&cfg_dir, &email, password),
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::Customers { action } => cmd_customers(&Workspace::open(&cfg_dir)?, action),
        Commands::Payments { action } => cmd_payments(&Workspace::open(&cfg_dir)?, action),
        Commands::Expenses { action } => cmd_expenses(&Workspace::open(&cfg_dir)?, action),
        Commands::Dashboard { watch } => cmd_dashboard(&Workspace::open(&cfg_dir)?, watch),
        Commands::Report { year, export } => cmd_report(&Workspace::open(&cfg_dir)?, year, export),
        Commands::Backup { output } => cmd_backup(&Workspace::open(&cfg_dir)?, output),
        Commands::Import { file } => cmd_import(&Workspace::open(&cfg_dir)?, &file),
        Commands::Invoice {
            payment,
            open,
            whatsapp,
            email,
            no_pdf,
        } => cmd_invoice(
            &Workspace::open(&cfg_dir)?,
            &payment,
            InvoiceOutputs {
                open,
                whatsapp,
                email,
                pdf: !no_pdf,
            },
        ),
        Commands::Settings { action } => cmd_settings(&Workspace::open(&cfg_dir)?, action),
    }
}

/// Loaded config plus the store and session every data command works with.
struct Workspace {
    cfg_dir: PathBuf,
    config: Config,
    store: Arc<dyn RecordStore>,
    session: Session,
}

impl Workspace {
    fn open(cfg_dir: &Path) -> Result<Self> {
        let config = load_config(cfg_dir)?;

        let (store, session): (Arc<dyn RecordStore>, Session) = match config.backend.mode {
            StoreMode::Local => {
                let store = LocalStore::open(&local_store_file(cfg_dir))?;
                (Arc::new(store), Session::local())
            }
            StoreMode::Remote => {
                let url = config
                    .backend
                    .url
                    .clone()
                    .ok_or(AppError::MissingBackendUrl)?;
                let api_key = config.backend.api_key().ok_or(AppError::MissingApiKey)?;
                let session = remote_session(cfg_dir, &config)?;
                let store = RestStore::new(
                    &url,
                    &api_key,
                    Some(&session),
                    config.backend.timeout_secs,
                );
                (Arc::new(store), session)
            }
        };

        Ok(Self {
            cfg_dir: cfg_dir.to_path_buf(),
            config,
            store,
            session,
        })
    }

    fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    fn output_dir(&self) -> PathBuf {
        config::resolve_output_dir(&self.config.output.dir, &self.cfg_dir)
    }

    fn money(&self, value: i64) -> String {
        format_money(value, &self.config.business.currency_symbol)
    }
}

/// Saved session if still valid, otherwise the demo account when enabled.
fn remote_session(cfg_dir: &Path, config: &Config) -> Result<Session> {
    let now = chrono::Utc::now().timestamp();
    if let Some(session) = load_session(cfg_dir)?.filter(|s| !s.is_expired(now)) {
        return Ok(session);
    }
    if config.demo.enabled {
        let session = demo_sign_in(config)?;
        save_session(cfg_dir, &session)?;
        return Ok(session);
    }
    Err(AppError::NotSignedIn)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn parse_cli_date(value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| AppError::InvalidDate(value.to_string()))
}

fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(AppError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized isp-ledger config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your business details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. For the hosted backend set [backend] mode = \"remote\" and run:");
    println!("       isp-ledger login <email>");
    println!();
    println!("Then register your first customer:");
    println!("  isp-ledger customers add --name <name> --phone <phone> --package <package>");

    Ok(())
}

fn cmd_login(cfg_dir: &Path, email: &str, password: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let password = read_password(password)?;
    let session = AuthClient::new(&config.backend)?.sign_in(email, &password)?;
    save_session(cfg_dir, &session)?;
    println!("Signed in as {}", session.email);
    Ok(())
}

fn cmd_signup(cfg_dir: &Path, email: &str, password: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let password = read_password(password)?;
    match AuthClient::new(&config.backend)?.sign_up(email, &password)? {
        Some(session) => {
            save_session(cfg_dir, &session)?;
            println!("Account created. Signed in as {}", session.email);
        }
        None => println!("Account created. Check {email} for a confirmation link, then log in."),
    }
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    if let Some(session) = load_session(cfg_dir)? {
        if let Err(e) = AuthClient::new(&config.backend).and_then(|c| c.sign_out(&session)) {
            tracing::warn!(error = %e, "remote sign-out failed; clearing local session anyway");
        }
    }
    clear_session(cfg_dir)?;
    println!("Signed out");
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "PACKAGE")]
    package: String,
    #[tabled(rename = "REGISTERED")]
    registered: String,
    #[tabled(rename = "PAY DAY")]
    payment_day: u32,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "PERIOD")]
    period: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PAID ON")]
    paid_on: String,
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "MONTH")]
    month: &'static str,
    #[tabled(rename = "INCOME")]
    income: String,
    #[tabled(rename = "EXPENSE")]
    expense: String,
}

fn period_text(month: u32, year: i32) -> String {
    match Period::new(year, month) {
        Ok(p) => format!("{} {year}", p.short_label()),
        Err(_) => format!("{month}/{year}"),
    }
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn cmd_customers(ws: &Workspace, action: CustomerAction) -> Result<()> {
    let store = ws.store();
    match action {
        CustomerAction::List { search } => {
            let customers = ledger::list_customers(store)?;
            let shown = ledger::search_customers(&customers, search.as_deref().unwrap_or(""));

            if shown.is_empty() {
                println!("No customers found.");
                return Ok(());
            }

            let rows: Vec<CustomerRow> = shown
                .iter()
                .map(|c| CustomerRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    phone: c.phone.clone(),
                    package: c.package.clone(),
                    registered: c.registered_on.to_string(),
                    payment_day: c.payment_day,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!("{} of {} customers", shown.len(), customers.len());
        }
        CustomerAction::Add {
            name,
            phone,
            package,
            address,
            registered,
            payment_day,
            note,
        } => {
            let registered_on = match registered {
                Some(s) => parse_cli_date(&s)?,
                None => today(),
            };
            let customer = ledger::add_customer(
                store,
                &NewCustomer {
                    name,
                    address,
                    phone,
                    package,
                    registered_on,
                    payment_day,
                    payment_note: note,
                },
            )?;
            println!("Added customer {} ({})", customer.name, customer.id);
        }
        CustomerAction::Edit {
            id,
            name,
            phone,
            package,
            address,
            registered,
            payment_day,
            note,
        } => {
            let changes = CustomerChanges {
                name,
                address,
                phone,
                package,
                registered_on: registered.as_deref().map(parse_cli_date).transpose()?,
                payment_day,
                payment_note: note,
            };
            let customer = ledger::update_customer(store, &id, &changes)?;
            println!("Updated customer {}", customer.name);
        }
        CustomerAction::Show { id } => {
            let customer = ledger::get_customer(store, &id)?;
            println!("{}", customer.name);
            println!("  Phone:      {}", customer.phone);
            println!("  Address:    {}", customer.address.as_deref().unwrap_or("-"));
            println!("  Package:    {}", customer.package);
            println!("  Registered: {}", customer.registered_on);
            println!("  Pays on:    day {}", customer.payment_day);
            if let Some(note) = customer.payment_note.as_deref().filter(|n| !n.is_empty()) {
                println!("  Note:       {note}");
            }
            println!();

            let payments = ledger::customer_payments(store, &id)?;
            if payments.is_empty() {
                println!("No payments recorded.");
                return Ok(());
            }
            let rows: Vec<PaymentRow> = payments
                .iter()
                .map(|p| PaymentRow {
                    id: p.id.clone(),
                    customer: customer.name.clone(),
                    period: period_text(p.month, p.year),
                    amount: ws.money(p.nominal),
                    status: p.status.to_string(),
                    paid_on: optional_date(p.paid_on),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        CustomerAction::Delete { id } => {
            ledger::delete_customer(store, &id)?;
            println!("Deleted customer {id}");
        }
    }
    Ok(())
}

fn cmd_payments(ws: &Workspace, action: PaymentAction) -> Result<()> {
    let store = ws.store();
    match action {
        PaymentAction::List { search, status } => {
            let status = status.as_deref().map(str::parse::<PaymentStatus>).transpose()?;
            let views = ledger::list_payments(store)?;
            let shown = ledger::filter_payments(&views, search.as_deref().unwrap_or(""), status);

            if shown.is_empty() {
                println!("No payments found.");
                return Ok(());
            }

            let rows: Vec<PaymentRow> = shown
                .iter()
                .map(|v| PaymentRow {
                    id: v.payment.id.clone(),
                    customer: v
                        .customer
                        .as_ref()
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| "(deleted)".to_string()),
                    period: period_text(v.payment.month, v.payment.year),
                    amount: ws.money(v.payment.nominal),
                    status: v.payment.status.to_string(),
                    paid_on: optional_date(v.payment.paid_on),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        PaymentAction::Add {
            customer,
            month,
            year,
            amount,
            status,
        } => {
            let status: PaymentStatus = status.parse()?;
            ledger::get_customer(store, &customer)?;
            let payment = ledger::add_payment(
                store,
                &NewPayment {
                    customer_id: customer,
                    month,
                    year,
                    nominal: amount,
                    status,
                    paid_on: (status == PaymentStatus::Paid).then(today),
                },
            )?;
            println!(
                "Recorded {} payment of {} for {} ({})",
                payment.status,
                ws.money(payment.nominal),
                period_text(payment.month, payment.year),
                payment.id
            );
        }
        PaymentAction::Status { id, status } => {
            let status: PaymentStatus = status.parse()?;
            let payment = ledger::set_payment_status(store, &id, status, today())?;
            println!("Payment {} is now {}", payment.id, payment.status);
        }
        PaymentAction::Delete { id } => {
            ledger::delete_payment(store, &id)?;
            println!("Deleted payment {id}");
        }
    }
    Ok(())
}

fn cmd_expenses(ws: &Workspace, action: ExpenseAction) -> Result<()> {
    let store = ws.store();
    match action {
        ExpenseAction::List => {
            let expenses = ledger::list_expenses(store)?;
            if expenses.is_empty() {
                println!("No expenses recorded.");
                return Ok(());
            }

            let total: i64 = expenses.iter().map(|e| e.nominal).sum();
            let rows: Vec<ExpenseRow> = expenses
                .iter()
                .map(|e| ExpenseRow {
                    id: e.id.clone(),
                    date: e.spent_on.to_string(),
                    category: e.category.to_string(),
                    description: e.description.clone().unwrap_or_default(),
                    amount: ws.money(e.nominal),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!("Total: {}", ws.money(total));
        }
        ExpenseAction::Add {
            category,
            amount,
            date,
            description,
        } => {
            let category: ExpenseCategory = category.parse()?;
            let spent_on = match date {
                Some(s) => parse_cli_date(&s)?,
                None => today(),
            };
            let expense = ledger::add_expense(
                store,
                &NewExpense {
                    category,
                    description,
                    nominal: amount,
                    spent_on,
                },
            )?;
            println!(
                "Logged {} expense of {} ({})",
                expense.category,
                ws.money(expense.nominal),
                expense.id
            );
        }
        ExpenseAction::Edit {
            id,
            category,
            amount,
            date,
            description,
        } => {
            let changes = ExpenseChanges {
                category: category.as_deref().map(str::parse).transpose()?,
                description,
                nominal: amount,
                spent_on: date.as_deref().map(parse_cli_date).transpose()?,
            };
            let expense = ledger::update_expense(store, &id, &changes)?;
            println!("Updated expense {}", expense.id);
        }
        ExpenseAction::Delete { id } => {
            ledger::delete_expense(store, &id)?;
            println!("Deleted expense {id}");
        }
    }
    Ok(())
}

fn print_dashboard(ws: &Workspace, summary: &DashboardSummary) {
    let current = &summary.current;
    println!("{} {}", current.month, current.period.year());
    println!("  Customers: {}", summary.total_customers);
    println!("  Income:    {}", ws.money(current.income));
    println!("  Expenses:  {}", ws.money(current.expenses));
    println!("  Profit:    {}", ws.money(current.profit));
    println!();
    println!("  Payment status this month:");
    for status in PaymentStatus::ALL {
        println!(
            "    {:<8} {:>4}  ({:.1}%)",
            status.to_string(),
            current.payments.get(status),
            current.payments.share(status)
        );
    }
    println!();

    let rows: Vec<ChartRow> = summary
        .series
        .iter()
        .map(|p| ChartRow {
            month: p.label,
            income: ws.money(p.income),
            expense: ws.money(p.expense),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn cmd_dashboard(ws: &Workspace, watch: Option<u64>) -> Result<()> {
    let Some(secs) = watch else {
        let summary = summarize(ws.store(), today())?;
        print_dashboard(ws, &summary);
        return Ok(());
    };

    let interval = Duration::from_secs(secs.max(1));
    let mut refresh: RefreshLoop<DashboardSummary> = RefreshLoop::new();

    loop {
        let store = Arc::clone(&ws.store);
        refresh.tick(move || summarize(store.as_ref(), today()));

        thread::sleep(interval);

        if let Some(summary) = refresh.take_new() {
            println!(
                "--- refreshed {} ---",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            print_dashboard(ws, &summary);
        }
    }
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => format_grouped_int(n.round() as i64),
        Cell::Date(d) => d.to_string(),
    }
}

fn cmd_report(ws: &Workspace, year: Option<i32>, export: bool) -> Result<()> {
    let year = year.unwrap_or_else(|| today().year());
    let reports = aggregate_year(ws.store(), year)?;
    let table = ReportTable::from_reports(&reports);

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(HEADERS);
    for row in &table.rows {
        builder.push_record(row.iter().map(render_cell));
    }
    println!("Financial report {year}");
    println!("{}", builder.build().with(Style::rounded()));

    if export {
        let path = write_report_xlsx(&table, year, &ws.output_dir())?;
        println!("Saved: {}", path.display());
    }
    Ok(())
}

fn cmd_backup(ws: &Workspace, output: Option<PathBuf>) -> Result<()> {
    let dir = output.unwrap_or_else(|| ws.output_dir());
    let path = write_backup(ws.store(), &dir, today())?;
    println!("Backup saved: {}", path.display());
    Ok(())
}

fn cmd_import(ws: &Workspace, file: &Path) -> Result<()> {
    let summary = import_file(ws.store(), file)?;

    println!("Imported {} customers and {} expenses", summary.customers, summary.expenses);
    if !summary.errors.is_empty() {
        println!();
        println!("{} rows skipped:", summary.errors.len());
        for error in &summary.errors {
            println!("  {error}");
        }
    }
    Ok(())
}

struct InvoiceOutputs {
    open: bool,
    whatsapp: bool,
    email: bool,
    pdf: bool,
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}

fn cmd_invoice(ws: &Workspace, payment_id: &str, outputs: InvoiceOutputs) -> Result<()> {
    let store = ws.store();
    let payment = ledger::get_payment(store, payment_id)?;
    let customer = ledger::get_customer(store, &payment.customer_id)?;
    let invoice = InvoiceData::new(&payment, &customer, &ws.config, today());

    println!("Invoice {}", invoice.number);
    println!("  Customer: {} ({})", invoice.customer_name, invoice.customer_phone);
    println!("  Period:   {}", invoice.period);
    println!("  Total:    {}", invoice.amount);
    println!("  Status:   {}", invoice.status);
    println!("  Due:      {}", invoice.due_date);

    if outputs.pdf {
        let path = invoice_path(&ws.output_dir(), &invoice);
        generate_invoice_pdf(&invoice, &path)?;
        println!("  Saved:    {}", path.display());
        if outputs.open {
            open_path(&path)?;
        }
    }

    if outputs.whatsapp {
        println!();
        println!("WhatsApp: {}", whatsapp_link(&invoice));
    }

    if outputs.email {
        let email = EmailMessage::for_invoice(&invoice);
        println!();
        println!("Subject: {}", email.subject);
        println!();
        println!("{}", email.body);
        println!();
        println!("Mail link: {}", email.mailto_link());
    }

    Ok(())
}

fn cmd_settings(ws: &Workspace, action: SettingsAction) -> Result<()> {
    let settings = match action {
        SettingsAction::Show => ledger::load_settings(ws.store(), &ws.session)?,
        SettingsAction::Set {
            business_name,
            reminders,
            email_reports,
        } => ledger::update_settings(
            ws.store(),
            &ws.session,
            &SettingsChanges {
                business_name,
                reminder_enabled: reminders,
                email_reports_enabled: email_reports,
            },
        )?,
    };

    println!("Settings for {}", settings.user_id);
    println!(
        "  Business name:  {}",
        settings
            .business_name
            .as_deref()
            .unwrap_or(&ws.config.business.name)
    );
    println!("  Reminders:      {}", on_off(settings.reminder_enabled));
    println!("  Email reports:  {}", on_off(settings.email_reports_enabled));
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
