use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config directory not found at {0}. Run 'isp-ledger init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Backend URL is not configured. Set [backend] url in config.toml.")]
    MissingBackendUrl,

    #[error("Backend API key is not configured. Set [backend] anon_key or ISP_LEDGER_ANON_KEY.")]
    MissingApiKey,

    #[error("Not signed in. Run 'isp-ledger login' first.")]
    NotSignedIn,

    #[error("Demo login is disabled. Set [demo] enabled = true in a non-production config.")]
    DemoDisabled,

    #[error("Demo login needs [demo] email and password in config.toml")]
    DemoCredentialsMissing,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Phone number {0} is already registered. Use a different phone number.")]
    PhoneAlreadyRegistered(String),

    #[error("Customer '{0}' not found")]
    CustomerNotFound(String),

    #[error("Payment '{0}' not found")]
    PaymentNotFound(String),

    #[error("Expense '{0}' not found")]
    ExpenseNotFound(String),

    #[error("Invalid month {0}. Expected a value from 1 to 12.")]
    InvalidMonth(u32),

    #[error("Invalid payment day {0}. Expected a value from 1 to 31.")]
    InvalidPaymentDay(u32),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid payment status '{0}'. Use paid, unpaid, overdue or free.")]
    InvalidStatus(String),

    #[error("Invalid expense category '{0}'. Use isp, electricity, equipment, maintenance or other.")]
    InvalidCategory(String),

    #[error("Amount must not be negative")]
    NegativeAmount,

    #[error("Failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read spreadsheet {path}: {message}")]
    SpreadsheetRead { path: PathBuf, message: String },

    #[error("Failed to write spreadsheet {path}: {message}")]
    SpreadsheetWrite { path: PathBuf, message: String },

    #[error("Failed to render QR code: {0}")]
    QrCode(String),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
