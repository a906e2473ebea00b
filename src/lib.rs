pub mod auth;
pub mod config;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod money;
pub mod pdf;
pub mod report;
pub mod store;
pub mod transfer;

pub use auth::Session;
pub use config::Config;
pub use error::{AppError, Result};
pub use report::{aggregate_month, aggregate_year, MonthlyReport, StatusCounts};
pub use store::{LocalStore, RecordStore, RestStore, StoreError};
