//! Typed create/read/update/delete over the record store.
//!
//! Every function takes the store explicitly and returns a [`Result`](crate::Result);
//! store failures surface as `AppError::Store` with the backend's message,
//! and phone-number conflicts as `AppError::PhoneAlreadyRegistered`.

mod customers;
mod expenses;
mod payments;
mod settings;

pub use customers::{
    add_customer, count_customers, customer_payments, delete_customer, get_customer,
    list_customers, search_customers, update_customer,
};
pub use expenses::{add_expense, delete_expense, get_expense, list_expenses, update_expense};
pub use payments::{
    add_payment, delete_payment, filter_payments, get_payment, list_payments,
    set_payment_status, PaymentView,
};
pub use settings::{load_settings, update_settings};

use crate::error::{AppError, Result};
use crate::store::{from_row, Row};

/// Validate a billing month (1-12).
pub fn check_month(month: u32) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(AppError::InvalidMonth(month))
    }
}

/// Decode the single row an update/select-by-id returned, or report `missing`.
fn single<T: serde::de::DeserializeOwned>(rows: Vec<Row>, missing: AppError) -> Result<T> {
    match rows.into_iter().next() {
        Some(row) => from_row(row),
        None => Err(missing),
    }
}
