use crate::error::{AppError, Result};
use crate::model::{Customer, CustomerChanges, NewCustomer, Payment};
use crate::store::{from_row, from_rows, tables, to_row, Query, RecordStore, StoreError};

use super::payments::decode_payments;
use super::single;

fn check_payment_day(day: u32) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(AppError::InvalidPaymentDay(day))
    }
}

/// Map a phone uniqueness conflict to its own error; pass everything else on.
fn phone_conflict(err: StoreError, phone: Option<&str>) -> AppError {
    if err.is_unique_violation() {
        AppError::PhoneAlreadyRegistered(phone.unwrap_or("").to_string())
    } else {
        AppError::Store(err)
    }
}

/// All customers, newest first.
pub fn list_customers(store: &dyn RecordStore) -> Result<Vec<Customer>> {
    let rows = store.select(&Query::table(tables::CUSTOMERS).order("created_at", false))?;
    from_rows(rows)
}

pub fn search_customers<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    customers.iter().filter(|c| c.matches(term)).collect()
}

pub fn count_customers(store: &dyn RecordStore) -> Result<u64> {
    Ok(store.count(&Query::table(tables::CUSTOMERS))?)
}

pub fn get_customer(store: &dyn RecordStore, id: &str) -> Result<Customer> {
    let rows = store.select(&Query::table(tables::CUSTOMERS).eq("id", id))?;
    single(rows, AppError::CustomerNotFound(id.to_string()))
}

pub fn add_customer(store: &dyn RecordStore, customer: &NewCustomer) -> Result<Customer> {
    check_payment_day(customer.payment_day)?;

    let row = store
        .insert(tables::CUSTOMERS, to_row(customer)?)
        .map_err(|e| phone_conflict(e, Some(customer.phone.as_str())))?;

    tracing::info!(phone = %customer.phone, "customer added");
    from_row(row)
}

pub fn update_customer(
    store: &dyn RecordStore,
    id: &str,
    changes: &CustomerChanges,
) -> Result<Customer> {
    if let Some(day) = changes.payment_day {
        check_payment_day(day)?;
    }
    if changes.is_empty() {
        return get_customer(store, id);
    }

    let rows = store
        .update(
            &Query::table(tables::CUSTOMERS).eq("id", id),
            to_row(changes)?,
        )
        .map_err(|e| phone_conflict(e, changes.phone.as_deref()))?;
    single(rows, AppError::CustomerNotFound(id.to_string()))
}

/// Deleting a customer leaves their payments to the store's own cascade rules.
pub fn delete_customer(store: &dyn RecordStore, id: &str) -> Result<()> {
    get_customer(store, id)?;
    store.delete(&Query::table(tables::CUSTOMERS).eq("id", id))?;
    tracing::info!(id, "customer deleted");
    Ok(())
}

/// Payment history for one customer, most recent period first.
pub fn customer_payments(store: &dyn RecordStore, customer_id: &str) -> Result<Vec<Payment>> {
    let rows = store.select(
        &Query::table(tables::PAYMENTS)
            .eq("pelanggan_id", customer_id)
            .order("created_at", false),
    )?;
    let mut payments = decode_payments(rows);
    payments.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    Ok(payments)
}
