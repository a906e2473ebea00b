use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::model::{Customer, NewPayment, Payment, PaymentStatus};
use crate::store::{from_row, tables, to_row, Query, RecordStore, Row};

use super::{check_month, list_customers, single};

/// A payment joined with its customer (when the customer still exists).
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentView {
    pub payment: Payment,
    pub customer: Option<Customer>,
}

impl PaymentView {
    fn matches(&self, term: &str) -> bool {
        match &self.customer {
            Some(c) => c.matches(term),
            None => term.trim().is_empty(),
        }
    }
}

/// Decode payment rows one by one. A row that does not decode, typically a
/// status outside the four known values, is skipped with a warning so the
/// rest of the list still shows.
pub(super) fn decode_payments(rows: Vec<Row>) -> Vec<Payment> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            let status = row.get("status").cloned().unwrap_or(Value::Null);
            match from_row::<Payment>(row) {
                Ok(payment) => Some(payment),
                Err(e) => {
                    tracing::warn!(%id, %status, error = %e, "skipping undecodable payment row");
                    None
                }
            }
        })
        .collect()
}

/// All payments, newest first, each joined with its customer. Rows that do
/// not decode are left out with a warning.
pub fn list_payments(store: &dyn RecordStore) -> Result<Vec<PaymentView>> {
    let rows = store.select(&Query::table(tables::PAYMENTS).order("created_at", false))?;
    let payments = decode_payments(rows);

    let customers: HashMap<String, Customer> = list_customers(store)?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();

    Ok(payments
        .into_iter()
        .map(|payment| {
            let customer = customers.get(&payment.customer_id).cloned();
            PaymentView { payment, customer }
        })
        .collect())
}

/// Narrow by customer name/phone and optionally by status.
pub fn filter_payments<'a>(
    views: &'a [PaymentView],
    term: &str,
    status: Option<PaymentStatus>,
) -> Vec<&'a PaymentView> {
    views
        .iter()
        .filter(|v| v.matches(term))
        .filter(|v| status.map_or(true, |s| v.payment.status == s))
        .collect()
}

pub fn get_payment(store: &dyn RecordStore, id: &str) -> Result<Payment> {
    let rows = store.select(&Query::table(tables::PAYMENTS).eq("id", id))?;
    single(rows, AppError::PaymentNotFound(id.to_string()))
}

pub fn add_payment(store: &dyn RecordStore, payment: &NewPayment) -> Result<Payment> {
    check_month(payment.month)?;
    if payment.nominal < 0 {
        return Err(AppError::NegativeAmount);
    }

    let row = store.insert(tables::PAYMENTS, to_row(payment)?)?;
    tracing::info!(
        customer = %payment.customer_id,
        month = payment.month,
        year = payment.year,
        "payment recorded"
    );
    from_row(row)
}

/// Change a payment's status. Marking it paid stamps `today` as the paid-on
/// date; any other status clears it.
pub fn set_payment_status(
    store: &dyn RecordStore,
    id: &str,
    status: PaymentStatus,
    today: NaiveDate,
) -> Result<Payment> {
    let paid_on = match status {
        PaymentStatus::Paid => Value::String(today.format("%Y-%m-%d").to_string()),
        _ => Value::Null,
    };

    let mut changes = Row::new();
    changes.insert("status".to_string(), json!(status.as_stored()));
    changes.insert("tgl_bayar".to_string(), paid_on);

    let rows = store.update(&Query::table(tables::PAYMENTS).eq("id", id), changes)?;
    single(rows, AppError::PaymentNotFound(id.to_string()))
}

pub fn delete_payment(store: &dyn RecordStore, id: &str) -> Result<()> {
    get_payment(store, id)?;
    store.delete(&Query::table(tables::PAYMENTS).eq("id", id))?;
    Ok(())
}
