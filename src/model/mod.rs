//! Records as stored by the backend. Column names follow the hosted schema;
//! field names are English.

mod customer;
mod expense;
mod payment;
mod settings;

pub use customer::{Customer, CustomerChanges, NewCustomer};
pub use expense::{Expense, ExpenseCategory, ExpenseChanges, NewExpense};
pub use payment::{NewPayment, Payment, PaymentStatus, PaymentTally};
pub use settings::{SettingsChanges, UserSettings};

/// Nominal amounts in integer currency units. Numeric columns may come back
/// as integers, decimals or strings depending on the backend; all are
/// accepted and decimals are rounded.
pub(crate) mod amount {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(v),
            Raw::Float(v) => Ok(v.round() as i64),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(|v| v.round() as i64)
                .map_err(|_| de::Error::custom(format!("invalid amount '{s}'"))),
        }
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        #[derive(Deserialize)]
        struct Wrap(#[serde(deserialize_with = "crate::model::amount::deserialize")] i64);

        Ok(Option::<Wrap>::deserialize(deserializer)?.map(|w| w.0))
    }
}
