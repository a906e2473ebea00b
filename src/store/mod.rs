//! Record store abstraction.
//!
//! Everything the ledger persists goes through [`RecordStore`], a small
//! PostgREST-shaped interface: equality and range filters, ordering, counting,
//! and row-level insert/update/delete. Rows travel as JSON objects so the same
//! trait fits the hosted backend ([`RestStore`]) and the file-backed
//! [`LocalStore`] used offline and in tests.

mod local;
pub(crate) mod rest;

pub use local::LocalStore;
pub use rest::RestStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Table names as they exist in the hosted schema.
pub mod tables {
    pub const CUSTOMERS: &str = "customers";
    pub const PAYMENTS: &str = "payments";
    pub const EXPENSES: &str = "modal_wifi";
    pub const SETTINGS: &str = "user_settings";
}

/// Postgres SQLSTATE for unique constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

pub type Row = serde_json::Map<String, Value>;

/// Failure reported by the store, carrying its own code when it has one.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    pub code: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code.as_deref() == Some(UNIQUE_VIOLATION)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::Lt(c, _) | Filter::Lte(c, _) => c,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Filter::Eq(_, v) | Filter::Gte(_, v) | Filter::Lt(_, v) | Filter::Lte(_, v) => v,
        }
    }

    /// PostgREST operator prefix (`eq`, `gte`, ...).
    pub fn operator(&self) -> &'static str {
        match self {
            Filter::Eq(..) => "eq",
            Filter::Gte(..) => "gte",
            Filter::Lt(..) => "lt",
            Filter::Lte(..) => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A filtered, optionally ordered view of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn table(name: &str) -> Self {
        Self {
            table: name.to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn lt(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Lt(column.to_string(), value.into()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Lte(column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }
}

pub trait RecordStore: Send + Sync {
    /// Rows matching every filter, in the requested order.
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Number of rows matching every filter.
    fn count(&self, query: &Query) -> Result<u64, StoreError>;

    /// Insert one row and return it as stored (with generated columns).
    fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Apply `changes` to every matching row and return the updated rows.
    fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError>;

    /// Delete every matching row.
    fn delete(&self, query: &Query) -> Result<(), StoreError>;
}

/// Serialize a record into a store row. Non-object values are rejected.
pub fn to_row<T: Serialize>(value: &T) -> crate::Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::new(format!("expected a JSON object, got {other}")).into()),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> crate::Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> crate::Result<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}
