use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{tables, Filter, Query, RecordStore, Row, StoreError, UNIQUE_VIOLATION};

type Tables = BTreeMap<String, Vec<Row>>;

/// Columns that must be unique within their table, mirroring the hosted schema.
const UNIQUE_COLUMNS: &[(&str, &str)] = &[
    (tables::CUSTOMERS, "no_hp"),
    (tables::SETTINGS, "user_id"),
];

/// In-process record store, optionally persisted as a JSON file.
pub struct LocalStore {
    path: Option<PathBuf>,
    tables: Mutex<Tables>,
}

impl LocalStore {
    /// Empty store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: Mutex::new(Tables::new()),
        }
    }

    /// Open a store backed by `path`, loading existing rows if the file exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let tables = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| StoreError::new(format!("failed to read {}: {e}", path.display())))?;
            serde_json::from_str(&content)
                .map_err(|e| StoreError::new(format!("failed to parse {}: {e}", path.display())))?
        } else {
            Tables::new()
        };

        tracing::debug!(path = %path.display(), "opened local store");

        Ok(Self {
            path: Some(path.to_path_buf()),
            tables: Mutex::new(tables),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::new("local store lock poisoned"))
    }

    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::new(format!("failed to create {}: {e}", parent.display())))?;
        }
        let content = serde_json::to_string_pretty(tables)
            .map_err(|e| StoreError::new(format!("failed to serialize store: {e}")))?;
        fs::write(path, content)
            .map_err(|e| StoreError::new(format!("failed to write {}: {e}", path.display())))
    }
}

fn unique_violation(table: &str, column: &str, value: &Value) -> StoreError {
    StoreError::with_code(
        UNIQUE_VIOLATION,
        format!("duplicate key value violates unique constraint \"{table}_{column}_key\" ({value})"),
    )
}

/// Reject `candidate` if it collides with any other row on a unique column.
/// `skip` is the index of the row being replaced, if any.
fn check_unique(
    table: &str,
    rows: &[Row],
    candidate: &Row,
    skip: Option<usize>,
) -> Result<(), StoreError> {
    for (unique_table, column) in UNIQUE_COLUMNS {
        if *unique_table != table {
            continue;
        }
        let Some(value) = candidate.get(*column).filter(|v| !v.is_null()) else {
            continue;
        };
        let clash = rows
            .iter()
            .enumerate()
            .any(|(idx, row)| Some(idx) != skip && row.get(*column) == Some(value));
        if clash {
            return Err(unique_violation(table, column, value));
        }
    }
    Ok(())
}

/// Order two JSON scalars: numbers numerically, strings lexically (ISO dates
/// sort correctly this way). Mismatched or null values are incomparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.as_str().cmp(y.as_str())),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let Some(actual) = row.get(filter.column()) else {
        return false;
    };
    let ordering = compare(actual, filter.value());
    match filter {
        Filter::Eq(..) => ordering == Some(Ordering::Equal),
        Filter::Gte(..) => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Filter::Lt(..) => ordering == Some(Ordering::Less),
        Filter::Lte(..) => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
    }
}

fn matches_all(row: &Row, query: &Query) -> bool {
    query.filters.iter().all(|f| matches(row, f))
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

impl RecordStore for LocalStore {
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| matches_all(r, query)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        Ok(rows)
    }

    fn count(&self, query: &Query) -> Result<u64, StoreError> {
        let tables = self.lock()?;
        let count = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| matches_all(r, query)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    fn insert(&self, table: &str, mut row: Row) -> Result<Row, StoreError> {
        let mut tables = self.lock()?;
        let rows = tables.entry(table.to_string()).or_default();

        row.entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::String(now_timestamp()));

        check_unique(table, rows, &row, None)?;
        rows.push(row.clone());
        self.persist(&tables)?;

        tracing::debug!(table, "inserted row");
        Ok(row)
    }

    fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.lock()?;
        let Some(rows) = tables.get_mut(&query.table) else {
            return Ok(Vec::new());
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_all(r, query))
            .map(|(idx, _)| idx)
            .collect();

        // Staged on a copy so a conflict on any row leaves the table untouched.
        let mut staged = rows.clone();
        let mut updated = Vec::with_capacity(targets.len());
        for idx in targets {
            let mut candidate = staged[idx].clone();
            for (key, value) in &changes {
                candidate.insert(key.clone(), value.clone());
            }
            check_unique(&query.table, &staged, &candidate, Some(idx))?;
            staged[idx] = candidate.clone();
            updated.push(candidate);
        }

        if !updated.is_empty() {
            *rows = staged;
            self.persist(&tables)?;
        }
        Ok(updated)
    }

    fn delete(&self, query: &Query) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if let Some(rows) = tables.get_mut(&query.table) {
            let before = rows.len();
            rows.retain(|r| !matches_all(r, query));
            if rows.len() != before {
                self.persist(&tables)?;
            }
        }
        Ok(())
    }
}
