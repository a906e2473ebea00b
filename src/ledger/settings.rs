use serde_json::json;

use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::model::{SettingsChanges, UserSettings};
use crate::store::{from_row, tables, to_row, Query, RecordStore, Row, StoreError};

use super::single;

fn settings_query(session: &Session) -> Query {
    Query::table(tables::SETTINGS).eq("user_id", session.user_id.as_str())
}

/// Settings for the signed-in user, creating the row on first use.
pub fn load_settings(store: &dyn RecordStore, session: &Session) -> Result<UserSettings> {
    let rows = store.select(&settings_query(session))?;
    if let Some(row) = rows.into_iter().next() {
        return from_row(row);
    }

    let mut row = Row::new();
    row.insert("user_id".to_string(), json!(session.user_id));
    row.insert("reminder_enabled".to_string(), json!(true));
    row.insert("email_reports_enabled".to_string(), json!(false));

    tracing::debug!(user_id = %session.user_id, "creating default settings");
    from_row(store.insert(tables::SETTINGS, row)?)
}

pub fn update_settings(
    store: &dyn RecordStore,
    session: &Session,
    changes: &SettingsChanges,
) -> Result<UserSettings> {
    // Make sure the row exists before patching it.
    load_settings(store, session)?;

    let mut row = to_row(changes)?;
    row.insert(
        "updated_at".to_string(),
        json!(chrono::Utc::now().to_rfc3339()),
    );

    let rows = store.update(&settings_query(session), row)?;
    single(
        rows,
        AppError::Store(StoreError::new("settings row disappeared during update")),
    )
}
