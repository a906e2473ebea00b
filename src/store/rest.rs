use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use super::{Query, RecordStore, Row, StoreError};
use crate::auth::Session;

/// Error payload returned by PostgREST.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Record store backed by the hosted PostgREST endpoint (`/rest/v1`).
pub struct RestStore {
    agent: Agent,
    base_url: String,
    api_key: String,
    bearer: String,
}

pub(crate) fn build_agent(timeout_secs: u64) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Render a filter value the way PostgREST expects it in a query string.
fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

impl RestStore {
    /// Requests are authorized with the session's access token when one is
    /// given, otherwise with the anonymous key.
    pub fn new(base_url: &str, api_key: &str, session: Option<&Session>, timeout_secs: u64) -> Self {
        let bearer = session
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| api_key.to_string());
        Self {
            agent: build_agent(timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn prepare<B>(&self, request: RequestBuilder<B>, query: &Query) -> RequestBuilder<B> {
        let mut request = request
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.bearer));

        for filter in &query.filters {
            request = request.query(
                filter.column(),
                &format!("{}.{}", filter.operator(), filter_literal(filter.value())),
            );
        }
        if let Some(order) = &query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            request = request.query("order", &format!("{}.{}", order.column, direction));
        }
        request
    }

    fn read_rows(&self, response: Response<Body>) -> Result<Vec<Row>, StoreError> {
        let body = read_body(response)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body)
            .map_err(|e| StoreError::new(format!("unexpected response from backend: {e}")))
    }
}

fn transport(err: ureq::Error) -> StoreError {
    StoreError::new(format!("connection to backend failed: {err}"))
}

/// Read the body, turning non-2xx responses into a [`StoreError`] that keeps
/// the backend's error code.
fn read_body(mut response: Response<Body>) -> Result<String, StoreError> {
    let status = response.status();
    let body = response.body_mut().read_to_string().map_err(transport)?;

    if status.is_success() {
        return Ok(body);
    }

    tracing::warn!(status = status.as_u16(), "backend request failed");
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => {
            let message = parsed
                .message
                .or(parsed.details)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            Err(StoreError {
                code: parsed.code,
                message,
            })
        }
        Err(_) => Err(StoreError::new(format!("HTTP {}: {}", status.as_u16(), body))),
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

impl RecordStore for RestStore {
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table = %query.table, filters = query.filters.len(), "select");
        let request = self
            .prepare(self.agent.get(&self.table_url(&query.table)), query)
            .query("select", "*");
        let response = request.call().map_err(transport)?;
        self.read_rows(response)
    }

    fn count(&self, query: &Query) -> Result<u64, StoreError> {
        tracing::debug!(table = %query.table, "count");
        let request = self
            .prepare(self.agent.head(&self.table_url(&query.table)), query)
            .header("Prefer", "count=exact");
        let response = request.call().map_err(transport)?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        read_body(response)?;

        range
            .as_deref()
            .and_then(parse_content_range)
            .ok_or_else(|| StoreError::new("backend did not return a row count"))
    }

    fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        tracing::debug!(table, "insert");
        let payload = Value::Object(row).to_string();
        let request = self
            .prepare(self.agent.post(&self.table_url(table)), &Query::table(table))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation");
        let response = request.send(payload).map_err(transport)?;

        self.read_rows(response)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::new("backend returned no row for insert"))
    }

    fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table = %query.table, "update");
        let payload = Value::Object(changes).to_string();
        let request = self
            .prepare(self.agent.patch(&self.table_url(&query.table)), query)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation");
        let response = request.send(payload).map_err(transport)?;
        self.read_rows(response)
    }

    fn delete(&self, query: &Query) -> Result<(), StoreError> {
        tracing::debug!(table = %query.table, "delete");
        let request = self.prepare(self.agent.delete(&self.table_url(&query.table)), query);
        let response = request.call().map_err(transport)?;
        read_body(response).map(|_| ())
    }
}
