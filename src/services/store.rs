//! Hosted store client
//!
//! The hosted store is a Postgres database behind a PostgREST gateway
//! (the Supabase REST dialect). Only the table-level calls the console needs
//! are implemented: select, insert, upsert, update, delete and count.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::StoreConfig;
use crate::utils::errors::{GateError, Result, StoreError, StoreResult};
use crate::utils::logging::log_store_operation;

/// Query string builder for PostgREST requests
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// `column = value`
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.params.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params.push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn has_filter(&self) -> bool {
        self.params
            .iter()
            .any(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit" | "on_conflict"))
    }
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct RejectionBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// REST client for the hosted store
#[derive(Clone, Debug)]
pub struct StoreClient {
    client: Client,
    rest_url: String,
    api_key: String,
}

impl StoreClient {
    /// Create a new StoreClient instance
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("GateConsole/1.0")
            .build()
            .map_err(GateError::Http)?;

        let base = config.url.trim_end_matches('/');
        let rest_url = if base.ends_with("/rest/v1") {
            base.to_string()
        } else {
            format!("{}/rest/v1", base)
        };
        url::Url::parse(&rest_url)?;

        Ok(Self {
            client,
            rest_url,
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str, query: &Query) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .query(query.params())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, operation: &str, table: &str, request: RequestBuilder) -> StoreResult<Response> {
        let started = Instant::now();
        let result = request.send().await;
        let elapsed = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log_store_operation(operation, table, elapsed, false);
                return Err(StoreError::from_transport(&e));
            }
        };

        if response.status().is_success() {
            log_store_operation(operation, table, elapsed, true);
            Ok(response)
        } else {
            log_store_operation(operation, table, elapsed, false);
            Err(rejection(response).await)
        }
    }

    async fn json_rows(response: Response) -> StoreResult<Vec<Value>> {
        let text = response.text().await.map_err(|e| StoreError::from_transport(&e))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(StoreError::InvalidResponse(e.to_string())),
        }
    }

    /// `SELECT` rows matching the query
    pub async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        debug!(table = table, params = ?query.params(), "Store select");
        let request = self.request(Method::GET, table, query);
        let response = self.send("select", table, request).await?;
        Self::json_rows(response).await
    }

    /// Exactly one row, or `None` when nothing matches
    pub async fn select_single(&self, table: &str, query: &Query) -> StoreResult<Option<Value>> {
        let request = self
            .request(Method::GET, table, query)
            .header(reqwest::header::ACCEPT, "application/vnd.pgrst.object+json");

        match self.send("select_single", table, request).await {
            Ok(response) => Ok(Self::json_rows(response).await?.into_iter().next()),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Row count of a table; doubles as the connectivity probe
    pub async fn count(&self, table: &str) -> StoreResult<u64> {
        let rows = self.select(table, &Query::new().select("count")).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    /// Insert one row and return it as stored
    pub async fn insert<T: Serialize + ?Sized>(&self, table: &str, row: &T) -> StoreResult<Value> {
        let request = self
            .request(Method::POST, table, &Query::new())
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.send("insert", table, request).await?;
        Self::json_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("insert returned no row".to_string()))
    }

    /// Insert-or-update keyed by the `on_conflict` columns
    pub async fn upsert<T: Serialize>(&self, table: &str, rows: &[T], on_conflict: &str) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let query = Query {
            params: vec![("on_conflict".to_string(), on_conflict.to_string())],
        };
        let request = self
            .request(Method::POST, table, &query)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);
        self.send("upsert", table, request).await?;
        Ok(())
    }

    /// Patch the rows matching `filter` and return them
    pub async fn update<T: Serialize + ?Sized>(&self, table: &str, filter: &Query, patch: &T) -> StoreResult<Vec<Value>> {
        guard_filter(filter)?;
        let request = self
            .request(Method::PATCH, table, filter)
            .header("Prefer", "return=representation")
            .json(patch);
        let response = self.send("update", table, request).await?;
        Self::json_rows(response).await
    }

    pub async fn delete(&self, table: &str, filter: &Query) -> StoreResult<()> {
        guard_filter(filter)?;
        let request = self.request(Method::DELETE, table, filter);
        self.send("delete", table, request).await?;
        Ok(())
    }
}

/// Unfiltered updates and deletes would touch the whole table
fn guard_filter(filter: &Query) -> StoreResult<()> {
    if filter.has_filter() {
        Ok(())
    } else {
        Err(StoreError::InvalidResponse("refusing to modify rows without a filter".to_string()))
    }
}

async fn rejection(response: Response) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<RejectionBody>(&text) {
        Ok(body) => StoreError::Rejected {
            code: body.code,
            message: body.message.unwrap_or_else(|| format!("HTTP {}", status)),
            details: body.details,
            hint: body.hint,
            status: status.as_u16(),
        },
        Err(_) => StoreError::Rejected {
            code: None,
            message: format!("HTTP {}: {}", status, text),
            details: None,
            hint: None,
            status: status.as_u16(),
        },
    }
}
