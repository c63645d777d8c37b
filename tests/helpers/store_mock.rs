//! Mock hosted store server for testing
//!
//! Simulates the PostgREST endpoints under `/rest/v1`.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_API_KEY: &str = "test-anon-key";

/// Mock hosted store server
pub struct StoreMockServer {
    pub server: MockServer,
}

impl StoreMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Project URL, as configured in `store.url`
    pub fn url(&self) -> String {
        self.server.uri()
    }

    fn table_path(table: &str) -> String {
        format!("/rest/v1/{}", table)
    }

    /// Connectivity probe `select=count` succeeds
    pub async fn mock_count_ok(&self, table: &str, count: u64) {
        Mock::given(method("GET"))
            .and(path(Self::table_path(table)))
            .and(query_param("select", "count"))
            .and(header("apikey", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "count": count }])))
            .mount(&self.server)
            .await;
    }

    /// Connectivity probe is rejected with a PostgREST error body
    pub async fn mock_count_rejected(&self, table: &str, status: u16, code: &str, message: &str) {
        Mock::given(method("GET"))
            .and(path(Self::table_path(table)))
            .and(query_param("select", "count"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "code": code,
                "message": message,
                "details": null,
                "hint": null
            })))
            .mount(&self.server)
            .await;
    }

    /// Upsert endpoint; `expected` calls are verified when the server drops
    pub async fn mock_upsert(&self, table: &str, on_conflict: &str, status: u16, expected: u64) {
        let template = if status < 300 {
            ResponseTemplate::new(status)
        } else {
            ResponseTemplate::new(status).set_body_json(json!({
                "code": "42501",
                "message": "permission denied for table",
                "details": null,
                "hint": null
            }))
        };

        Mock::given(method("POST"))
            .and(path(Self::table_path(table)))
            .and(query_param("on_conflict", on_conflict))
            .respond_with(template)
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    /// Any POST to the table must not happen
    pub async fn forbid_writes(&self, table: &str) {
        Mock::given(method("POST"))
            .and(path(Self::table_path(table)))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Plain select returning `rows`
    pub async fn mock_select(&self, table: &str, select: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path(Self::table_path(table)))
            .and(query_param("select", select))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// Single-row lookup by roll number, answering PGRST116 when absent
    pub async fn mock_rollno_lookup(&self, table: &str, rollno: &str, found: bool) {
        let response = if found {
            ResponseTemplate::new(200).set_body_json(json!({ "rollno": rollno }))
        } else {
            ResponseTemplate::new(406).set_body_json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned",
                "details": "The result contains 0 rows",
                "hint": null
            }))
        };

        Mock::given(method("GET"))
            .and(path(Self::table_path(table)))
            .and(query_param("rollno", format!("eq.{}", rollno)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Insert answering with `status` and `body`
    pub async fn mock_insert(&self, table: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(Self::table_path(table)))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Number of `select=count` connection checks received for `table`
    pub async fn count_queries(&self, table: &str) -> usize {
        let table_path = Self::table_path(table);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == "GET" && r.url.path() == table_path)
            .filter(|r| r.url.query_pairs().any(|(k, v)| k == "select" && v == "count"))
            .count()
    }

    /// Bodies of all requests received so far that match `verb` and `table`
    pub async fn request_bodies(&self, verb: &str, table: &str) -> Vec<Value> {
        let table_path = Self::table_path(table);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == table_path)
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}
