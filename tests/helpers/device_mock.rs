//! Mock device API server for testing
//!
//! This module provides a mock HTTP server that simulates the gate
//! controller's REST API. It uses wiremock to create configurable responses.

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::test_data::*;

/// Mock device API server
pub struct DeviceMockServer {
    pub server: MockServer,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockResponseConfig {
    pub status: u16,
    pub delay_ms: Option<u64>,
    pub body: Option<Value>,
}

impl Default for MockResponseConfig {
    fn default() -> Self {
        Self {
            status: 200,
            delay_ms: None,
            body: None,
        }
    }
}

impl MockResponseConfig {
    pub fn ok(body: Value) -> Self {
        Self {
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            delay_ms: None,
            body: Some(body),
        }
    }

    fn template(&self) -> ResponseTemplate {
        let mut response = ResponseTemplate::new(self.status);
        if let Some(body) = &self.body {
            response = response.set_body_json(body.clone());
        }
        if let Some(delay) = self.delay_ms {
            response = response.set_delay(std::time::Duration::from_millis(delay));
        }
        response
    }
}

impl DeviceMockServer {
    /// Create a new mock device API server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    async fn mount(&self, verb: &str, endpoint: &str, config: MockResponseConfig) {
        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(config.template())
            .mount(&self.server)
            .await;
    }

    /// Setup mock for `GET /api/students`
    pub async fn mock_students(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/students", config).await;
    }

    /// Setup mock for `POST /api/students`
    pub async fn mock_create_student(&self, config: MockResponseConfig) {
        self.mount("POST", "/api/students", config).await;
    }

    /// Setup mock for `PUT /api/students/{id}`
    pub async fn mock_update_student(&self, id: &str, config: MockResponseConfig) {
        self.mount("PUT", &format!("/api/students/{}", id), config).await;
    }

    /// Setup mock for `DELETE /api/students/{id}`
    pub async fn mock_delete_student(&self, id: &str, config: MockResponseConfig) {
        self.mount("DELETE", &format!("/api/students/{}", id), config).await;
    }

    pub async fn mock_attendance(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/attendance", config).await;
    }

    pub async fn mock_stats(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/stats", config).await;
    }

    pub async fn mock_door_status(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/door-status", config).await;
    }

    pub async fn mock_recognition_status(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/recognition-status", config).await;
    }

    pub async fn mock_camera_snapshot(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/camera-snapshot", config).await;
    }

    pub async fn mock_health(&self, config: MockResponseConfig) {
        self.mount("GET", "/api/health", config).await;
    }

    /// Setup a healthy gate with the sample roster and attendance log
    pub async fn setup_default_mocks(&self) {
        self.mock_students(MockResponseConfig::ok(sample_students())).await;
        self.mock_attendance(MockResponseConfig::ok(sample_attendance())).await;
        self.mock_stats(MockResponseConfig::ok(sample_stats())).await;
        self.mock_door_status(MockResponseConfig::ok(sample_door_status("closed"))).await;
        self.mock_recognition_status(MockResponseConfig::ok(sample_recognition())).await;
        self.mock_health(MockResponseConfig::ok(serde_json::json!({ "status": "ok" }))).await;
    }

    /// Reset all mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
