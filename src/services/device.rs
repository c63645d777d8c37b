//! Device API client
//!
//! Typed access to the HTTP API served by the gate controller: roster CRUD,
//! the attendance log, and the live door, camera and recognition state.

use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DeviceConfig;
use crate::models::{
    CameraSnapshot, CreateStudentRequest, DeviceHealth, DoorStatus, GateStats, RecognitionStatus,
    UpdateStudentRequest,
};
use crate::utils::errors::{ApiError, ApiResult, GateError, Result};
use crate::utils::helpers::{retry_with_backoff, Backoff};
use crate::utils::logging::log_api_error;

/// Paths served by the gate controller
pub mod endpoints {
    pub const CAMERA_SNAPSHOT: &str = "/api/camera-snapshot";
    pub const CAMERA_FEED: &str = "/api/camera-feed";
    pub const DOOR_STATUS: &str = "/api/door-status";
    pub const RECOGNITION_STATUS: &str = "/api/recognition-status";
    pub const ATTENDANCE: &str = "/api/attendance";
    pub const STATS: &str = "/api/stats";
    pub const STUDENTS: &str = "/api/students";
    pub const HEALTH: &str = "/api/health";
}

/// HTTP client for the local device API
#[derive(Clone, Debug)]
pub struct DeviceClient {
    client: Client,
    base_url: String,
    check_timeout: Duration,
}

impl DeviceClient {
    /// Create a new DeviceClient instance
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent("GateConsole/1.0")
            .build()
            .map_err(GateError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            check_timeout: config.connection_check_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// URL of the MJPEG stream, for renderers that embed it directly
    pub fn camera_feed_url(&self) -> String {
        self.url(endpoints::CAMERA_FEED)
    }

    /// Send a JSON request and decode the JSON answer
    ///
    /// Empty bodies (e.g. a 204 on delete) decode to `Value::Null`.
    pub async fn fetch_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResult<Value> {
        let url = self.url(endpoint);
        debug!(method = %method, url = %url, "Device API request");

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            log_api_error("device", &format!("HTTP {}", status), Some(&url));
            return Err(ApiError::http(status));
        }

        let bytes = response.bytes().await.map_err(|e| ApiError::from_transport(&e))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(ApiError::unexpected)
    }

    pub async fn get_json(&self, endpoint: &str) -> ApiResult<Value> {
        self.fetch_json::<()>(Method::GET, endpoint, None).await
    }

    /// GET with exponential backoff on failure
    pub async fn retry_fetch(&self, endpoint: &str, policy: Backoff) -> ApiResult<Value> {
        retry_with_backoff(policy, || self.get_json(endpoint)).await
    }

    /// GET returning the raw response, so callers can inspect error bodies
    pub async fn get_response(&self, endpoint: &str, timeout: Duration) -> std::result::Result<Response, reqwest::Error> {
        self.client
            .get(self.url(endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .send()
            .await
    }

    /// True when the device answers the stats endpoint in time
    pub async fn check_connection(&self) -> bool {
        let result = self
            .client
            .get(self.url(endpoints::STATS))
            .timeout(self.check_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "API connection check failed");
                false
            }
        }
    }

    /// Raw roster payload; validation happens in the roster layer
    pub async fn list_students(&self) -> ApiResult<Value> {
        self.get_json(endpoints::STUDENTS).await
    }

    pub async fn create_student(&self, request: &CreateStudentRequest) -> ApiResult<Value> {
        self.fetch_json(Method::POST, endpoints::STUDENTS, Some(request)).await
    }

    pub async fn update_student(&self, id: &str, request: &UpdateStudentRequest) -> ApiResult<Value> {
        let endpoint = student_endpoint(id);
        self.fetch_json(Method::PUT, &endpoint, Some(request)).await
    }

    pub async fn delete_student(&self, id: &str) -> ApiResult<()> {
        let endpoint = student_endpoint(id);
        self.fetch_json::<()>(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }

    pub async fn attendance(&self) -> ApiResult<Value> {
        self.get_json(endpoints::ATTENDANCE).await
    }

    pub async fn stats(&self) -> ApiResult<GateStats> {
        let payload = self.get_json(endpoints::STATS).await?;
        Ok(GateStats::from_payload(&payload))
    }

    pub async fn door_status(&self) -> ApiResult<DoorStatus> {
        let payload = self.get_json(endpoints::DOOR_STATUS).await?;
        Ok(DoorStatus::from_payload(&payload))
    }

    pub async fn recognition_status(&self) -> ApiResult<RecognitionStatus> {
        let payload = self.get_json(endpoints::RECOGNITION_STATUS).await?;
        Ok(RecognitionStatus::from_payload(&payload))
    }

    pub async fn camera_snapshot(&self) -> ApiResult<CameraSnapshot> {
        let payload = self.get_json(endpoints::CAMERA_SNAPSHOT).await?;
        CameraSnapshot::from_payload(&payload)
            .ok_or_else(|| ApiError::unexpected("camera snapshot is not an image data URL"))
    }

    /// Health report, retried while the controller is still booting
    pub async fn health(&self, policy: Backoff) -> ApiResult<DeviceHealth> {
        let payload = self.retry_fetch(endpoints::HEALTH, policy).await?;
        Ok(DeviceHealth::from_payload(&payload))
    }
}

fn student_endpoint(id: &str) -> String {
    format!("{}/{}", endpoints::STUDENTS, urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn client(base: &str) -> DeviceClient {
        let mut config = Settings::default().device;
        config.base_url = Some(base.to_string());
        DeviceClient::new(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let c = client("http://10.31.3.211:5000/");
        assert_eq!(c.url(endpoints::STATS), "http://10.31.3.211:5000/api/stats");
        assert_eq!(c.camera_feed_url(), "http://10.31.3.211:5000/api/camera-feed");
        assert_eq!(student_endpoint("24 110"), "/api/students/24%20110");
    }

    #[tokio::test]
    async fn test_unreachable_device_is_network_error() {
        // Port 9 (discard) is closed on test machines
        let c = client("http://127.0.0.1:9");
        let err = c.get_json(endpoints::HEALTH).await.unwrap_err();
        assert_eq!(err.status, 0);
        assert!(!c.check_connection().await);
    }
}
