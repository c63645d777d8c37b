//! Live device state reported by the gate

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::{opt_str_field, str_field, u64_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
    /// Unauthorized access or a student failed to walk through
    Alert,
}

impl DoorState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "closed" => Some(Self::Closed),
            "opening" => Some(Self::Opening),
            "open" => Some(Self::Open),
            "closing" => Some(Self::Closing),
            "alert" => Some(Self::Alert),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Closed => "Closed",
            Self::Opening => "Opening",
            Self::Open => "Open",
            Self::Closing => "Closing",
            Self::Alert => "Alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStatus {
    pub status: DoorState,
    pub last_opened: Option<String>,
    /// Seconds until the door closes on its own
    pub auto_close_timer: u64,
}

impl DoorStatus {
    pub fn from_payload(value: &Value) -> Self {
        Self {
            status: DoorState::parse(&str_field(value, "status", "closed")).unwrap_or_default(),
            last_opened: opt_str_field(value, "lastOpened"),
            auto_close_timer: u64_field(value, "autoCloseTimer", 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraState {
    Online,
    #[default]
    Offline,
    Processing,
}

impl CameraState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Processing => "Processing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionStatus {
    pub recognized_face: Option<String>,
    pub last_activity: Option<String>,
    pub status: CameraState,
}

impl RecognitionStatus {
    pub fn from_payload(value: &Value) -> Self {
        let status = match str_field(value, "status", "offline").as_str() {
            "online" => CameraState::Online,
            "processing" => CameraState::Processing,
            _ => CameraState::Offline,
        };

        Self {
            recognized_face: opt_str_field(value, "recognizedFace"),
            last_activity: opt_str_field(value, "lastActivity"),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    /// `data:image/jpeg;base64,...`
    pub image: String,
    pub timestamp: String,
}

impl CameraSnapshot {
    pub fn from_payload(value: &Value) -> Option<Self> {
        let image = opt_str_field(value, "image")?;
        if !image.starts_with("data:image/") {
            return None;
        }
        Some(Self {
            image,
            timestamp: str_field(value, "timestamp", ""),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStats {
    pub total_students: u64,
    pub todays_entries: u64,
    pub this_week: u64,
}

impl GateStats {
    pub fn from_payload(value: &Value) -> Self {
        Self {
            total_students: u64_field(value, "totalStudents", 0),
            todays_entries: u64_field(value, "todaysEntries", 0),
            this_week: u64_field(value, "thisWeek", 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceHealth {
    pub status: String,
    /// Whatever else the device reports (database, camera, gpio...)
    pub details: Value,
}

impl DeviceHealth {
    pub fn from_payload(value: &Value) -> Self {
        Self {
            status: str_field(value, "status", "unknown"),
            details: value.clone(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy" | "online")
    }
}

/// Error body the device API returns alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceErrorBody {
    #[serde(default)]
    pub error: bool,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}
