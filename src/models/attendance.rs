//! Attendance model

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::{array_of, id_field, str_field, str_field_any};
use crate::utils::helpers::contains_ignore_case;

/// One gate event as the device API reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub timestamp: String,
    /// Lowercased outcome; see [`AttendanceStatus`]
    pub status: String,
    pub verification_method: String,
}

impl AttendanceRecord {
    pub fn from_payload(value: &Value) -> Self {
        let student_id = str_field_any(value, &["studentId", "student_id"], "N/A");
        let date = str_field(value, "date", "");
        let timestamp = str_field(value, "timestamp", "");
        let id = match id_field(value, "id", "") {
            id if id.is_empty() => format!("{}-{}T{}", student_id, date, timestamp),
            id => id,
        };

        Self {
            id,
            student_id,
            student_name: str_field_any(value, &["studentName", "student_name"], "Unknown"),
            date,
            timestamp,
            status: str_field(value, "status", "absent").to_lowercase(),
            verification_method: str_field_any(value, &["verificationMethod", "verification_method"], "none")
                .to_lowercase(),
        }
    }

    pub fn status_kind(&self) -> Option<AttendanceStatus> {
        AttendanceStatus::parse(&self.status)
    }

    pub fn method_kind(&self) -> Option<VerificationMethod> {
        VerificationMethod::parse(&self.verification_method)
    }
}

/// Parse an attendance payload; anything other than an array is an empty log
pub fn attendance_from_payload(payload: &Value) -> Vec<AttendanceRecord> {
    array_of(payload, AttendanceRecord::from_payload)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Unauthorized,
    Failed,
    /// No record for the day
    Absent,
    /// Someone else's credential was presented
    Proxy,
}

impl AttendanceStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "present" => Some(Self::Present),
            "unauthorized" => Some(Self::Unauthorized),
            "failed" => Some(Self::Failed),
            "absent" => Some(Self::Absent),
            "proxy" => Some(Self::Proxy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Unauthorized => "unauthorized",
            Self::Failed => "failed",
            Self::Absent => "absent",
            Self::Proxy => "proxy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationMethod {
    #[serde(rename = "face")]
    Face,
    #[serde(rename = "barcode")]
    Barcode,
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "partially verified")]
    PartiallyVerified,
}

impl VerificationMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "face" => Some(Self::Face),
            "barcode" => Some(Self::Barcode),
            "manual" => Some(Self::Manual),
            "none" => Some(Self::None),
            "partially verified" => Some(Self::PartiallyVerified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Barcode => "barcode",
            Self::Manual => "manual",
            Self::None => "none",
            Self::PartiallyVerified => "partially verified",
        }
    }
}

/// Rows shown per page of the attendance table
pub const PAGE_SIZE: usize = 10;

/// Search box plus status and method checkboxes of the attendance table
#[derive(Debug, Clone)]
pub struct AttendanceFilter {
    pub search: String,
    pub statuses: HashSet<AttendanceStatus>,
    pub methods: HashSet<VerificationMethod>,
}

impl Default for AttendanceFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            statuses: [AttendanceStatus::Present, AttendanceStatus::Unauthorized, AttendanceStatus::Failed]
                .into_iter()
                .collect(),
            methods: [VerificationMethod::Face, VerificationMethod::Barcode, VerificationMethod::Manual]
                .into_iter()
                .collect(),
        }
    }
}

impl AttendanceFilter {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn toggle_status(&mut self, status: AttendanceStatus, enabled: bool) {
        if enabled {
            self.statuses.insert(status);
        } else {
            self.statuses.remove(&status);
        }
    }

    pub fn toggle_method(&mut self, method: VerificationMethod, enabled: bool) {
        if enabled {
            self.methods.insert(method);
        } else {
            self.methods.remove(&method);
        }
    }

    /// Records with an unrecognised status or method never match a checkbox
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        let matches_search = contains_ignore_case(&record.student_name, &self.search)
            || contains_ignore_case(&record.student_id, &self.search);
        let matches_status = record.status_kind().is_some_and(|s| self.statuses.contains(&s));
        let matches_method = record.method_kind().is_some_and(|m| self.methods.contains(&m));

        matches_search && matches_status && matches_method
    }

    /// First `PAGE_SIZE` matches, and whether more exist
    pub fn page<'a>(&self, records: &'a [AttendanceRecord]) -> AttendancePage<'a> {
        let matching: Vec<&AttendanceRecord> = records.iter().filter(|r| self.matches(r)).collect();
        let total = matching.len();
        AttendancePage {
            rows: matching.into_iter().take(PAGE_SIZE).collect(),
            total,
        }
    }
}

#[derive(Debug)]
pub struct AttendancePage<'a> {
    pub rows: Vec<&'a AttendanceRecord>,
    pub total: usize,
}

impl AttendancePage<'_> {
    pub fn has_more(&self) -> bool {
        self.total > self.rows.len()
    }
}
