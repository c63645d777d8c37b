//! Attendance log reader
//!
//! Reads recent gate events from the device API or from the hosted store.
//! The hosted rows only carry a student identifier, so names are joined in
//! from the students table by id or roll number.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use super::device::DeviceClient;
use super::store::{Query, StoreClient};
use crate::config::{DataSource, StoreConfig};
use crate::models::attendance::attendance_from_payload;
use crate::models::payload::{id_field, str_field};
use crate::models::AttendanceRecord;
use crate::utils::errors::{GateError, Result};

/// Rows fetched from the hosted log
pub const RECENT_LIMIT: usize = 20;

#[derive(Clone)]
enum Backend {
    Local(DeviceClient),
    Hosted {
        store: StoreClient,
        attendance_table: String,
        students_table: String,
    },
}

#[derive(Clone)]
pub struct AttendanceService {
    backend: Backend,
}

impl AttendanceService {
    pub fn local(device: DeviceClient) -> Self {
        Self { backend: Backend::Local(device) }
    }

    pub fn hosted(store: StoreClient, config: &StoreConfig) -> Self {
        Self {
            backend: Backend::Hosted {
                store,
                attendance_table: config.attendance_table.clone(),
                students_table: config.students_table.clone(),
            },
        }
    }

    /// Pick the backend named by the data source setting
    pub fn for_source(source: DataSource, device: DeviceClient, store: Option<StoreClient>, config: &StoreConfig) -> Result<Self> {
        match (source, store) {
            (DataSource::Local, _) => Ok(Self::local(device)),
            (DataSource::Hosted, Some(store)) => Ok(Self::hosted(store, config)),
            (DataSource::Hosted, None) => Err(GateError::Config(
                "Attendance is read from the hosted store but no store is configured".to_string(),
            )),
        }
    }

    pub fn source(&self) -> DataSource {
        match self.backend {
            Backend::Local(_) => DataSource::Local,
            Backend::Hosted { .. } => DataSource::Hosted,
        }
    }

    /// Most recent attendance events, newest first
    pub async fn recent(&self) -> Result<Vec<AttendanceRecord>> {
        match &self.backend {
            Backend::Local(device) => {
                let payload = device.attendance().await?;
                Ok(attendance_from_payload(&payload))
            }
            Backend::Hosted { store, attendance_table, students_table } => {
                let rows = store
                    .select(
                        attendance_table,
                        &Query::new()
                            .select("id,student_id,status,timestamp,verification_method")
                            .order("timestamp", false)
                            .limit(RECENT_LIMIT),
                    )
                    .await?;

                let students = store
                    .select(students_table, &Query::new().select("id,name,rollno"))
                    .await?;
                let names = name_index(&students);
                debug!(rows = rows.len(), students = names.len(), "Fetched hosted attendance");

                Ok(rows.iter().map(|row| hosted_record(row, &names)).collect())
            }
        }
    }
}

/// Student name by both id and roll number
fn name_index(students: &[Value]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for student in students {
        let name = str_field(student, "name", "Unknown");
        let id = id_field(student, "id", "");
        if !id.is_empty() {
            names.insert(id, name.clone());
        }
        let rollno = str_field(student, "rollno", "");
        if !rollno.is_empty() {
            names.insert(rollno, name);
        }
    }
    names
}

fn hosted_record(row: &Value, names: &HashMap<String, String>) -> AttendanceRecord {
    let student_id = id_field(row, "student_id", "N/A");
    let raw_timestamp = str_field(row, "timestamp", "");
    let (date, time) = split_timestamp(&raw_timestamp);
    let method = match str_field(row, "verification_method", "") {
        m if m.is_empty() => "face".to_string(),
        m => m.to_lowercase(),
    };

    AttendanceRecord {
        id: id_field(row, "id", &format!("{}-{}", student_id, raw_timestamp)),
        student_name: names.get(&student_id).cloned().unwrap_or_else(|| "Unknown".to_string()),
        student_id,
        date,
        timestamp: time,
        status: str_field(row, "status", "absent").to_lowercase(),
        verification_method: method,
    }
}

/// Split a stored timestamp into `YYYY-MM-DD` and `HH:MM:SS`
pub fn split_timestamp(raw: &str) -> (String, String) {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return (ts.format("%Y-%m-%d").to_string(), ts.format("%H:%M:%S").to_string());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return (ts.format("%Y-%m-%d").to_string(), ts.format("%H:%M:%S").to_string());
        }
    }
    (String::new(), String::new())
}
