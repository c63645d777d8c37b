//! Device-to-hosted-store synchronization
//!
//! Copies the roster and the attendance log from the gate controller into the
//! hosted store with upsert semantics. Every step can fail on its own and the
//! run stops at the first failure with a classified error; there is no
//! rollback of steps that already succeeded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::device::{endpoints, DeviceClient};
use super::notification::NotificationService;
use super::store::StoreClient;
use crate::config::{StoreConfig, SyncConfig};
use crate::models::payload::{str_field, str_field_any};
use crate::models::device::DeviceErrorBody;
use crate::models::VerificationMethod;
use crate::utils::errors::StoreError;
use crate::utils::helpers::truncate_text;
use crate::utils::logging::log_sync_result;

/// Which step of a run failed, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    /// Store answered the probe with an error
    SupabaseConnection,
    /// Store could not be reached for the probe
    SupabaseException,
    ApiStudentsSync,
    SupabaseStudentsSync,
    ApiAttendanceSync,
    SupabaseAttendanceSync,
    /// Device API could not be reached
    NetworkError,
    UnknownError,
}

impl SyncErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupabaseConnection => "supabase_connection",
            Self::SupabaseException => "supabase_exception",
            Self::ApiStudentsSync => "api_students_sync",
            Self::SupabaseStudentsSync => "supabase_students_sync",
            Self::ApiAttendanceSync => "api_attendance_sync",
            Self::SupabaseAttendanceSync => "supabase_attendance_sync",
            Self::NetworkError => "network_error",
            Self::UnknownError => "unknown_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncFailure {
    #[serde(rename = "type")]
    pub kind: SyncErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub details: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCounts {
    pub students_count: usize,
    pub attendance_count: usize,
}

/// Outcome of one synchronization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SyncCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SyncFailure>,
    pub timestamp: DateTime<Utc>,
}

impl SyncReport {
    fn succeeded(counts: SyncCounts) -> Self {
        Self {
            success: true,
            data: Some(counts),
            error: None,
            timestamp: Utc::now(),
        }
    }

    fn failed(failure: SyncFailure) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(failure),
            timestamp: Utc::now(),
        }
    }

    pub fn error_kind(&self) -> Option<SyncErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Row written to the hosted `students` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentUpsert {
    pub name: String,
    pub rollno: String,
    pub course: String,
    pub dob: String,
    pub email: String,
}

impl StudentUpsert {
    /// Map a device roster entry, filling the columns the store requires.
    ///
    /// Entries without a roll number have no conflict key and are skipped.
    pub fn from_device(value: &Value) -> Option<Self> {
        let rollno = str_field_any(value, &["studentId", "rollno"], "");
        if rollno.trim().is_empty() {
            warn!(name = %str_field(value, "name", ""), "Skipping student without a roll number");
            return None;
        }

        let email = str_field_any(value, &["email"], "");
        Some(Self {
            name: str_field(value, "name", ""),
            course: str_field_any(value, &["course"], "N/A"),
            dob: str_field_any(value, &["dob"], "2000-01-01"),
            email: if email.is_empty() { format!("{}@example.com", rollno) } else { email },
            rollno,
        })
    }
}

/// Row written to the hosted attendance table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceUpsert {
    pub student_id: String,
    pub date: String,
    pub timestamp: String,
    pub status: String,
    pub verification_method: String,
}

impl AttendanceUpsert {
    /// Map a device attendance entry; proxy entries count as partially verified
    pub fn from_device(value: &Value) -> Self {
        let date = str_field(value, "date", "");
        let time = str_field(value, "timestamp", "");
        let status = str_field(value, "status", "").to_lowercase();
        let verification_method = if status == "proxy" {
            VerificationMethod::PartiallyVerified.as_str().to_string()
        } else {
            str_field_any(value, &["verificationMethod"], VerificationMethod::None.as_str())
        };

        Self {
            student_id: str_field_any(value, &["studentId"], ""),
            timestamp: format!("{}T{}", date, time),
            date,
            status,
            verification_method,
        }
    }
}

/// Conflict keys of the upserts
pub const STUDENTS_CONFLICT: &str = "rollno";
pub const ATTENDANCE_CONFLICT: &str = "student_id,timestamp";

/// Synchronizes the device API into the hosted store
#[derive(Clone)]
pub struct SyncService {
    device: DeviceClient,
    store: StoreClient,
    students_table: String,
    attendance_table: String,
    request_timeout: Duration,
    notifier: NotificationService,
    running: Arc<Mutex<()>>,
    last_report: Arc<RwLock<Option<SyncReport>>>,
}

impl SyncService {
    /// Create a new SyncService instance
    pub fn new(
        device: DeviceClient,
        store: StoreClient,
        store_config: &StoreConfig,
        sync_config: &SyncConfig,
        notifier: NotificationService,
    ) -> Self {
        Self {
            device,
            store,
            students_table: store_config.students_table.clone(),
            attendance_table: store_config.attendance_table.clone(),
            request_timeout: Duration::from_secs(sync_config.request_timeout_seconds),
            notifier,
            running: Arc::new(Mutex::new(())),
            last_report: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn last_report(&self) -> Option<SyncReport> {
        self.last_report.read().await.clone()
    }

    /// Run one synchronization; a run started while another is active waits for it
    pub async fn sync_once(&self) -> SyncReport {
        let guard = self.running.lock().await;
        self.run_locked(guard).await
    }

    async fn run_locked(&self, _guard: MutexGuard<'_, ()>) -> SyncReport {
        let started = Instant::now();

        let report = match self.run_steps().await {
            Ok(counts) => SyncReport::succeeded(counts),
            Err(failure) => {
                error!(kind = failure.kind.as_str(), message = %failure.message, status = ?failure.status, "Data sync failed");
                SyncReport::failed(failure)
            }
        };

        let counts = report.data.unwrap_or(SyncCounts { students_count: 0, attendance_count: 0 });
        log_sync_result(
            report.success,
            report.error_kind().map(|k| k.as_str()),
            counts.students_count,
            counts.attendance_count,
            started.elapsed().as_millis() as u64,
        );

        *self.last_report.write().await = Some(report.clone());
        report
    }

    async fn run_steps(&self) -> Result<SyncCounts, SyncFailure> {
        info!("Testing Supabase connection...");
        self.check_store().await?;

        info!("Syncing students data...");
        let students = self
            .fetch_device_array(endpoints::STUDENTS, SyncErrorKind::ApiStudentsSync, "Students")
            .await?;
        let student_rows: Vec<StudentUpsert> = students.iter().filter_map(StudentUpsert::from_device).collect();
        self.store
            .upsert(&self.students_table, &student_rows, STUDENTS_CONFLICT)
            .await
            .map_err(|e| store_failure(SyncErrorKind::SupabaseStudentsSync, "Supabase students sync failed", &e))?;
        info!(count = student_rows.len(), "Students sync completed successfully");

        info!("Syncing attendance data...");
        let attendance = self
            .fetch_device_array(endpoints::ATTENDANCE, SyncErrorKind::ApiAttendanceSync, "Attendance")
            .await?;
        let attendance_rows: Vec<AttendanceUpsert> = attendance.iter().map(AttendanceUpsert::from_device).collect();
        self.store
            .upsert(&self.attendance_table, &attendance_rows, ATTENDANCE_CONFLICT)
            .await
            .map_err(|e| store_failure(SyncErrorKind::SupabaseAttendanceSync, "Supabase attendance sync failed", &e))?;
        info!(count = attendance_rows.len(), "Attendance sync completed successfully");

        Ok(SyncCounts {
            students_count: student_rows.len(),
            attendance_count: attendance_rows.len(),
        })
    }

    async fn check_store(&self) -> Result<(), SyncFailure> {
        match self.store.count(&self.students_table).await {
            Ok(_) => {
                info!("Supabase connection successful");
                Ok(())
            }
            Err(e) if e.is_transport() => Err(store_failure(
                SyncErrorKind::SupabaseException,
                "Supabase connection exception",
                &e,
            )),
            Err(e) => Err(store_failure(SyncErrorKind::SupabaseConnection, "Supabase connection failed", &e)),
        }
    }

    async fn fetch_device_array(&self, endpoint: &str, kind: SyncErrorKind, label: &str) -> Result<Vec<Value>, SyncFailure> {
        let response = self
            .device
            .get_response(endpoint, self.request_timeout)
            .await
            .map_err(|e| self.transport_failure(&e))?;

        if !response.status().is_success() {
            return Err(device_status_failure(kind, label, response).await);
        }

        let payload: Value = response.json().await.map_err(|e| self.transport_failure(&e))?;
        match payload {
            Value::Array(items) => Ok(items),
            other => Err(SyncFailure {
                kind: SyncErrorKind::UnknownError,
                message: format!("Unexpected {} payload: expected an array", label.to_lowercase()),
                status: None,
                details: other,
            }),
        }
    }

    fn transport_failure(&self, err: &reqwest::Error) -> SyncFailure {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            SyncFailure {
                kind: SyncErrorKind::NetworkError,
                message: format!(
                    "Network error: Could not connect to API server at {}. \
                     This may be due to the server being down or network connectivity problems. \
                     Original error: {}",
                    self.device.base_url(),
                    err
                ),
                status: None,
                details: json!({ "error": err.to_string() }),
            }
        } else {
            SyncFailure {
                kind: SyncErrorKind::UnknownError,
                message: err.to_string(),
                status: None,
                details: json!({ "error": err.to_string() }),
            }
        }
    }

    /// Sync on demand and raise toasts for the start and the outcome.
    ///
    /// Returns `None` without syncing when a run is already in progress.
    pub async fn trigger(&self) -> Option<SyncReport> {
        let guard = match self.running.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!("Sync already in progress, ignoring trigger");
                return None;
            }
        };

        self.notifier.success("Sync Started", "Syncing data to Supabase...");
        let report = self.run_locked(guard).await;
        match (&report.data, &report.error) {
            (Some(counts), _) => self.notifier.success(
                "Sync Successful",
                format!(
                    "Successfully synced {} students and {} attendance records to Supabase.",
                    counts.students_count, counts.attendance_count
                ),
            ),
            (None, Some(failure)) => self
                .notifier
                .error("Sync Failed", truncate_text(&format!("Error: {}", failure.message), 200)),
            (None, None) => {}
        }
        Some(report)
    }

    /// Sync now and then every `interval`, skipping ticks missed while a run was busy
    pub fn start_periodic(&self, interval: Duration) -> JoinHandle<()> {
        let service = self.clone();
        info!(interval_secs = interval.as_secs(), "Setting up automatic sync");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut first = true;

            loop {
                ticker.tick().await;
                if !first {
                    info!("Running scheduled sync");
                }
                let report = service.sync_once().await;
                match (first, report.success) {
                    (true, true) => info!("Initial sync completed successfully"),
                    (true, false) => warn!(kind = ?report.error_kind(), "Initial sync failed"),
                    (false, false) => warn!(kind = ?report.error_kind(), "Scheduled sync failed"),
                    (false, true) => {}
                }
                first = false;
            }
        })
    }
}

fn store_failure(kind: SyncErrorKind, prefix: &str, err: &StoreError) -> SyncFailure {
    let details = match err {
        StoreError::Rejected { code, message, details, hint, status } => json!({
            "code": code,
            "message": message,
            "details": details,
            "hint": hint,
            "status": status,
        }),
        other => json!({ "message": other.to_string() }),
    };

    SyncFailure {
        kind,
        message: format!("{}: {}", prefix, err),
        status: None,
        details,
    }
}

async fn device_status_failure(kind: SyncErrorKind, label: &str, response: Response) -> SyncFailure {
    let status = response.status();
    let fallback = format!(
        "HTTP Error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string();

    let body = response.json::<Value>().await.unwrap_or_else(|_| json!({ "message": fallback }));
    let message = serde_json::from_value::<DeviceErrorBody>(body.clone())
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| "Unknown error".to_string());

    SyncFailure {
        kind,
        message: format!("{} sync failed with status {}: {}", label, status.as_u16(), message),
        status: Some(status.as_u16()),
        details: body,
    }
}
