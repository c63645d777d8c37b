//! Roster service implementation
//!
//! Student CRUD against either the device API or the hosted store. Both
//! backends sit behind [`RosterStore`]; [`RosterService`] adds the admin-side
//! behaviour on top (input checks, duplicate detection, toasts, audit logs).

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use super::device::DeviceClient;
use super::notification::NotificationService;
use super::store::{Query, StoreClient};
use crate::config::DataSource;
use crate::models::student::{search, students_from_payload};
use crate::models::{Course, CreateStudentRequest, Section, Student, UpdateStudentRequest};
use crate::services::auth::AdminSession;
use crate::utils::errors::{GateError, Result, StoreError};
use crate::utils::logging::log_admin_action;

/// Optional course/section narrowing of the roster
#[derive(Debug, Clone, Default)]
pub struct RosterQuery {
    pub course: Option<String>,
    pub section: Option<Section>,
}

impl RosterQuery {
    pub fn matches(&self, student: &Student) -> bool {
        self.course.as_ref().map_or(true, |c| &student.course == c)
            && self.section.map_or(true, |s| student.section == Some(s))
    }

    /// Number of active filters, shown on the filter button badge
    pub fn active_filters(&self) -> usize {
        usize::from(self.course.is_some()) + usize::from(self.section.is_some())
    }
}

/// A place students are stored
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Students sorted by name
    async fn list(&self, query: &RosterQuery) -> Result<Vec<Student>>;
    async fn create(&self, request: &CreateStudentRequest) -> Result<Student>;
    async fn update(&self, id: &str, request: &UpdateStudentRequest) -> Result<Student>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// Whether a roll number is taken
    async fn exists(&self, rollno: &str) -> Result<bool>;
    fn source(&self) -> DataSource;
}

/// Roster kept by the gate controller
#[derive(Clone)]
pub struct LocalRoster {
    device: DeviceClient,
}

impl LocalRoster {
    pub fn new(device: DeviceClient) -> Self {
        Self { device }
    }
}

#[async_trait]
impl RosterStore for LocalRoster {
    async fn list(&self, query: &RosterQuery) -> Result<Vec<Student>> {
        let payload = self.device.list_students().await?;
        let mut students: Vec<Student> = students_from_payload(&payload)
            .into_iter()
            .filter(|s| query.matches(s))
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn create(&self, request: &CreateStudentRequest) -> Result<Student> {
        let payload = self.device.create_student(request).await.map_err(|e| {
            if e.is_conflict() {
                GateError::DuplicateStudentId { student_id: request.rollno.clone() }
            } else {
                GateError::Api(e)
            }
        })?;

        Ok(student_from_response(&payload).unwrap_or_else(|| Student {
            id: "unknown".to_string(),
            rollno: request.rollno.clone(),
            name: request.name.clone(),
            course: request.course.clone(),
            section: request.section,
            dob: request.dob.clone().unwrap_or_default(),
            email: request.email.clone().unwrap_or_default(),
            created_at: None,
        }))
    }

    async fn update(&self, id: &str, request: &UpdateStudentRequest) -> Result<Student> {
        let payload = self.device.update_student(id, request).await.map_err(|e| match e.status {
            404 => GateError::StudentNotFound { id: id.to_string() },
            409 => GateError::DuplicateStudentId {
                student_id: request.rollno.clone().unwrap_or_default(),
            },
            _ => GateError::Api(e),
        })?;

        if let Some(student) = student_from_response(&payload) {
            return Ok(student);
        }

        // The device answered without a body; read the row back
        self.list(&RosterQuery::default())
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| GateError::StudentNotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.device.delete_student(id).await.map_err(|e| match e.status {
            404 => GateError::StudentNotFound { id: id.to_string() },
            _ => GateError::Api(e),
        })
    }

    async fn exists(&self, rollno: &str) -> Result<bool> {
        let payload = self.device.list_students().await?;
        Ok(students_from_payload(&payload).iter().any(|s| s.rollno == rollno))
    }

    fn source(&self) -> DataSource {
        DataSource::Local
    }
}

/// Responses that echo the stored student
fn student_from_response(payload: &Value) -> Option<Student> {
    let object = match payload {
        Value::Object(map) if map.contains_key("student") => map.get("student")?,
        Value::Object(_) => payload,
        _ => return None,
    };
    if object.get("name").is_none() {
        return None;
    }
    Some(Student::from_payload(object))
}

/// Roster in the hosted store's `students` table
#[derive(Clone)]
pub struct HostedRoster {
    store: StoreClient,
    table: String,
}

impl HostedRoster {
    pub fn new(store: StoreClient, table: impl Into<String>) -> Self {
        Self { store, table: table.into() }
    }
}

fn map_store_error(err: StoreError, rollno: Option<&str>) -> GateError {
    if err.is_unique_violation() {
        GateError::DuplicateStudentId {
            student_id: rollno.unwrap_or_default().to_string(),
        }
    } else {
        GateError::Store(err)
    }
}

#[async_trait]
impl RosterStore for HostedRoster {
    async fn list(&self, query: &RosterQuery) -> Result<Vec<Student>> {
        let mut q = Query::new().select("*");
        if let Some(course) = &query.course {
            q = q.eq("course", course);
        }
        if let Some(section) = query.section {
            q = q.eq("section", section.as_str());
        }
        let rows = self.store.select(&self.table, &q.order("name", true)).await?;
        Ok(rows.iter().map(Student::from_payload).collect())
    }

    async fn create(&self, request: &CreateStudentRequest) -> Result<Student> {
        let row = self
            .store
            .insert(&self.table, request)
            .await
            .map_err(|e| map_store_error(e, Some(&request.rollno)))?;
        Ok(Student::from_payload(&row))
    }

    async fn update(&self, id: &str, request: &UpdateStudentRequest) -> Result<Student> {
        let rows = self
            .store
            .update(&self.table, &Query::new().eq("id", id), request)
            .await
            .map_err(|e| map_store_error(e, request.rollno.as_deref()))?;

        rows.first()
            .map(Student::from_payload)
            .ok_or_else(|| GateError::StudentNotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&self.table, &Query::new().eq("id", id)).await?;
        Ok(())
    }

    async fn exists(&self, rollno: &str) -> Result<bool> {
        let row = self
            .store
            .select_single(&self.table, &Query::new().select("rollno").eq("rollno", rollno))
            .await?;
        Ok(row.is_some())
    }

    fn source(&self) -> DataSource {
        DataSource::Hosted
    }
}

/// Roll number of the form `yy` + programme code + three random digits
pub fn generate_student_id(enrollment_year: i32, course: Course) -> String {
    let year_code = enrollment_year.rem_euclid(100);
    let random: u32 = rand::thread_rng().gen_range(100..=999);
    format!("{:02}{}{}", year_code, course.code(), random)
}

/// Attempts before giving up on finding a free roll number
const MAX_ID_ATTEMPTS: usize = 50;

/// Admin-facing roster operations
#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn RosterStore>,
    notifier: NotificationService,
}

impl RosterService {
    /// Create a new RosterService instance
    pub fn new(store: Arc<dyn RosterStore>, notifier: NotificationService) -> Self {
        Self { store, notifier }
    }

    pub fn source(&self) -> DataSource {
        self.store.source()
    }

    pub async fn students(&self, query: &RosterQuery) -> Result<Vec<Student>> {
        debug!(source = ?self.store.source(), "Fetching roster");
        self.store.list(query).await
    }

    /// Roster narrowed by the search box
    pub async fn search(&self, term: &str) -> Result<Vec<Student>> {
        let students = self.store.list(&RosterQuery::default()).await?;
        Ok(search(&students, term).into_iter().cloned().collect())
    }

    pub async fn create_student(&self, admin: &AdminSession, request: CreateStudentRequest) -> Result<Student> {
        let result = self.try_create(&request).await;
        match &result {
            Ok(student) => {
                log_admin_action(&admin.username, "create_student", Some(&student.rollno), None);
                self.notifier.success("Student added", format!("{} has been added to the roster", student.name));
            }
            Err(e) => self.notifier.error("Could not add student", e.user_message()),
        }
        result
    }

    async fn try_create(&self, request: &CreateStudentRequest) -> Result<Student> {
        request.validate()?;
        if self.store.exists(&request.rollno).await? {
            return Err(GateError::DuplicateStudentId { student_id: request.rollno.clone() });
        }
        self.store.create(request).await
    }

    pub async fn update_student(&self, admin: &AdminSession, id: &str, request: UpdateStudentRequest) -> Result<Student> {
        let result = self.try_update(id, &request).await;
        match &result {
            Ok(student) => {
                log_admin_action(&admin.username, "update_student", Some(id), None);
                self.notifier.success("Student updated", format!("{} has been updated", student.name));
            }
            Err(e) => self.notifier.error("Could not update student", e.user_message()),
        }
        result
    }

    async fn try_update(&self, id: &str, request: &UpdateStudentRequest) -> Result<Student> {
        request.validate()?;
        if request.is_empty() {
            return Err(GateError::InvalidInput("Nothing to update".to_string()));
        }
        self.store.update(id, request).await
    }

    pub async fn delete_student(&self, admin: &AdminSession, id: &str) -> Result<()> {
        let result = self.store.delete(id).await;
        match &result {
            Ok(()) => {
                log_admin_action(&admin.username, "delete_student", Some(id), None);
                self.notifier.success("Student deleted", "The student has been removed from the roster");
            }
            Err(e) => self.notifier.error("Could not delete student", e.user_message()),
        }
        result
    }

    pub async fn student_id_exists(&self, rollno: &str) -> Result<bool> {
        self.store.exists(rollno).await
    }

    /// Generate roll numbers until one is free
    pub async fn generate_unique_student_id(&self, enrollment_year: i32, course: Course) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = generate_student_id(enrollment_year, course);
            if !self.store.exists(&candidate).await? {
                info!(student_id = %candidate, "Generated student ID");
                return Ok(candidate);
            }
        }
        Err(GateError::ServiceUnavailable(format!(
            "No free student ID for {} {} after {} attempts",
            enrollment_year,
            course.short_name(),
            MAX_ID_ATTEMPTS
        )))
    }
}
