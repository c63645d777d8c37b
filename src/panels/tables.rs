//! Student and attendance table panels

use async_trait::async_trait;
use tracing::warn;

use super::Panel;
use crate::models::attendance::AttendancePage;
use crate::models::student::search;
use crate::models::{AttendanceFilter, AttendanceRecord, Student};
use crate::services::{AttendanceService, RosterQuery, RosterService};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentTable {
    pub students: Vec<Student>,
    /// Message of the last failed load, if any
    pub error: Option<String>,
}

impl StudentTable {
    pub fn visible(&self, term: &str) -> Vec<&Student> {
        search(&self.students, term)
    }
}

pub struct StudentsPanel {
    roster: RosterService,
    query: RosterQuery,
}

impl StudentsPanel {
    pub fn new(roster: RosterService) -> Self {
        Self {
            roster,
            query: RosterQuery::default(),
        }
    }

    pub fn with_query(mut self, query: RosterQuery) -> Self {
        self.query = query;
        self
    }
}

#[async_trait]
impl Panel for StudentsPanel {
    type View = StudentTable;

    fn name(&self) -> &'static str {
        "students"
    }

    fn initial(&self) -> StudentTable {
        StudentTable::default()
    }

    async fn refresh(&mut self, _previous: &StudentTable) -> StudentTable {
        match self.roster.students(&self.query).await {
            Ok(students) => StudentTable { students, error: None },
            Err(e) => {
                warn!(error = %e, "Student list fetch failed");
                StudentTable {
                    students: Vec::new(),
                    error: Some(e.user_message()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttendanceTable {
    pub records: Vec<AttendanceRecord>,
    pub error: Option<String>,
}

impl AttendanceTable {
    pub fn page<'a>(&'a self, filter: &AttendanceFilter) -> AttendancePage<'a> {
        filter.page(&self.records)
    }
}

pub struct AttendancePanel {
    attendance: AttendanceService,
}

impl AttendancePanel {
    pub fn new(attendance: AttendanceService) -> Self {
        Self { attendance }
    }
}

#[async_trait]
impl Panel for AttendancePanel {
    type View = AttendanceTable;

    fn name(&self) -> &'static str {
        "attendance"
    }

    fn initial(&self) -> AttendanceTable {
        AttendanceTable::default()
    }

    async fn refresh(&mut self, _previous: &AttendanceTable) -> AttendanceTable {
        match self.attendance.recent().await {
            Ok(records) => AttendanceTable { records, error: None },
            Err(e) => {
                warn!(error = %e, "Attendance fetch failed");
                AttendanceTable {
                    records: Vec::new(),
                    error: Some(e.user_message()),
                }
            }
        }
    }
}
