//! Student model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::{array_of, id_field, opt_str_field, str_field, str_field_any};
use crate::utils::errors::{GateError, Result};
use crate::utils::helpers::contains_ignore_case;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    /// Human-readable student number, unique across the roster
    pub rollno: String,
    pub name: String,
    pub course: String,
    pub section: Option<Section>,
    pub dob: String,
    pub email: String,
    pub created_at: Option<String>,
}

impl Student {
    /// Build a student from an untrusted payload entry
    pub fn from_payload(value: &Value) -> Self {
        Self {
            id: id_field(value, "id", "unknown"),
            rollno: str_field_any(value, &["rollno", "studentId", "student_id"], "N/A"),
            name: str_field(value, "name", "Unknown"),
            course: str_field(value, "course", ""),
            section: opt_str_field(value, "section").and_then(|s| Section::parse(&s)),
            dob: str_field(value, "dob", ""),
            email: str_field(value, "email", ""),
            created_at: opt_str_field(value, "created_at"),
        }
    }

    /// Case-insensitive match over name, roll number and course
    pub fn matches(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
            || contains_ignore_case(&self.rollno, term)
            || contains_ignore_case(&self.course, term)
    }
}

/// Parse a roster payload; anything other than an array is an empty roster
pub fn students_from_payload(payload: &Value) -> Vec<Student> {
    array_of(payload, Student::from_payload)
}

/// Filter the roster the way the student table search box does
pub fn search<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    students.iter().filter(|s| s.matches(term)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    A,
    B,
}

impl Section {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "A" | "a" => Some(Section::A),
            "B" | "b" => Some(Section::B),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::A => "A",
            Section::B => "B",
        }
    }
}

/// Programmes offered at the gate's campus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Course {
    Iot,
    CyberSecurity,
    AiDs,
}

impl Course {
    pub const ALL: [Course; 3] = [Course::Iot, Course::CyberSecurity, Course::AiDs];

    /// Value stored in the `course` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Iot => "B.Tech CSE - IoT",
            Course::CyberSecurity => "B.Tech CSE - CS",
            Course::AiDs => "B.Tech CSE - AI&DS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Course::Iot => "IoT (Internet of Things)",
            Course::CyberSecurity => "CS (Cyber Security)",
            Course::AiDs => "AI&DS (AI & Data Structures)",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Course::Iot => "IoT",
            Course::CyberSecurity => "CS",
            Course::AiDs => "AI&DS",
        }
    }

    /// Programme code embedded in generated roll numbers
    pub fn code(&self) -> &'static str {
        "110"
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value || c.short_name() == value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub rollno: String,
    pub course: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CreateStudentRequest {
    /// Required fields of the add-student form
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("name", &self.name), ("student ID", &self.rollno), ("course", &self.course)] {
            if value.trim().is_empty() {
                return Err(GateError::InvalidInput(format!("Student {} is required", field)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollno: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateStudentRequest {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("name", &self.name), ("student ID", &self.rollno), ("course", &self.course)] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(GateError::InvalidInput(format!("Student {} cannot be empty", field)));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.rollno.is_none()
            && self.course.is_none()
            && self.section.is_none()
            && self.dob.is_none()
            && self.email.is_none()
    }

    /// Apply the patch to a local copy, as the table does after a successful save
    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(rollno) = &self.rollno {
            student.rollno = rollno.clone();
        }
        if let Some(course) = &self.course {
            student.course = course.clone();
        }
        if let Some(section) = self.section {
            student.section = Some(section);
        }
        if let Some(dob) = &self.dob {
            student.dob = dob.clone();
        }
        if let Some(email) = &self.email {
            student.email = email.clone();
        }
    }
}
