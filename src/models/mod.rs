//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod attendance;
pub mod device;
pub mod payload;
pub mod student;

// Re-export commonly used models
pub use attendance::{AttendanceFilter, AttendanceRecord, AttendanceStatus, VerificationMethod};
pub use device::{CameraSnapshot, CameraState, DeviceHealth, DoorState, DoorStatus, GateStats, RecognitionStatus};
pub use student::{Course, CreateStudentRequest, Section, Student, UpdateStudentRequest};
