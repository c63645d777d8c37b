//! Error handling for the gate console
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the gate console
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Device API error: {0}")]
    Api(#[from] ApiError),

    #[error("Hosted store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Student ID already exists: {student_id}")]
    DuplicateStudentId { student_id: String },

    #[error("Student not found: {id}")]
    StudentNotFound { id: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Device API errors, carrying the HTTP status the dashboard shows.
///
/// A status of `0` means the request never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Request failed with a non-success status
    pub fn http(status: u16) -> Self {
        Self::new(format!("API request failed with status {}", status), status)
    }

    pub fn network() -> Self {
        Self::new("Network error: Unable to connect to the API server", 0)
    }

    pub fn timeout() -> Self {
        Self::new("Request timeout: API server took too long to respond", 408)
    }

    pub fn unexpected(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("Unexpected error: {}", detail), 0)
    }

    /// Classify a transport failure from reqwest
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout()
        } else if err.is_connect() {
            Self::network()
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16())
        } else {
            Self::unexpected(err)
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }
}

/// Hosted store (PostgREST) errors
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The store answered with an error body
    #[error("{message}")]
    Rejected {
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
        status: u16,
    },

    /// The store could not be reached at all
    #[error("Hosted store unreachable: {0}")]
    Unreachable(String),

    #[error("Hosted store timeout")]
    Timeout,

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
}

/// Postgres unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST "single row requested, none returned"
pub const NO_ROWS: &str = "PGRST116";

impl StoreError {
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Rejected { code, status, .. } => {
                code.as_deref() == Some(UNIQUE_VIOLATION) || *status == 409
            }
            _ => false,
        }
    }

    pub fn is_no_rows(&self) -> bool {
        self.code() == Some(NO_ROWS)
    }

    /// True when the store was never reached (as opposed to refusing the request)
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Unreachable(_) | StoreError::Timeout)
    }

    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Unreachable(err.to_string())
        }
    }
}

/// Result type alias for gate console operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Result type alias for device API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Result type alias for hosted store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl GateError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            GateError::Api(_) => true,
            GateError::Store(e) => e.is_transport(),
            GateError::Config(_) => false,
            GateError::ConfigLoad(_) => false,
            GateError::PermissionDenied(_) => false,
            GateError::DuplicateStudentId { .. } => false,
            GateError::StudentNotFound { .. } => false,
            GateError::Http(_) => true,
            GateError::Serialization(_) => false,
            GateError::Io(_) => true,
            GateError::UrlParse(_) => false,
            GateError::Authentication(_) => false,
            GateError::InvalidInput(_) => false,
            GateError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GateError::Config(_) | GateError::ConfigLoad(_) => ErrorSeverity::Critical,
            GateError::PermissionDenied(_) => ErrorSeverity::Warning,
            GateError::Authentication(_) => ErrorSeverity::Warning,
            GateError::DuplicateStudentId { .. } => ErrorSeverity::Warning,
            GateError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Short text suitable for a toast description
    pub fn user_message(&self) -> String {
        match self {
            GateError::DuplicateStudentId { student_id } => {
                format!("Student ID {} already exists. Please use a different ID.", student_id)
            }
            GateError::InvalidInput(message) => message.clone(),
            GateError::Api(e) if e.status == 0 => e.message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
