//! Gate Console
//!
//! Monitoring and administration for a camera-verified attendance gate.
//! This library provides a typed client for the gate's device API, a client
//! for the hosted store the roster is mirrored to, roster and attendance
//! services, polling dashboard panels, an admin gate and periodic sync.

pub mod config;
pub mod middleware;
pub mod models;
pub mod panels;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{GateError, Result};

// Re-export main components for easy access
pub use middleware::AdminGate;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
