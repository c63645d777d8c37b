//! Middleware module
//!
//! This module contains the guard in front of the admin screens

pub mod auth;

// Re-export commonly used middleware
pub use auth::{AdminGate, Route, RouteDecision};
