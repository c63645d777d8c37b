//! Test helpers module
//!
//! This module provides utilities and helpers for testing the gate console.
//! It includes mock servers for the device API and the hosted store, sample
//! payloads, and a context that wires services against the mocks.

#![allow(dead_code)]

pub mod device_mock;
pub mod store_mock;
pub mod test_context;
pub mod test_data;

pub use device_mock::*;
pub use store_mock::*;
pub use test_context::*;
pub use test_data::*;
