//! Common test utilities and helpers
//!
//! Shared by the integration tests: a scripted command runner that records
//! every command it is asked to run, and helpers for scratch git
//! repositories.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_helpers;
