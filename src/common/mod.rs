//! Shared error handling

pub mod error;
pub mod result;
