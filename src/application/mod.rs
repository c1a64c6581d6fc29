//! Application layer: the publish cycle and the watch loop around it

pub mod services;
pub mod use_cases;
