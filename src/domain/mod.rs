//! Domain layer: pending changes, configuration and naming rules

pub mod entities;
pub mod value_objects;
