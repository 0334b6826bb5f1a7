//! Infrastructure layer: overlay persistence, catalog adapters, configuration.

pub mod catalog;
pub mod config;
pub mod overlay_store;
