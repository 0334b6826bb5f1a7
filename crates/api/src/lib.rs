//! HTTP API: premium dashboard endpoints over the catalog overlay.

pub mod app;
pub mod middleware;
