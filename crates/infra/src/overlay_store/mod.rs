//! Durable overlay store adapters.
//!
//! The in-memory store used for dev/tests lives next to the contract in
//! `premier-overlay`.

pub mod postgres;

pub use postgres::PostgresOverlayStore;
