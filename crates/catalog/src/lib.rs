//! External product catalog: read-only item model and the gateway contract.
//!
//! The catalog is owned by another system. Nothing in this workspace creates,
//! updates, or deletes catalog items; we only page through them.

pub mod gateway;
pub mod item;

pub use gateway::{CatalogError, CatalogGateway, CatalogPage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use item::{CatalogItem, Money};
