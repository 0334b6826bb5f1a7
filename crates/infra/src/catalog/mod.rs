//! Catalog gateway adapters.

pub mod in_memory;
pub mod shopify;

pub use in_memory::InMemoryCatalog;
pub use shopify::ShopifyAdminGateway;
