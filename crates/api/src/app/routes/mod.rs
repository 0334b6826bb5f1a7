use axum::{routing::get, Router};

pub mod listing;
pub mod premium;
pub mod system;

/// Router for every public endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/products", get(listing::products))
        .nest("/api", premium::router())
}
