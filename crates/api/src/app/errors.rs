use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use premier_overlay::{ListingError, MembershipError};

pub const MARKED: &str = "Product marked as premium!";
pub const MARK_FAILED: &str = "Failed to mark product as premium.";
pub const UNMARKED: &str = "Product removed from premium list.";
pub const UNMARK_NOT_FOUND: &str = "Product not found in premium list.";
pub const UNMARK_FAILED: &str = "Failed to remove product.";
pub const PREMIUM_LIST_FAILED: &str = "Failed to fetch premium products";

/// `{error}` body used by the read endpoints.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

/// `{success, message}` body used by the mutation endpoints.
pub fn mutation_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": status.is_success(),
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Storage details stay in the logs; callers get a fixed message.
pub fn listing_error_to_response(err: &ListingError) -> Response {
    match err {
        ListingError::Upstream(_) => json_error(
            StatusCode::BAD_GATEWAY,
            "Failed to fetch products from the catalog",
        ),
        ListingError::Storage(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read premium products",
        ),
    }
}

pub fn unmark_error_to_response(err: &MembershipError) -> Response {
    match err {
        MembershipError::NotFound(_) => mutation_response(StatusCode::NOT_FOUND, UNMARK_NOT_FOUND),
        MembershipError::Storage(_) => {
            mutation_response(StatusCode::INTERNAL_SERVER_ERROR, UNMARK_FAILED)
        }
    }
}
