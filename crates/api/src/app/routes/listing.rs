use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app::dto::{AnnotatedItemDto, ListingQuery};
use crate::app::errors;
use crate::app::services::AppServices;

/// Live catalog page annotated with premium membership, optionally filtered.
pub async fn products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match services.listing.annotated_listing(&filter).await {
        Ok(items) => {
            let body: Vec<AnnotatedItemDto> = items.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::listing_error_to_response(&e),
    }
}
