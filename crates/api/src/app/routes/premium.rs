use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::app::dto::{MakePremiumRequest, PremiumIdsDto, PremiumRecordDto, RemovePremiumRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/make-premium", post(make_premium))
        .route("/remove-premium", post(remove_premium))
        .route("/premium-products", get(list_premium))
        .route("/premium-products/ids", get(list_premium_ids))
}

async fn make_premium(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<MakePremiumRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return errors::mutation_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let (id, attributes) = match req.validate() {
        Ok(v) => v,
        Err(e) => return errors::mutation_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match services.membership.mark_premium(id, attributes).await {
        Ok(_) => errors::mutation_response(StatusCode::OK, errors::MARKED),
        Err(_) => errors::mutation_response(StatusCode::INTERNAL_SERVER_ERROR, errors::MARK_FAILED),
    }
}

async fn remove_premium(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RemovePremiumRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return errors::mutation_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let id = match req.validate() {
        Ok(id) => id,
        Err(e) => return errors::mutation_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match services.membership.unmark_premium(&id).await {
        Ok(_) => errors::mutation_response(StatusCode::OK, errors::UNMARKED),
        Err(e) => errors::unmark_error_to_response(&e),
    }
}

/// Every premium record, whether or not the catalog still lists it.
async fn list_premium(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.listing.premium_records().await {
        Ok(records) => {
            let body: Vec<PremiumRecordDto> = records.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(_) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, errors::PREMIUM_LIST_FAILED),
    }
}

async fn list_premium_ids(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.listing.premium_ids().await {
        Ok(ids) => {
            let body = PremiumIdsDto {
                premium_product_ids: ids.into_iter().map(|id| id.into_inner()).collect(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(_) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, errors::PREMIUM_LIST_FAILED),
    }
}
