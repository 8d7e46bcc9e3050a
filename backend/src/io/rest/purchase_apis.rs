//! # REST API for Purchases
//!
//! `GET/POST /api/purchases`, `DELETE /api/purchases/:id`. Listings are
//! newest first.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use log::info;
use shared::{AddRecordRequest, AddRecordResponse, DeleteRecordResponse, Purchase, RecordListResponse};

use crate::io::rest::extract::{ApiJson, ApiPath};
use crate::io::rest::record_apis::{self, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases).post(add_purchase))
        .route("/:id", delete(delete_purchase))
}

pub async fn list_purchases(
    State(state): State<AppState>,
) -> ApiResult<Json<RecordListResponse<Purchase>>> {
    info!("GET /api/purchases");
    record_apis::list_records(&state.purchases).await
}

pub async fn add_purchase(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddRecordRequest>,
) -> ApiResult<(StatusCode, Json<AddRecordResponse<Purchase>>)> {
    info!("POST /api/purchases - fields: {:?}", request.fields.keys().collect::<Vec<_>>());
    record_apis::add_record(&state.purchases, request).await
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteRecordResponse<Purchase>>> {
    info!("DELETE /api/purchases/{}", id);
    record_apis::delete_record(&state.purchases, id).await
}
