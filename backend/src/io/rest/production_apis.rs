//! # REST API for Production Traceability
//!
//! Products, lots and the quality controls recorded against each lot.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use log::info;
use shared::{
    AddRecordRequest, AddRecordResponse, DeleteRecordResponse, Lot, LotTraceabilityResponse,
    Product, QualityControl, RecordListResponse,
};

use crate::io::rest::mappers::RecordMapper;
use crate::io::rest::extract::{ApiJson, ApiPath};
use crate::io::rest::record_apis::{self, ApiResult};
use crate::AppState;

pub fn product_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(add_product))
        .route("/:id", delete(delete_product))
}

pub fn lot_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lots).post(add_lot))
        .route("/:id", delete(delete_lot))
        .route("/:id/quality-controls", get(get_lot_quality_controls))
}

pub fn quality_control_router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_quality_control))
        .route("/:id", delete(delete_quality_control))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Json<RecordListResponse<Product>>> {
    info!("GET /api/products");
    record_apis::list_records(&state.production.products).await
}

pub async fn add_product(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddRecordRequest>,
) -> ApiResult<(StatusCode, Json<AddRecordResponse<Product>>)> {
    info!("POST /api/products - request: {:?}", request);
    record_apis::add_record(&state.production.products, request).await
}

pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteRecordResponse<Product>>> {
    info!("DELETE /api/products/{}", id);
    record_apis::delete_record(&state.production.products, id).await
}

pub async fn list_lots(State(state): State<AppState>) -> ApiResult<Json<RecordListResponse<Lot>>> {
    info!("GET /api/lots");
    record_apis::list_records(&state.production.lots).await
}

pub async fn add_lot(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddRecordRequest>,
) -> ApiResult<(StatusCode, Json<AddRecordResponse<Lot>>)> {
    info!("POST /api/lots - request: {:?}", request);
    record_apis::add_record(&state.production.lots, request).await
}

pub async fn delete_lot(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteRecordResponse<Lot>>> {
    info!("DELETE /api/lots/{}", id);
    record_apis::delete_record(&state.production.lots, id).await
}

/// Traceability detail: every quality control of one lot, newest first
pub async fn get_lot_quality_controls(
    State(state): State<AppState>,
    ApiPath(lot_id): ApiPath<i64>,
) -> ApiResult<Json<LotTraceabilityResponse>> {
    info!("GET /api/lots/{}/quality-controls", lot_id);

    let records = state.production.quality_controls_for(lot_id).await?;
    Ok(Json(LotTraceabilityResponse {
        lot_id,
        quality_controls: RecordMapper::to_dto_list(&records)?,
    }))
}

pub async fn add_quality_control(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddRecordRequest>,
) -> ApiResult<(StatusCode, Json<AddRecordResponse<QualityControl>>)> {
    info!("POST /api/quality-controls - request: {:?}", request);
    record_apis::add_record(&state.production.quality_controls, request).await
}

pub async fn delete_quality_control(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteRecordResponse<QualityControl>>> {
    info!("DELETE /api/quality-controls/{}", id);
    record_apis::delete_record(&state.production.quality_controls, id).await
}
