//! # REST API for Employees
//!
//! `GET/POST /api/employees`, `DELETE /api/employees/:id`. Listings are
//! oldest first.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use log::info;
use shared::{AddRecordRequest, AddRecordResponse, DeleteRecordResponse, Employee, RecordListResponse};

use crate::io::rest::extract::{ApiJson, ApiPath};
use crate::io::rest::record_apis::{self, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(add_employee))
        .route("/:id", delete(delete_employee))
}

pub async fn list_employees(
    State(state): State<AppState>,
) -> ApiResult<Json<RecordListResponse<Employee>>> {
    info!("GET /api/employees");
    record_apis::list_records(&state.employees).await
}

pub async fn add_employee(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddRecordRequest>,
) -> ApiResult<(StatusCode, Json<AddRecordResponse<Employee>>)> {
    info!("POST /api/employees - fields: {:?}", request.fields.keys().collect::<Vec<_>>());
    record_apis::add_record(&state.employees, request).await
}

pub async fn delete_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteRecordResponse<Employee>>> {
    info!("DELETE /api/employees/{}", id);
    record_apis::delete_record(&state.employees, id).await
}
