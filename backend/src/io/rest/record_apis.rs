//! Handlers shared by every record module, plus the mapping from domain
//! errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, info, warn};
use shared::{
    AddRecordRequest, AddRecordResponse, DeleteRecordResponse, ErrorKind, ErrorResponse,
    RecordListResponse,
};

use crate::domain::commands::{AddRecordCommand, DeleteRecordCommand};
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::Record;
use crate::domain::module_controller::ModuleController;
use crate::io::rest::mappers::{FromRecord, RecordMapper};

/// A [`RecordError`] on its way out as a JSON error body
#[derive(Debug)]
pub struct ApiError(pub RecordError);

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RecordError::Validation { .. } | RecordError::NoSelection => StatusCode::BAD_REQUEST,
            RecordError::Referential { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RecordError::Conflict(_) => StatusCode::CONFLICT,
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.0 {
            RecordError::Validation { .. } => ErrorKind::Validation,
            RecordError::NoSelection => ErrorKind::NoSelection,
            RecordError::Referential { .. } => ErrorKind::Referential,
            RecordError::Conflict(_) => ErrorKind::Conflict,
            RecordError::NotFound { .. } => ErrorKind::NotFound,
            RecordError::Store(_) => ErrorKind::Store,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            kind: self.kind(),
            message: self.0.to_string(),
            field: self.0.field().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub async fn list_records<T: FromRecord>(
    controller: &ModuleController,
) -> ApiResult<Json<RecordListResponse<T>>> {
    let records = controller.refresh().await?;
    info!("Returning {} {} records", records.len(), controller.kind());

    Ok(Json(RecordListResponse {
        records: RecordMapper::to_dto_list(&records)?,
    }))
}

pub async fn add_record<T: FromRecord>(
    controller: &ModuleController,
    request: AddRecordRequest,
) -> ApiResult<(StatusCode, Json<AddRecordResponse<T>>)> {
    let command = AddRecordCommand {
        fields: request.fields,
    };
    let result = controller.add_record(command).await?;
    let (records, listing_error) = listing_dtos(result.listing);

    let response = AddRecordResponse {
        id: result.id,
        success_message: result.success_message,
        records,
        listing_error,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn delete_record<T: FromRecord>(
    controller: &ModuleController,
    id: i64,
) -> ApiResult<Json<DeleteRecordResponse<T>>> {
    let result = controller.delete_record(DeleteRecordCommand { id }).await?;
    let (records, listing_error) = listing_dtos(result.listing);

    Ok(Json(DeleteRecordResponse {
        deleted_id: result.deleted_id,
        success_message: result.success_message,
        records,
        listing_error,
    }))
}

/// Listing re-read after a committed write; a failure is reported in the body
fn listing_dtos<T: FromRecord>(listing: RecordResult<Vec<Record>>) -> (Vec<T>, Option<String>) {
    match listing.and_then(|records| RecordMapper::to_dto_list(&records)) {
        Ok(records) => (records, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    }
}
