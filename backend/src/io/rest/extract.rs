//! Extractors whose rejections come back as [`ApiError`] bodies instead of
//! axum's plain-text responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::domain::errors::RecordError;
use crate::io::rest::record_apis::ApiError;

/// `axum::Json` with a `Validation` error on a malformed body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with a `Validation` error on an unparsable segment
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(RecordError::validation("body", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(RecordError::validation("id", rejection.body_text()))
    }
}
