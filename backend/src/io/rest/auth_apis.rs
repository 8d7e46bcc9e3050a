//! # REST API for Login

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use log::info;
use shared::{LoginRequest, LoginResponse};

use crate::domain::commands::LoginCommand;
use crate::io::rest::extract::ApiJson;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(login))
}

/// `200` with `success: true` for the configured credential, `401` otherwise
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/login - user: {}", request.username);

    let result = state.auth_service.login(LoginCommand {
        username: request.username,
        password: request.password,
    });

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    let response = LoginResponse {
        success: result.success,
        message: result.message,
    };
    (status, Json(response))
}
