//! # REST API Interface Layer
//!
//! One router per module, nested under `/api` by [`crate::create_router`].
//! Handlers log the request, call the module controller and map the result
//! through `mappers`; domain errors become JSON bodies via
//! [`record_apis::ApiError`].

pub mod auth_apis;
pub mod employee_apis;
pub mod extract;
pub mod mappers;
pub mod production_apis;
pub mod purchase_apis;
pub mod record_apis;

pub use record_apis::{ApiError, ApiResult};
