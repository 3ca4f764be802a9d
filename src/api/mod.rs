//! REST API module.
//!
//! Handlers translate HTTP input into repository and booking calls and wrap
//! the outcome in the JSON envelope.

mod customers;
mod reservations;
mod restaurants;

pub use customers::*;
pub use reservations::*;
pub use restaurants::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// 200 OK with `data`.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(StatusCode::OK, data))
}

/// 201 Created with `data`.
pub fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(StatusCode::CREATED, data))
}

/// 204 No Content.
pub fn no_content() -> Result<StatusCode, AppError> {
    Ok(StatusCode::NO_CONTENT)
}

/// Turn an empty lookup into a 404.
fn found<T>(value: Option<T>, what: &str, key: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::NotFound(format!("{} {} not found", what, key)))
}
