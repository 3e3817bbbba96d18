//! HTTP mapping for the core error taxonomy.
//!
//! Validation and upload rejections go back to the client with their
//! message; storage failures are logged here and answered with a generic
//! body so backend details never leak into a response.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use kb_core::error::AppError;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

/// Error body shape shared by every non-2xx response.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) | AppError::UploadRejected(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Storage(cause) = &self.0 {
            log::error!("storage failure: {cause}");
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.0.to_string(),
        })
    }
}
