use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::usecases::{
    assets::AssetError, credits::CreditError, generation::GenerationError,
    job_status::JobStatusError, projects::ProjectError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// App-level error taxonomy mapped onto HTTP statuses at the route boundary.
/// Job-processing failures never pass through here; they land in the job's
/// `error` column and surface via polling.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Rate limit exceeded")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Insufficient credits")]
    PaymentRequired,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, reset_at) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, None),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, None),
            AppError::RateLimited { reset_at } => (StatusCode::TOO_MANY_REQUESTS, Some(*reset_at)),
            AppError::PaymentRequired => (StatusCode::PAYMENT_REQUIRED, None),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let message = match &self {
            AppError::Internal(source) => {
                // Don't leak internal error detail to clients.
                error!(error = ?source, "request failed with internal error");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
            reset_at,
        });

        (status, body).into_response()
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            e @ (GenerationError::InvalidMode(_)
            | GenerationError::MissingDescription
            | GenerationError::NotAnInput) => AppError::Validation(e.to_string()),
            GenerationError::InputAssetNotFound => {
                AppError::NotFound("input asset not found".to_string())
            }
            GenerationError::NotOwner => AppError::Forbidden,
            GenerationError::InsufficientCredits => AppError::PaymentRequired,
            GenerationError::RateLimited { reset_at, .. } => AppError::RateLimited { reset_at },
            GenerationError::Internal(source) => AppError::Internal(source),
        }
    }
}

impl From<JobStatusError> for AppError {
    fn from(err: JobStatusError) -> Self {
        match err {
            JobStatusError::NotFound => AppError::NotFound("job not found".to_string()),
            JobStatusError::Forbidden => AppError::Forbidden,
            JobStatusError::Internal(source) => AppError::Internal(source),
        }
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        match err {
            e @ AssetError::UnsupportedMediaType(_) => AppError::Validation(e.to_string()),
            AssetError::ProjectNotFound => AppError::NotFound("project not found".to_string()),
            AssetError::NotFound => AppError::NotFound("asset not found".to_string()),
            AssetError::Forbidden => AppError::Forbidden,
            AssetError::Internal(source) => AppError::Internal(source),
        }
    }
}

impl From<ProjectError> for AppError {
    fn from(err: ProjectError) -> Self {
        match err {
            e @ ProjectError::MissingName => AppError::Validation(e.to_string()),
            ProjectError::NotFound => AppError::NotFound("project not found".to_string()),
            ProjectError::Forbidden => AppError::Forbidden,
            ProjectError::Internal(source) => AppError::Internal(source),
        }
    }
}

impl From<CreditError> for AppError {
    fn from(err: CreditError) -> Self {
        match err {
            e @ CreditError::InvalidAmount => AppError::Validation(e.to_string()),
            CreditError::Internal(source) => AppError::Internal(source),
        }
    }
}
