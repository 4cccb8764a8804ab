use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lease_backup::{BackupError, ErrorCode, OperationOutcome};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// HTTP status for a backup error code. Both in-progress codes are
/// transient and map to 503 so clients retry.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::BackupOperationInProgress | ErrorCode::RestoreInProgress => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ChecksumMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, outcome) = match &self {
            AppError::NotFound(m) => (
                StatusCode::NOT_FOUND,
                OperationOutcome::<()>::failed(ErrorCode::NotFound, m.clone()),
            ),
            AppError::BadRequest(m) => (
                StatusCode::BAD_REQUEST,
                OperationOutcome {
                    success: false,
                    data: None,
                    error: Some(m.clone()),
                    error_code: None,
                },
            ),
            AppError::Backup(e) => {
                let status = status_for(e.code());
                if status.is_server_error() && !e.is_transient() {
                    tracing::error!(code = %e.code(), "Backup operation failed: {e}");
                }
                (status, OperationOutcome::failed(e.code(), e.to_string()))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    OperationOutcome::failed(ErrorCode::IoError, "Internal server error"),
                )
            }
        };
        (status, Json(outcome)).into_response()
    }
}
