use actix_web::{HttpResponse, http::StatusCode};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

pub type AppResult<T> = Result<T, AppError>;

/// Service-wide error taxonomy. Every business failure is terminal to the
/// triggering call; nothing here is retried internally.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("insufficient leave balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("leave type '{0}' is not available for this employee")]
    IneligibleForLeaveType(String),

    #[error("an existing leave request already covers this date range")]
    OverlappingRequest,

    #[error("cannot move leave request from {from} to {to}")]
    InvalidTransition { from: LeaveStatus, to: LeaveStatus },

    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Concurrent write detected; the caller should retry the whole operation.
    #[error("concurrent update detected: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientBalance { .. }
            | Self::IneligibleForLeaveType(_)
            | Self::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OverlappingRequest | Self::AlreadyExists(_) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Database(e) = self {
            tracing::error!(error = %e, "database failure");
            // Opaque storage failures are not leaked to the client
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal Server Error"
            }));
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(
            AppError::NotFound("Employee".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::OverlappingRequest.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::AlreadyExists("LeaveBalance".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidTransition {
                from: LeaveStatus::Rejected,
                to: LeaveStatus::Approved,
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidInput("bad date".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
