use axum::http::StatusCode;
use thiserror::Error;

use crate::{
    db::StoreError,
    error::{ErrorMessage, HttpError},
    models::inspectionmodel::JobStatus,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Invalid credentials. Admin access restricted.")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job {0} not found")]
    JobNotFound(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Contractor {0} not found")]
    ContractorNotFound(String),

    #[error("Repair item {repair_id} not found on job {job_id}")]
    RepairNotFound { job_id: String, repair_id: String },

    #[error("Job {job_id} cannot move from {from} to {to}")]
    IllegalTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("User {user_id} is not authorized to perform this action on job {job_id}")]
    UnauthorizedJobAccess { user_id: String, job_id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidCredentials | ServiceError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }

            ServiceError::Validation(_) | ServiceError::IllegalTransition { .. } => {
                StatusCode::BAD_REQUEST
            }

            ServiceError::JobNotFound(_)
            | ServiceError::UserNotFound(_)
            | ServiceError::ContractorNotFound(_)
            | ServiceError::RepairNotFound { .. } => StatusCode::NOT_FOUND,

            ServiceError::UnauthorizedJobAccess { .. } | ServiceError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }

            ServiceError::Store(StoreError::DuplicateId { .. }) => StatusCode::CONFLICT,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            // One generic message for every credential failure.
            ServiceError::InvalidCredentials => {
                HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string())
            }
            ServiceError::NotAuthenticated => {
                HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string())
            }
            ServiceError::Store(StoreError::MissingRecord { .. }) => {
                tracing::error!("store inconsistency: {}", error);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
            other => HttpError::new(other.to_string(), other.status_code()),
        }
    }
}
