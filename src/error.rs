use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection could not be taken from the pool.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The pool itself could not be built.
    #[error("Pool creation error: {0}")]
    PoolCreation(#[from] deadpool_postgres::CreatePoolError),

    /// A column was missing or had an unexpected shape.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// The caller did not identify an owner.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The deck, box or card does not exist or belongs to someone else.
    #[error("Resource not found")]
    NotFound,

    /// The session is not in a state that allows the operation.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// A session was requested on a box without cards.
    #[error("Empty selection: {0}")]
    EmptySelection(String),

    /// A card was pointed at a box of another deck.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::PoolCreation(_)
            | AppError::MissingData(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::EmptySelection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConstraintViolation(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                "Database unavailable".to_string()
            }

            AppError::PoolCreation(ref e) => {
                tracing::error!("Pool creation error: {}", e);
                "Database unavailable".to_string()
            }

            AppError::MissingData(ref column) => {
                tracing::error!("Missing data in column: {}", column);
                "Database error".to_string()
            }

            AppError::Unauthorized(ref msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                msg.clone()
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                "Resource not found".to_string()
            }

            AppError::InvalidTransition(ref msg) => {
                tracing::debug!("Invalid transition: {}", msg);
                msg.clone()
            }

            AppError::EmptySelection(ref msg) => {
                tracing::warn!("Empty selection: {}", msg);
                msg.clone()
            }

            AppError::ConstraintViolation(ref msg) => {
                tracing::warn!("Constraint violation: {}", msg);
                msg.clone()
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                msg.clone()
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
