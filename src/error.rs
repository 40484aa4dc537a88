use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::views;

/// AppError
///
/// Every failure a request can end in, one variant per category so the HTTP
/// layer can pick a status instead of aborting the request.
#[derive(Debug, Error)]
pub enum AppError {
    /// The pool could not hand out a working connection.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// A lookup by id matched nothing.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique, foreign-key, not-null or check constraint rejected a write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Any other database error.
    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("session token could not be issued: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<sqlx::Error> for AppError {
    /// Sorts raw driver errors into the categories above.
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row"),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AppError::Connection(err),
            sqlx::Error::Database(ref db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => AppError::Constraint(db.message().to_string()),
                _ => AppError::Query(err),
            },
            other => AppError::Query(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Constraint(_) => StatusCode::CONFLICT,
            AppError::Connection(_)
            | AppError::Query(_)
            | AppError::Hashing(_)
            | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text shown to the visitor. Server-side failures stay generic; the
    /// detail only goes to the log.
    fn public_message(&self) -> String {
        match self {
            AppError::NotFound(what) => format!("The requested {what} does not exist."),
            AppError::Constraint(_) => {
                "That record conflicts with one that already exists.".to_string()
            }
            _ => "Something went wrong on our side.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, views::error_page(status, &self.public_message())).into_response()
    }
}
