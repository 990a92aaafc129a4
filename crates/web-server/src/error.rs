use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Template error: {0}")]
    Template(#[from] upon::Error),
    #[error("Unknown view: {0}")]
    UnknownView(&'static str),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Internal details are logged, never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "The requested record does not exist".to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Template(template_err) => {
                tracing::error!(error = %template_err, "Template error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The page could not be rendered".to_string(),
                )
            }
            AppError::UnknownView(name) => {
                tracing::error!(view = name, "Unknown view.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The page could not be rendered".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        (status, error_message).into_response()
    }
}

/// A user-facing description of a failed write, with the status to answer
/// with. The raw database error is logged here and never shown.
pub fn persistence_failure(err: &DbError, what: &str) -> (StatusCode, String) {
    match err {
        DbError::UniqueViolation(_) => (
            StatusCode::CONFLICT,
            format!("Could not add {what}: a book with this ISBN already exists."),
        ),
        DbError::ForeignKeyViolation(_) => (
            StatusCode::CONFLICT,
            format!("Could not add {what}: the selected author does not exist."),
        ),
        other => {
            tracing::error!(error = ?other, what, "Failed to persist.");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not add {what} because of an internal error."),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_failures_are_conflicts_without_raw_text() {
        let err = DbError::UniqueViolation("UNIQUE constraint failed: books.isbn".to_string());
        let (status, message) = persistence_failure(&err, "book");
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!message.contains("books.isbn"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::Database(DbError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = AppError::NotFound("gone".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
