use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to prepare the database location: {0}")]
    ConnectionConfigError(#[from] std::io::Error),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("A unique constraint was violated: {0}")]
    UniqueViolation(String),

    #[error("A foreign key constraint was violated: {0}")]
    ForeignKeyViolation(String),

    #[error("The requested data was not found in the database.")]
    NotFound,
}

impl DbError {
    /// Sorts constraint failures out of a raw `sqlx::Error` so callers can tell
    /// a duplicate or dangling reference apart from an infrastructure failure.
    pub(crate) fn classify(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return DbError::ForeignKeyViolation(db_err.message().to_string());
            }
        }
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            other => DbError::QueryError(other),
        }
    }
}
