use crate::error::DbError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;

/// Establishes a connection pool to the SQLite catalog database at `path`.
///
/// The file (and its parent directory) is created if missing. Foreign keys are
/// enforced on every pooled connection so that a book can never reference a
/// missing author.
pub async fn connect(path: impl AsRef<Path>, max_connections: u32) -> Result<SqlitePool, DbError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let options = base_options().filename(path).create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::debug!(path = %path.display(), max_connections, "Connected to the catalog database.");
    Ok(pool)
}

/// Connects to a fresh in-memory database with the schema applied.
///
/// An in-memory database lives only as long as its connection, so the pool is
/// pinned to a single connection that never expires. Used by tests across the
/// workspace.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let options = base_options().filename(":memory:");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Applies the embedded schema migrations.
///
/// Safe to call on every start-up; already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn base_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        // Concurrent writers wait for the lock instead of failing immediately.
        .busy_timeout(Duration::from_millis(1500))
}
