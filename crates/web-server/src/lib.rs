use anyhow::Context;
use api_client::CoverService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::Settings;
use database::DbRepository;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod flash;
pub mod handlers;
pub mod views;

use views::Views;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub db_repo: DbRepository,
    /// `None` when cover lookups are disabled.
    pub covers: Option<CoverService>,
    pub views: Views,
}

/// Builds the application router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(|| async { "OK" }))
        .route("/add_author", get(handlers::add_author_form).post(handlers::add_author))
        .route("/add_book", get(handlers::add_book_form).post(handlers::add_book))
        .route("/book/:book_id/delete", post(handlers::delete_book))
        .with_state(state)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
}

/// Connects to the catalog, prepares the views and serves HTTP until Ctrl-C.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database.path, settings.database.max_connections)
        .await
        .with_context(|| format!("opening {}", settings.database.path.display()))?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool.clone());

    let covers = if settings.covers.enabled {
        Some(CoverService::from_config(&settings.covers)?)
    } else {
        tracing::info!("Cover lookups are disabled.");
        None
    };
    let views = Views::new().context("compiling templates")?;

    let app = router(Arc::new(AppState { db_repo, covers, views }));

    let addr = settings.server.address();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
}
