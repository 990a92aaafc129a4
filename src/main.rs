use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::cli::{ConfigArgs, ServerArgs};
use configuration::load_config;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Bookshelf catalog application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; variables may come from the environment.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::InitDb(args) => handle_init_db(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small library catalog: authors, books, search and cover images.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web application.
    Serve(ServeArgs),
    /// Create the database file and schema, then exit.
    InitDb(ConfigArgs),
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    server: ServerArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut settings = load_config(args.config.config.as_deref()).context("loading configuration")?;
    args.server.apply(&mut settings);
    web_server::run_server(settings).await
}

async fn handle_init_db(args: ConfigArgs) -> anyhow::Result<()> {
    let settings = load_config(args.config.as_deref()).context("loading configuration")?;
    let path = &settings.database.path;
    let pool = database::connect(path, 1)
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    database::run_migrations(&pool).await?;
    pool.close().await;
    tracing::info!(path = %path.display(), "Database initialised.");
    Ok(())
}

/// Logs to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
