use std::sync::Arc;

use anyhow::Context;

use fitin_planner::api::build_app;
use fitin_planner::config::ServerConfig;
use fitin_planner::notify::TracingNotifier;
use fitin_planner::photos::LocalPhotoStore;
use fitin_planner::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );
    let photos = Arc::new(LocalPhotoStore::new(&config.photo_dir));

    let app = build_app(
        db,
        photos,
        Arc::new(TracingNotifier),
        config.validation_mode,
        config.redirects.clone(),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(
        port = config.port,
        db = %config.db_path.display(),
        photos = %config.photo_dir.display(),
        validation_mode = ?config.validation_mode,
        "FitIn planner started"
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
