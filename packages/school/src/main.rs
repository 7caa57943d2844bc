use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::FilesystemFileStore;
use tracing::info;

use school::config::AppConfig;
use school::database::init_db;
use school::services::UploadLocks;
use school::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(&env_filter).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let avatar_store = FilesystemFileStore::new(config.avatar.directory.clone())
        .await
        .context("Failed to initialize avatar directory")?;
    info!(
        directory = %config.avatar.directory.display(),
        max_upload_size = config.avatar.max_upload_size,
        "Avatar storage ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        avatar_store: Arc::new(avatar_store),
        upload_locks: Arc::new(UploadLocks::new()),
    };
    let app = school::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
