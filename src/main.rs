mod app;
mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

use std::sync::{Arc, Mutex};

use repository::Repository;
use service::NoteService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load configuration: {e}");
        panic!("failed to load configuration: {e}");
    });

    // Repository creation and migration
    let mut repo = Repository::open(&cfg.db_path).unwrap_or_else(|e| {
        tracing::error!("Failed to open database: {e}");
        panic!("failed to open database: {e}");
    });
    tracing::info!("Using database at: {}", cfg.db_path.display());

    repo.migrate().unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    // Service creation
    let service = Arc::new(NoteService::new(Arc::new(Mutex::new(repo))));

    if !cfg.static_dir.is_dir() {
        tracing::warn!(
            "Static directory '{}' does not exist, frontend requests will 404",
            cfg.static_dir.display()
        );
    }

    // Router config
    let router = app::router(service, &cfg.static_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind port {}: {e}", cfg.port);
            panic!("failed to bind port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Server started, listening on {}", addr),
        Err(e) => tracing::warn!("Server started, local address unavailable: {e}"),
    }

    axum::serve(listener, router).await.unwrap_or_else(|e| {
        tracing::error!("HTTP server error: {e}");
        panic!("HTTP server error: {e}");
    });
}
