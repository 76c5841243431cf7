use axum::{
    Router,
    http::{Method, header},
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use std::{path::Path, sync::Arc};

use crate::{handlers::rest, service::NoteService};

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// API routes under `/api`; every other path is served from `static_dir`.
pub fn router(service: Arc<NoteService>, static_dir: &Path) -> Router {
    let api_router = Router::new()
        .route("/health", get(rest::health))
        .route("/notes", get(rest::list_notes))
        .route("/notes", post(rest::create_note))
        .route("/notes/{id}", get(rest::get_note))
        .route("/notes/{id}", put(rest::update_note))
        .route("/notes/{id}", delete(rest::delete_note))
        .route("/notes/{id}/lines", get(rest::list_lines))
        .route("/notes/{id}/lines", post(rest::add_line))
        .route("/search", get(rest::search_notes))
        .route("/openapi.json", get(rest::openapi))
        .with_state(service);

    Router::new()
        .nest("/api", api_router)
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
