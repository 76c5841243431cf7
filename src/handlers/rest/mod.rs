
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use serde::de::DeserializeOwned;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{
        AddLineRequest, CreateNoteRequest, ErrorResponse, HealthResponse, LineResponse,
        ListNotesQuery, MessageResponse, NoteResponse, SearchQuery, UpdateNoteRequest,
    },
    models::SortKey,
    repository::RepositoryError,
    service::NoteService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_notes,
        create_note,
        get_note,
        update_note,
        delete_note,
        list_lines,
        add_line,
        search_notes
    ),
    components(schemas(
        NoteResponse,
        LineResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        AddLineRequest,
        HealthResponse,
        MessageResponse,
        ErrorResponse
    )),
    tags(
        (name = "notes", description = "Notes and lines API")
    )
)]
pub struct ApiDoc;

/// Every failure a handler can answer with; the body is `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::BadRequest(format!("Invalid request payload: {e}"))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

// A non-integer id is treated like an unmatched route.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::NotFound(format!("Invalid note id: {}", rejection.body_text()))
    }
}

/// Decodes a JSON body whatever its `Content-Type`; only malformed JSON is rejected.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(ApiError::from)
}

// Ids are non-negative; anything else is treated like an unmatched route.
fn parse_note_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = id?;
    if id < 0 {
        return Err(ApiError::NotFound(format!("Invalid note id: {id}")));
    }
    Ok(id)
}

fn store_failure(action: &str, e: RepositoryError) -> Response {
    tracing::error!("failed to {action}: {e}");
    ApiError::Store(e).into_response()
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn health() -> Response {
    let body = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/notes",
    params(ListNotesQuery),
    responses(
        (status = 200, description = "All notes, newest first", body = Vec<NoteResponse>),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn list_notes(
    State(service): State<Arc<NoteService>>,
    query: Result<Query<ListNotesQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    let sort = SortKey::from_query(query.sort.as_deref());

    match service.list_notes(sort).await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => store_failure("list notes", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Invalid request payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    body: Bytes,
) -> Response {
    let payload = match decode_body(&body) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    match service.create_note(payload).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => store_failure("create note entry", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match parse_note_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match service.get_note(id).await {
        Ok(Some(note)) => (StatusCode::OK, Json(note)).into_response(),
        Ok(None) => ApiError::NotFound("Note not found".to_string()).into_response(),
        Err(e) => store_failure("get note entry", e),
    }
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note overwritten", body = NoteResponse),
        (status = 400, description = "Invalid request payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Response {
    let id = match parse_note_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let payload = match decode_body(&body) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    match service.update_note(id, payload).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => store_failure("update note entry", e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note and its lines deleted", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match parse_note_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match service.delete_note(id).await {
        Ok(()) => {
            let body = MessageResponse {
                message: "Note deleted successfully".to_string(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => store_failure("delete note entry", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}/lines",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Lines of the note, oldest first", body = Vec<LineResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn list_lines(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let note_id = match parse_note_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match service.list_lines(note_id).await {
        Ok(lines) => (StatusCode::OK, Json(lines)).into_response(),
        Err(e) => store_failure("list lines", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/notes/{id}/lines",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = AddLineRequest,
    responses(
        (status = 201, description = "Line appended", body = LineResponse),
        (status = 400, description = "Invalid request payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn add_line(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Response {
    let note_id = match parse_note_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let payload = match decode_body(&body) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };

    match service.add_line(note_id, payload).await {
        Ok(line) => (StatusCode::CREATED, Json(line)).into_response(),
        Err(e) => store_failure("add line", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching notes, most recently modified first", body = Vec<NoteResponse>),
        (status = 400, description = "Search query is required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn search_notes(
    State(service): State<Arc<NoteService>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    let term = match query.q {
        Some(term) if !term.is_empty() => term,
        _ => {
            return ApiError::BadRequest("Search query is required".to_string()).into_response();
        }
    };

    match service.search_notes(term).await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => store_failure("search notes", e),
    }
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
