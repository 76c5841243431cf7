use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Line, Note};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note body
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the last edit or appended line
    pub last_modified: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            last_modified: note.last_modified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineResponse {
    /// Line ID
    pub id: i64,
    /// Owning note ID
    pub note_id: i64,
    /// Line text
    pub content: String,
    /// Time the line was appended
    pub timestamp: DateTime<Utc>,
}

impl From<Line> for LineResponse {
    fn from(line: Line) -> Self {
        Self {
            id: line.id,
            note_id: line.note_id,
            content: line.content,
            timestamp: line.timestamp,
        }
    }
}

/// A JSON `null` reads the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateNoteRequest {
    /// Note title, "Untitled Diary" when empty
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    /// Note body
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateNoteRequest {
    /// New title, empty when absent
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    /// New body, empty when absent
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AddLineRequest {
    /// Line text
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListNotesQuery {
    /// `creation_date` or `last_modified` (default)
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring to look for in titles and bodies
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
