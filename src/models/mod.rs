use chrono::{DateTime, Utc};

/// Title given to notes created without one.
pub const DEFAULT_TITLE: &str = "Untitled Diary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: i64,
    pub note_id: i64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Column the note listing is ordered by, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    CreationDate,
    #[default]
    LastModified,
}

impl SortKey {
    /// Unknown or empty keys fall back to `LastModified`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("creation_date") => Self::CreationDate,
            Some("last_modified" | "") | None => Self::LastModified,
            Some(other) => {
                tracing::debug!("unknown sort key '{other}', using last_modified");
                Self::LastModified
            }
        }
    }
}
