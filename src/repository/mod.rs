mod embedded;

#[cfg(test)]
mod tests;

use embedded::migrations;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::models::{DEFAULT_TITLE, Line, Note, SortKey};

const NOTE_COLUMNS: &str = "id, title, content, created_at, last_modified";

const LIST_BY_CREATION_DATE: &str =
    "SELECT id, title, content, created_at, last_modified FROM notes ORDER BY created_at DESC, id DESC";
const LIST_BY_LAST_MODIFIED: &str =
    "SELECT id, title, content, created_at, last_modified FROM notes ORDER BY last_modified DESC, id DESC";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("failed to create database directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SortKey {
    const fn list_query(self) -> &'static str {
        match self {
            Self::CreationDate => LIST_BY_CREATION_DATE,
            Self::LastModified => LIST_BY_LAST_MODIFIED,
        }
    }
}

pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Opens or creates the database file, creating missing parent directories.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|source| RepositoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Self::from_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        // Cascading deletes depend on this, and SQLite defaults it to off per connection.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn migrate(&mut self) -> Result<(), RepositoryError> {
        let migrations_report = migrations::runner().run(&mut self.conn)?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }

    pub fn list_notes(&self, sort: SortKey) -> Result<Vec<Note>, RepositoryError> {
        let mut stmt = self.conn.prepare(sort.list_query())?;
        let notes = stmt
            .query_map([], note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn get_note(&self, id: i64) -> Result<Option<Note>, RepositoryError> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                params![id],
                note_from_row,
            )
            .optional()?;

        Ok(note)
    }

    pub fn create_note(&self, title: &str, content: &str) -> Result<Note, RepositoryError> {
        let title = if title.is_empty() { DEFAULT_TITLE } else { title };
        let now = Utc::now();

        let note = self.conn.query_row(
            &format!(
                "INSERT INTO notes (title, content, created_at, last_modified) \
                 VALUES (?1, ?2, ?3, ?3) RETURNING {NOTE_COLUMNS}"
            ),
            params![title, content, now],
            note_from_row,
        )?;

        Ok(note)
    }

    /// Overwrites title and content. Updating a missing id is not an error: the
    /// returned note then echoes the input with both timestamps set to now.
    pub fn update_note(
        &self,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Note, RepositoryError> {
        let now = Utc::now();

        let updated = self
            .conn
            .query_row(
                &format!(
                    "UPDATE notes SET title = ?1, content = ?2, last_modified = ?3 \
                     WHERE id = ?4 RETURNING {NOTE_COLUMNS}"
                ),
                params![title, content, now, id],
                note_from_row,
            )
            .optional()?;

        Ok(updated.unwrap_or_else(|| {
            tracing::debug!("update of missing note {id} matched no rows");
            Note {
                id,
                title: title.to_owned(),
                content: content.to_owned(),
                created_at: now,
                last_modified: now,
            }
        }))
    }

    pub fn delete_note(&self, id: i64) -> Result<(), RepositoryError> {
        let rows = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id])?;

        tracing::debug!("deleted {rows} note(s) with id {id}");

        Ok(())
    }

    pub fn list_lines(&self, note_id: i64) -> Result<Vec<Line>, RepositoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, note_id, content, timestamp FROM lines \
             WHERE note_id = ?1 ORDER BY timestamp ASC, id ASC",
        )?;
        let lines = stmt
            .query_map(params![note_id], line_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }

    /// Inserts the line and bumps the parent's `last_modified` in one transaction.
    pub fn add_line(&mut self, note_id: i64, content: &str) -> Result<Line, RepositoryError> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        let line = tx.query_row(
            "INSERT INTO lines (note_id, content, timestamp) VALUES (?1, ?2, ?3) \
             RETURNING id, note_id, content, timestamp",
            params![note_id, content, now],
            line_from_row,
        )?;

        tx.execute(
            "UPDATE notes SET last_modified = ?1 WHERE id = ?2",
            params![line.timestamp, note_id],
        )?;

        tx.commit()?;

        Ok(line)
    }

    pub fn search_notes(&self, term: &str) -> Result<Vec<Note>, RepositoryError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\' \
             ORDER BY last_modified DESC, id DESC"
        ))?;
        let notes = stmt
            .query_map(params![like_pattern(term)], note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        last_modified: row.get("last_modified")?,
    })
}

fn line_from_row(row: &Row<'_>) -> rusqlite::Result<Line> {
    Ok(Line {
        id: row.get("id")?,
        note_id: row.get("note_id")?,
        content: row.get("content")?,
        timestamp: row.get("timestamp")?,
    })
}

/// Wraps `term` for a substring `LIKE`, escaping its wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
