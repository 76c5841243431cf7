use super::*;
use tempfile::tempdir;

fn repo() -> Repository {
    let mut repo = Repository::open_in_memory().unwrap();
    repo.migrate().unwrap();
    repo
}

// ===========================================
// Bootstrap
// ===========================================

#[test]
fn migrate_creates_both_tables() {
    let repo = repo();

    for table in ["notes", "lines"] {
        let exists: bool = repo
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(true),
            )
            .unwrap_or(false);
        assert!(exists, "{table} table should exist after migrate");
    }
}

#[test]
fn migrate_is_idempotent() {
    let mut repo = repo();
    repo.migrate().unwrap();
}

#[test]
fn open_enables_foreign_keys() {
    let repo = repo();

    let fk_enabled: i32 = repo
        .conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();

    assert_eq!(fk_enabled, 1);
}

#[test]
fn open_creates_file_and_parent_directories() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("notetime.db");

    let mut repo = Repository::open(&db_path).unwrap();
    repo.migrate().unwrap();
    repo.create_note("persisted", "").unwrap();
    drop(repo);

    let reopened = Repository::open(&db_path).unwrap();
    assert_eq!(reopened.list_notes(SortKey::default()).unwrap().len(), 1);
}

// ===========================================
// Notes
// ===========================================

#[test]
fn create_note_sets_equal_timestamps() {
    let repo = repo();

    let note = repo.create_note("X", "Y").unwrap();

    assert_eq!(note.id, 1);
    assert_eq!(note.title, "X");
    assert_eq!(note.content, "Y");
    assert_eq!(note.created_at, note.last_modified);
}

#[test]
fn create_note_substitutes_default_title() {
    let repo = repo();

    let note = repo.create_note("", "body").unwrap();

    assert_eq!(note.title, DEFAULT_TITLE);
    assert_eq!(repo.get_note(note.id).unwrap().unwrap().title, DEFAULT_TITLE);
}

#[test]
fn get_note_returns_stored_note() {
    let repo = repo();
    let created = repo.create_note("X", "Y").unwrap();

    assert_eq!(repo.get_note(created.id).unwrap(), Some(created));
}

#[test]
fn get_missing_note_returns_none() {
    let repo = repo();

    assert_eq!(repo.get_note(42).unwrap(), None);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let repo = repo();
    let first = repo.create_note("a", "").unwrap();
    repo.delete_note(first.id).unwrap();

    let second = repo.create_note("b", "").unwrap();

    assert!(second.id > first.id);
}

#[test]
fn update_note_overwrites_and_bumps_last_modified() {
    let repo = repo();
    let created = repo.create_note("old", "old body").unwrap();

    let updated = repo.update_note(created.id, "", "new body").unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "");
    assert_eq!(updated.content, "new body");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.last_modified > created.last_modified);
    assert_eq!(repo.get_note(created.id).unwrap(), Some(updated));
}

#[test]
fn update_missing_note_succeeds_without_inserting() {
    let repo = repo();

    let echoed = repo.update_note(7, "ghost", "nothing").unwrap();

    assert_eq!(echoed.id, 7);
    assert_eq!(echoed.title, "ghost");
    assert!(echoed.last_modified >= echoed.created_at);
    assert_eq!(repo.get_note(7).unwrap(), None);
}

#[test]
fn delete_missing_note_succeeds() {
    let repo = repo();

    repo.delete_note(99).unwrap();
}

#[test]
fn list_notes_orders_by_chosen_column() {
    let repo = repo();
    let first = repo.create_note("first", "").unwrap();
    let second = repo.create_note("second", "").unwrap();
    // Touching the older note makes it the most recently modified.
    repo.update_note(first.id, "first", "edited").unwrap();

    let by_modified: Vec<i64> = repo
        .list_notes(SortKey::LastModified)
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    let by_created: Vec<i64> = repo
        .list_notes(SortKey::CreationDate)
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();

    assert_eq!(by_modified, vec![first.id, second.id]);
    assert_eq!(by_created, vec![second.id, first.id]);
}

#[test]
fn list_notes_on_empty_store_is_empty() {
    let repo = repo();

    assert!(repo.list_notes(SortKey::default()).unwrap().is_empty());
}

// ===========================================
// Lines
// ===========================================

#[test]
fn add_line_bumps_parent_last_modified() {
    let mut repo = repo();
    let note = repo.create_note("X", "Y").unwrap();

    let line = repo.add_line(note.id, "hi").unwrap();

    assert_eq!(line.id, 1);
    assert_eq!(line.note_id, note.id);
    assert_eq!(line.content, "hi");
    let parent = repo.get_note(note.id).unwrap().unwrap();
    assert_eq!(parent.last_modified, line.timestamp);
    assert_eq!(parent.created_at, note.created_at);
}

#[test]
fn add_line_to_missing_note_persists_nothing() {
    let mut repo = repo();

    let result = repo.add_line(5, "orphan");

    assert!(matches!(result, Err(RepositoryError::Sqlite(_))));
    let count: i64 = repo
        .conn
        .query_row("SELECT COUNT(*) FROM lines", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn list_lines_is_chronological() {
    let mut repo = repo();
    let note = repo.create_note("X", "").unwrap();
    let other = repo.create_note("other", "").unwrap();
    for content in ["one", "two", "three"] {
        repo.add_line(note.id, content).unwrap();
    }
    repo.add_line(other.id, "elsewhere").unwrap();

    let lines = repo.list_lines(note.id).unwrap();

    let contents: Vec<&str> = lines.iter().map(|l| l.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    assert!(lines.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn delete_note_cascades_to_lines() {
    let mut repo = repo();
    let note = repo.create_note("X", "").unwrap();
    repo.add_line(note.id, "a").unwrap();
    repo.add_line(note.id, "b").unwrap();

    repo.delete_note(note.id).unwrap();

    assert!(repo.list_lines(note.id).unwrap().is_empty());
    let count: i64 = repo
        .conn
        .query_row("SELECT COUNT(*) FROM lines", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

// ===========================================
// Search
// ===========================================

#[test]
fn search_matches_title_or_content() {
    let repo = repo();
    let by_title = repo.create_note("shopping list", "").unwrap();
    let by_content = repo.create_note("monday", "buy a shopping bag").unwrap();
    repo.create_note("tuesday", "nothing here").unwrap();

    let ids: Vec<i64> = repo
        .search_notes("shopping")
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();

    assert_eq!(ids, vec![by_content.id, by_title.id]);
}

#[test]
fn search_treats_wildcards_literally() {
    let repo = repo();
    let percent = repo.create_note("100% done", "").unwrap();
    repo.create_note("plain", "").unwrap();
    repo.create_note("a_b", "").unwrap();

    let percent_hits = repo.search_notes("%").unwrap();
    let underscore_hits = repo.search_notes("_").unwrap();

    assert_eq!(percent_hits.len(), 1);
    assert_eq!(percent_hits[0].id, percent.id);
    assert_eq!(underscore_hits.len(), 1);
    assert_eq!(underscore_hits[0].title, "a_b");
}

#[test]
fn like_pattern_escapes_special_characters() {
    assert_eq!(like_pattern("abc"), "%abc%");
    assert_eq!(like_pattern("50%_\\"), "%50\\%\\_\\\\%");
}
