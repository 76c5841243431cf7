use crate::{
    dto::{AddLineRequest, CreateNoteRequest, LineResponse, NoteResponse, UpdateNoteRequest},
    models::SortKey,
    repository::{Repository, RepositoryError},
};

use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<Mutex<Repository>>,
}

impl NoteService {
    pub const fn new(repo: Arc<Mutex<Repository>>) -> Self {
        Self { repo }
    }

    /// Runs `f` against the repository on the blocking pool.
    async fn with_repo<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Repository) -> Result<T, RepositoryError> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);

        tokio::task::spawn_blocking(move || {
            let mut repo = repo.lock().map_err(|_| RepositoryError::Poisoned)?;
            f(&mut repo)
        })
        .await?
    }

    pub async fn list_notes(&self, sort: SortKey) -> Result<Vec<NoteResponse>, RepositoryError> {
        self.with_repo(move |repo| repo.list_notes(sort))
            .await
            .map(|notes| notes.into_iter().map(NoteResponse::from).collect())
    }

    pub async fn get_note(&self, id: i64) -> Result<Option<NoteResponse>, RepositoryError> {
        self.with_repo(move |repo| repo.get_note(id))
            .await
            .map(|note| note.map(NoteResponse::from))
    }

    pub async fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> Result<NoteResponse, RepositoryError> {
        self.with_repo(move |repo| repo.create_note(&request.title, &request.content))
            .await
            .map(NoteResponse::from)
    }

    pub async fn update_note(
        &self,
        id: i64,
        request: UpdateNoteRequest,
    ) -> Result<NoteResponse, RepositoryError> {
        self.with_repo(move |repo| repo.update_note(id, &request.title, &request.content))
            .await
            .map(NoteResponse::from)
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), RepositoryError> {
        self.with_repo(move |repo| repo.delete_note(id)).await
    }

    pub async fn list_lines(&self, note_id: i64) -> Result<Vec<LineResponse>, RepositoryError> {
        self.with_repo(move |repo| repo.list_lines(note_id))
            .await
            .map(|lines| lines.into_iter().map(LineResponse::from).collect())
    }

    pub async fn add_line(
        &self,
        note_id: i64,
        request: AddLineRequest,
    ) -> Result<LineResponse, RepositoryError> {
        self.with_repo(move |repo| repo.add_line(note_id, &request.content))
            .await
            .map(LineResponse::from)
    }

    pub async fn search_notes(&self, term: String) -> Result<Vec<NoteResponse>, RepositoryError> {
        self.with_repo(move |repo| repo.search_notes(&term))
            .await
            .map(|notes| notes.into_iter().map(NoteResponse::from).collect())
    }
}
