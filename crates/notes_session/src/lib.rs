//! Command handlers reconciling the local [`NoteStore`] with the remote notes
//! resource.
//!
//! All state lives behind one lock owned by [`NotesSession`]. The lock is taken
//! briefly before and after each remote call and never held across `.await`,
//! so responses are applied one at a time. Every command records a generation
//! (or is idempotent by id) so a superseded response cannot overwrite newer
//! state. A listing requested before a create, update or delete was applied is
//! dropped, and nothing is applied after [`NotesSession::close`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use note_store::{NoteStore, NotesView, ViewQuery};
use note_types::{ApiError, Note, NoteDraft, NoteFilter, NoteId, NoteUpdate, NotesApi, SortKey};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotesError {
    #[error("failed to load notes: {0}")]
    Load(#[source] ApiError),
    #[error("failed to create note: {0}")]
    Create(#[source] ApiError),
    #[error("failed to update note #{id}: {source}")]
    Update { id: NoteId, source: ApiError },
    #[error("failed to delete note #{id}: {source}")]
    Delete { id: NoteId, source: ApiError },
}

impl NotesError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            NotesError::Load(source) | NotesError::Create(source) => source,
            NotesError::Update { source, .. } | NotesError::Delete { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The remote call succeeded and the store was updated.
    Applied,
    /// Nothing was sent: the session is busy, closed, or has nothing to act on.
    Skipped,
    /// The response arrived after being superseded and was dropped.
    Discarded,
    /// The remote call failed; the error is now the session's current error.
    Failed,
}

#[derive(Default)]
struct SessionState {
    store: NoteStore,
    query: ViewQuery,
    error: Option<NotesError>,
    busy: bool,
    loaded: bool,
    closed: bool,
    load_generation: u64,
    /// Bumped whenever a create, update or delete changes the store.
    store_epoch: u64,
    update_generation: u64,
    latest_updates: HashMap<NoteId, u64>,
}

impl SessionState {
    fn fail(&mut self, err: NotesError) {
        error!(error = %err, "notes command failed");
        self.error = Some(err);
    }

    fn selected_in_view(&self) -> Option<NoteId> {
        self.store
            .view(&self.query, Utc::now())
            .selected()
            .map(|note| note.id.clone())
    }
}

/// Clears the busy flag when a create or delete finishes, including when its
/// future is dropped before completion.
struct BusyGuard {
    state: Arc<Mutex<SessionState>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.lock().busy = false;
    }
}

#[derive(Clone)]
pub struct NotesSession {
    api: Arc<dyn NotesApi>,
    state: Arc<Mutex<SessionState>>,
    draft: NoteDraft,
}

impl NotesSession {
    pub fn new(api: Arc<dyn NotesApi>, draft: NoteDraft, query: ViewQuery) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(SessionState {
                query,
                ..SessionState::default()
            })),
            draft,
        }
    }

    /// Replaces the store with the remote listing. On failure the store keeps
    /// its previous contents.
    pub async fn load(&self) -> CommandOutcome {
        let (generation, epoch) = {
            let mut state = self.state.lock();
            if state.closed {
                return CommandOutcome::Skipped;
            }
            state.load_generation += 1;
            (state.load_generation, state.store_epoch)
        };

        let result = self.api.list_notes().await;

        let mut state = self.state.lock();
        if state.closed || generation != state.load_generation {
            debug!(generation, "discarding superseded notes listing");
            return CommandOutcome::Discarded;
        }
        if epoch != state.store_epoch {
            debug!(
                generation,
                "discarding notes listing requested before a local change"
            );
            return CommandOutcome::Discarded;
        }

        match result {
            Ok(records) => {
                let now = Utc::now();
                let received = records.len();
                let notes: Vec<Note> = records
                    .into_iter()
                    .filter_map(|record| record.into_note(now))
                    .collect();
                if notes.len() < received {
                    warn!(
                        dropped = received - notes.len(),
                        "dropping note records without an id"
                    );
                }

                let duplicates = state.store.load(notes);
                if duplicates > 0 {
                    warn!(duplicates, "dropping duplicate note ids from listing");
                }
                state.loaded = true;
                info!(count = state.store.len(), "notes loaded");
                CommandOutcome::Applied
            }
            Err(err) => {
                state.fail(NotesError::Load(err));
                CommandOutcome::Failed
            }
        }
    }

    /// Creates a note from the default draft and selects it. Skipped while a
    /// create or delete is in flight.
    pub async fn create_note(&self) -> CommandOutcome {
        let guard = {
            let mut state = self.state.lock();
            if state.closed {
                return CommandOutcome::Skipped;
            }
            if state.busy {
                debug!("create ignored while another command is in flight");
                return CommandOutcome::Skipped;
            }
            state.busy = true;
            BusyGuard {
                state: Arc::clone(&self.state),
            }
        };

        let result = self.api.create_note(&self.draft).await.and_then(|record| {
            record
                .into_note(Utc::now())
                .ok_or_else(|| ApiError::InvalidResponse("created note has no id".to_owned()))
        });
        drop(guard);

        let mut state = self.state.lock();
        if state.closed {
            return CommandOutcome::Discarded;
        }
        match result {
            Ok(note) => {
                info!(id = %note.id, "note created");
                state.store.insert(note);
                state.store_epoch += 1;
                CommandOutcome::Applied
            }
            Err(err) => {
                state.fail(NotesError::Create(err));
                CommandOutcome::Failed
            }
        }
    }

    /// Deletes the note selected in the current view and selects its previous
    /// neighbour in that view (or the next one when it was first). Confirmation
    /// is the caller's job.
    pub async fn delete_active(&self) -> CommandOutcome {
        let (id, guard) = {
            let mut state = self.state.lock();
            if state.closed || state.busy {
                debug!("delete ignored");
                return CommandOutcome::Skipped;
            }
            let Some(id) = state.selected_in_view() else {
                debug!("no selected note to delete");
                return CommandOutcome::Skipped;
            };
            state.busy = true;
            let guard = BusyGuard {
                state: Arc::clone(&self.state),
            };
            (id, guard)
        };

        let result = self.api.delete_note(&id).await;
        drop(guard);

        let mut state = self.state.lock();
        if state.closed {
            return CommandOutcome::Discarded;
        }
        match result {
            Ok(()) => {
                info!(%id, "note deleted");
                let neighbour = {
                    let view = state.store.view(&state.query, Utc::now());
                    view.position(&id).and_then(|position| {
                        position
                            .checked_sub(1)
                            .and_then(|previous| view.get(previous))
                            .or_else(|| view.get(position + 1))
                            .map(|note| note.id.clone())
                    })
                };
                state.store.remove(&id);
                if let Some(neighbour) = neighbour {
                    state.store.select(&neighbour);
                }
                state.latest_updates.remove(&id);
                state.store_epoch += 1;
                CommandOutcome::Applied
            }
            Err(err) => {
                state.fail(NotesError::Delete { id, source: err });
                CommandOutcome::Failed
            }
        }
    }

    /// Sends the full payload and merges the server's answer into the store.
    /// Failures are recorded as the current error and also returned.
    pub async fn update_note(
        &self,
        id: &NoteId,
        update: NoteUpdate,
    ) -> Result<CommandOutcome, NotesError> {
        let generation = {
            let mut state = self.state.lock();
            if state.closed {
                return Ok(CommandOutcome::Skipped);
            }
            state.update_generation += 1;
            let generation = state.update_generation;
            state.latest_updates.insert(id.clone(), generation);
            generation
        };

        let result = self.api.update_note(id, &update).await;

        let mut state = self.state.lock();
        if state.closed {
            return Ok(CommandOutcome::Discarded);
        }
        let is_latest = state.latest_updates.get(id) == Some(&generation);
        if is_latest {
            state.latest_updates.remove(id);
        }

        match result {
            Ok(record) if is_latest => {
                if state.store.replace(id, record.into_patch(), Utc::now()) {
                    info!(%id, "note updated");
                    state.store_epoch += 1;
                    Ok(CommandOutcome::Applied)
                } else {
                    debug!(%id, "updated note is no longer in the store");
                    Ok(CommandOutcome::Discarded)
                }
            }
            Ok(_) => {
                debug!(%id, generation, "discarding superseded update response");
                Ok(CommandOutcome::Discarded)
            }
            Err(err) => {
                let err = NotesError::Update {
                    id: id.clone(),
                    source: err,
                };
                state.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Flips the pinned flag, keeping title and content. A failure is left as
    /// the current error and not propagated.
    pub async fn toggle_pin(&self, id: &NoteId) -> CommandOutcome {
        let Some(note) = self.note(id) else {
            return CommandOutcome::Skipped;
        };
        let update = NoteUpdate {
            title: note.title,
            content: note.content,
            pinned: Some(!note.pinned),
        };
        self.update_note(id, update)
            .await
            .unwrap_or(CommandOutcome::Failed)
    }

    /// Best-effort reachability probe; failures are ignored.
    pub async fn check_health(&self) -> Option<String> {
        match self.api.health().await {
            Ok(status) => Some(status),
            Err(err) => {
                debug!(error = %err, "health check failed");
                None
            }
        }
    }

    pub fn with_view<R>(&self, render: impl FnOnce(&NotesView<'_>) -> R) -> R {
        let state = self.state.lock();
        let view = state.store.view(&state.query, Utc::now());
        render(&view)
    }

    pub fn note(&self, id: &NoteId) -> Option<Note> {
        self.state.lock().store.get(id).cloned()
    }

    /// The note shown as selected in the current view.
    pub fn selected(&self) -> Option<Note> {
        self.with_view(|view| view.selected().cloned())
    }

    pub fn select(&self, id: &NoteId) -> bool {
        self.state.lock().store.select(id)
    }

    /// Selects by position in the current view.
    pub fn select_index(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        let id = state
            .store
            .view(&state.query, Utc::now())
            .get(index)
            .map(|note| note.id.clone());
        match id {
            Some(id) => state.store.select(&id),
            None => false,
        }
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.state.lock().query.search = search.into();
    }

    pub fn set_filter(&self, filter: NoteFilter) {
        self.state.lock().query.filter = filter;
    }

    pub fn set_sort(&self, sort: SortKey) {
        self.state.lock().query.sort = sort;
    }

    pub fn query(&self) -> ViewQuery {
        self.state.lock().query.clone()
    }

    pub fn error(&self) -> Option<NotesError> {
        self.state.lock().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.state.lock().error = None;
    }

    /// True while a create or delete is in flight; the UI disables both.
    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    pub fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    pub fn note_count(&self) -> usize {
        self.state.lock().store.len()
    }

    /// Tears the session down; responses arriving afterwards are dropped.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
