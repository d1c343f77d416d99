//! Client-held copy of the remote notes collection.
//!
//! [`NoteStore`] is only ever mutated after the remote resource has confirmed
//! an operation; the [`view`] module derives the filtered and sorted
//! projection shown to the user without copying notes.

pub mod view;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use note_types::{Note, NoteId, NotePatch};

pub use view::{NotesView, RECENT_WINDOW_HOURS, ViewQuery, derive_view, resolve_selection};

/// Ordered notes keyed by id, plus the id of the selected note.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: IndexMap<NoteId, Note>,
    selected: Option<NoteId>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection and selects the first note. Later
    /// duplicates of an id are dropped; the number dropped is returned.
    pub fn load(&mut self, notes: impl IntoIterator<Item = Note>) -> usize {
        let mut next = IndexMap::new();
        let mut duplicates = 0;
        for note in notes {
            if next.contains_key(&note.id) {
                duplicates += 1;
                continue;
            }
            next.insert(note.id.clone(), note);
        }

        self.selected = next.keys().next().cloned();
        self.notes = next;
        duplicates
    }

    /// Prepends a freshly created note and selects it. An existing entry with
    /// the same id is replaced and moved to the front.
    pub fn insert(&mut self, note: Note) {
        let id = note.id.clone();
        self.notes.shift_remove(&id);
        self.notes.shift_insert(0, id.clone(), note);
        self.selected = Some(id);
    }

    /// Merges `patch` into the note with `id`, keeping its id and creation
    /// time. Returns `false` when no such note exists.
    pub fn replace(&mut self, id: &NoteId, patch: NotePatch, now: DateTime<Utc>) -> bool {
        let Some(note) = self.notes.get_mut(id) else {
            return false;
        };

        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(pinned) = patch.pinned {
            note.pinned = pinned;
        }
        note.updated_at = patch.updated_at.unwrap_or(now).max(note.created_at);
        true
    }

    /// Removes the note with `id`. If it was selected, the selection moves to
    /// the previous note in store order (or the new first note, or nothing).
    pub fn remove(&mut self, id: &NoteId) -> Option<Note> {
        let (index, _, removed) = self.notes.shift_remove_full(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = self
                .notes
                .get_index(index.saturating_sub(1))
                .map(|(id, _)| id.clone());
        }
        Some(removed)
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn selected_id(&self) -> Option<&NoteId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref().and_then(|id| self.notes.get(id))
    }

    /// Only ids present in the store can be selected.
    pub fn select(&mut self, id: &NoteId) -> bool {
        if !self.notes.contains_key(id) {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn view(&self, query: &ViewQuery, now: DateTime<Utc>) -> NotesView<'_> {
        NotesView::new(self, query, now)
    }
}
