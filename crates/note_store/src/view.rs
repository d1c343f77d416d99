use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use note_types::{Note, NoteFilter, NoteId, SortKey};

use crate::NoteStore;

pub const RECENT_WINDOW_HOURS: i64 = 24;

/// Inputs of the derived view besides the store itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub filter: NoteFilter,
    pub sort: SortKey,
}

impl ViewQuery {
    pub fn new(filter: NoteFilter, sort: SortKey) -> Self {
        Self {
            search: String::new(),
            filter,
            sort,
        }
    }
}

/// Filters, searches and sorts `notes`. Pinned notes always come first; the
/// sort is stable within each partition.
pub fn derive_view<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    query: &ViewQuery,
    now: DateTime<Utc>,
) -> Vec<&'a Note> {
    let folded_query = query.search.to_lowercase();
    let recent_cutoff = now - Duration::hours(RECENT_WINDOW_HOURS);

    let mut view: Vec<&Note> = notes
        .into_iter()
        .filter(|note| match query.filter {
            NoteFilter::All => true,
            NoteFilter::Pinned => note.pinned,
            NoteFilter::Recent => note.updated_at >= recent_cutoff,
        })
        .filter(|note| note.matches(&folded_query))
        .collect();
    view.sort_by(|a, b| compare(a, b, query.sort));
    view
}

fn compare(a: &Note, b: &Note, sort: SortKey) -> Ordering {
    b.pinned.cmp(&a.pinned).then_with(|| match sort {
        SortKey::Newest => b.updated_at.cmp(&a.updated_at),
        SortKey::Oldest => a.created_at.cmp(&b.created_at),
        SortKey::Title => a.title.cmp(&b.title),
    })
}

/// Position of the selected note in `view`. A selection that is filtered out
/// falls back to the first entry; an empty view has no selection.
pub fn resolve_selection(view: &[&Note], selected: Option<&NoteId>) -> Option<usize> {
    if view.is_empty() {
        return None;
    }
    selected
        .and_then(|id| view.iter().position(|note| &note.id == id))
        .or(Some(0))
}

/// Borrowed projection of a [`NoteStore`]. It holds references only and
/// cannot be used to change the store.
#[derive(Debug, Clone)]
pub struct NotesView<'a> {
    notes: Vec<&'a Note>,
    selected_index: Option<usize>,
}

impl<'a> NotesView<'a> {
    pub fn new(store: &'a NoteStore, query: &ViewQuery, now: DateTime<Utc>) -> Self {
        let notes = derive_view(store.iter(), query, now);
        let selected_index = resolve_selection(&notes, store.selected_id());
        Self {
            notes,
            selected_index,
        }
    }

    pub fn notes(&self) -> &[&'a Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Note> {
        self.notes.get(index).copied()
    }

    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&'a Note> {
        self.selected_index.and_then(|index| self.get(index))
    }
}
