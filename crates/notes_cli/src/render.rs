use i18n::I18n;
use note_store::{NotesView, ViewQuery};
use note_types::Note;

pub const SNIPPET_CHARS: usize = 120;

/// Title as shown to the user; blank titles read as the localized "Untitled".
pub fn title<'a>(note: &'a Note, i18n: &'a I18n) -> &'a str {
    if note.title.trim().is_empty() {
        i18n.t("note.untitled")
    } else {
        &note.title
    }
}

/// First characters of the content on a single line.
pub fn snippet(content: &str) -> String {
    let flat: String = content
        .chars()
        .take(SNIPPET_CHARS)
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .collect();
    flat.trim().to_owned()
}

pub fn render_list(view: &NotesView<'_>, query: &ViewQuery, total: usize, i18n: &I18n) -> String {
    let mut lines = vec![format!(
        "{} | {}: {} | {}: {}",
        i18n.t("app.title"),
        i18n.t("filter.label"),
        i18n.filter_label(query.filter),
        i18n.t("sort.label"),
        i18n.sort_label(query.sort),
    )];
    if !query.search.is_empty() {
        lines.push(format!("{}: {}", i18n.t("search.label"), query.search));
    }

    if view.is_empty() {
        let key = if total == 0 { "list.empty" } else { "list.no_match" };
        lines.push(i18n.t(key).to_owned());
        return lines.join("\n");
    }

    let selected = view.selected_index();
    for (index, note) in view.notes().iter().enumerate() {
        let cursor = if selected == Some(index) { '>' } else { ' ' };
        let pin = if note.pinned { '*' } else { ' ' };
        lines.push(format!(
            "{cursor}{:>3}. {pin} {}  {}  #{}",
            index + 1,
            title(note, i18n),
            snippet(&note.content),
            note.id
        ));
    }
    lines.push(i18n.format(
        "list.summary",
        &[
            ("shown", &view.len().to_string()),
            ("total", &total.to_string()),
        ],
    ));
    lines.join("\n")
}

pub fn render_detail(note: Option<&Note>, i18n: &I18n) -> String {
    let Some(note) = note else {
        return i18n.t("detail.empty").to_owned();
    };

    let mut heading = format!("{}  #{}", title(note, i18n), note.id);
    if note.pinned {
        heading.push_str(&format!("  [{}]", i18n.t("detail.pinned")));
    }
    format!(
        "{heading}\n{}: {}\n\n{}",
        i18n.t("detail.updated"),
        note.updated_at.format("%Y-%m-%d %H:%M"),
        note.content
    )
}
