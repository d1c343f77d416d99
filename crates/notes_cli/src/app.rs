use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Parser;
use i18n::I18n;
use note_types::{Note, NoteId, NoteUpdate};
use notes_session::{CommandOutcome, NotesSession};
use tracing::debug;

use crate::cli::{NotesCommand, ReplLine};
use crate::render::{self, render_detail, render_list};

enum Flow {
    Continue,
    Quit,
}

/// Terminal front-end over a [`NotesSession`]. Commands come either from the
/// process arguments or from `input`, one per line.
pub struct App<R, W> {
    session: NotesSession,
    i18n: I18n,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(session: NotesSession, i18n: I18n, input: R, output: W) -> Self {
        Self {
            session,
            i18n,
            input,
            output,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.say("status.loading")?;
        let outcome = self.session.load().await;
        self.report(outcome)
    }

    pub async fn run_once(&mut self, command: NotesCommand) -> Result<()> {
        self.execute(command).await?;
        self.session.close();
        Ok(())
    }

    pub async fn run_interactive(&mut self) -> Result<()> {
        self.print_list()?;
        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }

            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            match ReplLine::try_parse_from(words) {
                Ok(parsed) => {
                    if let Flow::Quit = self.execute(parsed.command).await? {
                        break;
                    }
                }
                Err(err) => write!(self.output, "{}", err.render())?,
            }
        }
        self.session.close();
        Ok(())
    }

    async fn execute(&mut self, command: NotesCommand) -> Result<Flow> {
        debug!(?command, "running command");
        match command {
            NotesCommand::List => self.print_list()?,
            NotesCommand::Show => self.print_detail()?,
            NotesCommand::Select { position } => {
                if position > 0 && self.session.select_index(position - 1) {
                    self.print_detail()?;
                } else {
                    self.say("select.out_of_range")?;
                }
            }
            NotesCommand::Open { id } => {
                if self.session.select(&NoteId::from(id)) {
                    self.print_detail()?;
                } else {
                    self.say("open.not_found")?;
                }
            }
            NotesCommand::New => {
                let outcome = self.session.create_note().await;
                self.report(outcome)?;
                self.print_list()?;
            }
            NotesCommand::Delete { yes } => {
                let Some(note) = self.session.selected() else {
                    self.say("status.skipped")?;
                    return Ok(Flow::Continue);
                };
                if !yes && !self.confirm_delete(&note)? {
                    self.say("confirm.cancelled")?;
                    return Ok(Flow::Continue);
                }
                let outcome = self.session.delete_active().await;
                self.report(outcome)?;
                self.print_list()?;
            }
            NotesCommand::Pin => {
                let Some(note) = self.session.selected() else {
                    self.say("status.skipped")?;
                    return Ok(Flow::Continue);
                };
                let outcome = self.session.toggle_pin(&note.id).await;
                self.report(outcome)?;
                self.print_list()?;
            }
            NotesCommand::Rename { title } => {
                self.edit_selected(|update| update.title = title.join(" "))
                    .await?;
            }
            NotesCommand::Write { content } => {
                self.edit_selected(|update| update.content = content.join(" "))
                    .await?;
            }
            NotesCommand::Search { text } => {
                self.session.set_search(text.join(" "));
                self.print_list()?;
            }
            NotesCommand::Filter { filter } => {
                self.session.set_filter(filter);
                self.print_list()?;
            }
            NotesCommand::Sort { sort } => {
                self.session.set_sort(sort);
                self.print_list()?;
            }
            NotesCommand::Refresh => {
                let outcome = self.session.load().await;
                self.report(outcome)?;
                self.print_list()?;
            }
            NotesCommand::Dismiss => self.session.dismiss_error(),
            NotesCommand::Health => match self.session.check_health().await {
                Some(status) => {
                    let line = self.i18n.format("health.ok", &[("status", &status)]);
                    writeln!(self.output, "{line}")?;
                }
                None => self.say("health.down")?,
            },
            NotesCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn edit_selected(&mut self, apply: impl FnOnce(&mut NoteUpdate)) -> Result<()> {
        let Some(note) = self.session.selected() else {
            return self.say("status.skipped");
        };
        let mut update = NoteUpdate::from_note(&note);
        apply(&mut update);
        let outcome = self
            .session
            .update_note(&note.id, update)
            .await
            .unwrap_or(CommandOutcome::Failed);
        self.report(outcome)?;
        self.print_detail()
    }

    fn confirm_delete(&mut self, note: &Note) -> Result<bool> {
        let title = render::title(note, &self.i18n).to_owned();
        let prompt = self.i18n.format("confirm.delete", &[("title", &title)]);
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    fn report(&mut self, outcome: CommandOutcome) -> Result<()> {
        match outcome {
            CommandOutcome::Applied => Ok(()),
            CommandOutcome::Skipped if self.session.is_busy() => self.say("status.busy"),
            CommandOutcome::Skipped => self.say("status.skipped"),
            CommandOutcome::Discarded => self.say("status.discarded"),
            CommandOutcome::Failed => self.print_error(),
        }
    }

    fn print_error(&mut self) -> Result<()> {
        if let Some(err) = self.session.error() {
            writeln!(
                self.output,
                "{}: {err} ({})",
                self.i18n.t("error.prefix"),
                self.i18n.t("error.dismiss_hint")
            )?;
        }
        Ok(())
    }

    fn print_list(&mut self) -> Result<()> {
        let query = self.session.query();
        let total = self.session.note_count();
        let text = self
            .session
            .with_view(|view| render_list(view, &query, total, &self.i18n));
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn print_detail(&mut self) -> Result<()> {
        let note = self.session.selected();
        let text = render_detail(note.as_ref(), &self.i18n);
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn say(&mut self, key: &str) -> Result<()> {
        writeln!(self.output, "{}", self.i18n.t(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use note_store::ViewQuery;
    use note_types::{NoteDraft, RemoteConfig, UiLanguage};
    use notes_remote::HttpNotesApi;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn server_with_notes() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "title": "Alpha", "content": "first", "pinned": false,
                  "createdAt": "2025-01-01T00:00:00", "updatedAt": "2025-01-03T00:00:00" },
                { "id": 2, "title": "Beta", "content": "second", "pinned": false,
                  "createdAt": "2025-01-01T00:00:00", "updatedAt": "2025-01-02T00:00:00" }
            ])))
            .mount(&server)
            .await;
        server
    }

    fn app_for(server: &MockServer, input: &str) -> (App<Cursor<Vec<u8>>, Vec<u8>>, NotesSession) {
        let api = HttpNotesApi::new(&RemoteConfig {
            base_url: server.uri(),
            ..RemoteConfig::default()
        })
        .expect("client");
        let session = NotesSession::new(
            Arc::new(api),
            NoteDraft::new("New note", ""),
            ViewQuery::default(),
        );
        let app = App::new(
            session.clone(),
            I18n::new(UiLanguage::EnUs),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        );
        (app, session)
    }

    fn printed(app: &App<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(&app.output).into_owned()
    }

    #[tokio::test]
    async fn rename_sends_full_payload_for_selected_note() {
        let server = server_with_notes().await;
        Mock::given(method("PUT"))
            .and(path("/api/notes/1"))
            .and(body_json(json!({
                "title": "Shopping list", "content": "first", "pinned": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "title": "Shopping list", "content": "first", "pinned": false,
                "createdAt": "2025-01-01T00:00:00", "updatedAt": "2025-01-05T00:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (mut app, session) = app_for(&server, "");
        app.start().await.expect("start");
        app.run_once(NotesCommand::Rename {
            title: vec!["Shopping".to_string(), "list".to_string()],
        })
        .await
        .expect("rename");

        assert!(printed(&app).contains("Shopping list  #1"));
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn delete_asks_before_removing() {
        let server = server_with_notes().await;
        Mock::given(method("DELETE"))
            .and(path("/api/notes/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (mut app, session) = app_for(&server, "delete\nn\ndelete\ny\nquit\n");
        app.start().await.expect("start");
        app.run_interactive().await.expect("interactive");

        let output = printed(&app);
        assert!(output.contains("Delete \"Alpha\"? [y/N] "));
        assert!(output.contains("Delete cancelled."));
        assert_eq!(session.note_count(), 1);
        assert_eq!(
            session.selected().map(|note| note.title),
            Some("Beta".to_string())
        );
    }

    #[tokio::test]
    async fn bad_lines_do_not_end_the_session() {
        let server = server_with_notes().await;
        let (mut app, _session) = app_for(&server, "frobnicate\n\nfilter pinned\nquit\n");
        app.start().await.expect("start");
        app.run_interactive().await.expect("interactive");

        let output = printed(&app);
        assert!(output.contains("frobnicate"));
        assert!(output.contains("No notes match the current search or filter."));
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_list_stays_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
            .mount(&server)
            .await;

        let (mut app, session) = app_for(&server, "");
        app.start().await.expect("start");
        app.run_once(NotesCommand::List).await.expect("list");

        let output = printed(&app);
        assert!(output.contains(
            "Error: failed to load notes: server responded with HTTP 500: database offline"
        ));
        assert!(output.contains("No notes yet."));
        assert_eq!(session.note_count(), 0);
    }
}
