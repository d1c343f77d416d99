use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::ConfigOverrides;
use note_types::{NoteFilter, SortKey, UiLanguage};

#[derive(Debug, Parser)]
#[command(
    name = "notes",
    author,
    version,
    about = "Browse and edit notes kept on a remote notes server",
    long_about = "Browse and edit notes kept on a remote notes server.\n\nRun without a command \
                  for an interactive session reading commands from stdin."
)]
pub struct Cli {
    #[arg(long, env = "NOTES_CONFIG_DIR", help = "Directory holding config.json")]
    pub config_dir: Option<PathBuf>,

    #[arg(long, env = "NOTES_BASE_URL", help = "Server address, e.g. http://localhost:8080")]
    pub base_url: Option<String>,

    #[arg(long, help = "Interface language (en_us, zh_cn)")]
    pub language: Option<UiLanguage>,

    #[command(subcommand)]
    pub command: Option<NotesCommand>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            language: self.language,
        }
    }
}

/// One line typed at the interactive prompt.
#[derive(Debug, Parser)]
#[command(name = "notes", no_binary_name = true)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: NotesCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum NotesCommand {
    #[command(about = "Show the filtered note list")]
    List,

    #[command(about = "Show the selected note")]
    Show,

    #[command(about = "Select a note by its position in the list")]
    Select {
        #[arg(help = "Position as printed by `list`, starting at 1")]
        position: usize,
    },

    #[command(about = "Select a note by id")]
    Open { id: String },

    #[command(about = "Create a note and select it")]
    New,

    #[command(about = "Delete the selected note")]
    Delete {
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Pin or unpin the selected note")]
    Pin,

    #[command(about = "Change the selected note's title")]
    Rename {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },

    #[command(about = "Replace the selected note's content")]
    Write {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        content: Vec<String>,
    },

    #[command(about = "Search titles and content; no text clears the search")]
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    #[command(about = "Filter the list (all, pinned, recent)")]
    Filter { filter: NoteFilter },

    #[command(about = "Order the list (newest, oldest, title)")]
    Sort { sort: SortKey },

    #[command(about = "Reload notes from the server")]
    Refresh,

    #[command(about = "Clear the current error")]
    Dismiss,

    #[command(about = "Check that the server is reachable")]
    Health,

    #[command(about = "Leave the interactive session", alias = "exit")]
    Quit,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse_line(line: &str) -> Result<NotesCommand, clap::Error> {
        ReplLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        ReplLine::command().debug_assert();
    }

    #[test]
    fn parses_prompt_lines() {
        assert_eq!(
            parse_line("rename Weekly plan").expect("rename"),
            NotesCommand::Rename {
                title: vec!["Weekly".to_string(), "plan".to_string()]
            }
        );
        assert_eq!(
            parse_line("filter recently-edited").expect("filter"),
            NotesCommand::Filter {
                filter: NoteFilter::Recent
            }
        );
        assert_eq!(
            parse_line("delete -y").expect("delete"),
            NotesCommand::Delete { yes: true }
        );
        assert_eq!(
            parse_line("search").expect("search"),
            NotesCommand::Search { text: Vec::new() }
        );
        assert_eq!(parse_line("exit").expect("quit"), NotesCommand::Quit);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_line("sort sideways").is_err());
        assert!(parse_line("select two").is_err());
        assert!(parse_line("rename").is_err());
    }

    #[test]
    fn global_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "notes",
            "--base-url",
            "http://127.0.0.1:9000",
            "--language",
            "zh-CN",
            "list",
        ])
        .expect("parse");
        let overrides = cli.overrides();
        assert_eq!(overrides.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(overrides.language, Some(UiLanguage::ZhCn));
        assert_eq!(cli.command, Some(NotesCommand::List));
    }
}
