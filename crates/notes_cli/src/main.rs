mod app;
mod cli;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::{fs, io};

use anyhow::{Context, Result};
use clap::Parser;
use config::{AppConfig, ConfigStore};
use i18n::I18n;
use note_store::ViewQuery;
use notes_remote::HttpNotesApi;
use notes_session::NotesSession;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.push(config::APP_DIR_NAME);
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("notes client failed: {err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_store = match &cli.config_dir {
        Some(dir) => ConfigStore::from_dir(dir),
        None => ConfigStore::from_default_location()?,
    };
    let config = match config_store.load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err:#}");
            AppConfig::default()
        }
    }
    .with_overrides(&cli.overrides());
    info!(
        base_url = %config.api.base_url,
        config = %config_store.path().display(),
        "starting notes client"
    );

    let api = HttpNotesApi::new(&config.api)?;
    let session = NotesSession::new(
        Arc::new(api),
        config.notes.draft(),
        ViewQuery::new(config.notes.default_filter, config.notes.default_sort),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let command = cli.command;
    let mut app = App::new(
        session,
        I18n::new(config.language),
        io::stdin().lock(),
        io::stdout(),
    );
    runtime.block_on(async {
        app.start().await?;
        match command {
            Some(command) => app.run_once(command).await,
            None => app.run_interactive().await,
        }
    })
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "notes.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,notes=debug,notes_session=debug,notes_remote=debug")
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
