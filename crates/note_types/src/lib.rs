pub mod note;
pub mod query;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use note::{
    DEFAULT_TITLE, Note, NoteDraft, NoteId, NotePatch, NoteRecord, NoteUpdate, parse_timestamp,
};
pub use query::{NoteFilter, ParseQueryError, SortKey};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UiLanguage {
    ZhCn,
    #[default]
    EnUs,
}

impl fmt::Display for UiLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UiLanguage::ZhCn => "zh_cn",
            UiLanguage::EnUs => "en_us",
        })
    }
}

impl FromStr for UiLanguage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "zh_cn" | "zh" => Ok(UiLanguage::ZhCn),
            "en_us" | "en" => Ok(UiLanguage::EnUs),
            other => Err(format!("unsupported language `{other}`")),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Where the notes resource lives and which credentials to pass along. The
/// cookie and headers are forwarded verbatim on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(default)]
    pub extra_headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            session_cookie: None,
            extra_headers: Vec::new(),
            timeout_ms: None,
        }
    }
}

/// Failure talking to the remote notes resource.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("server responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The remote collection resource at `/api/notes`.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, ApiError>;

    async fn create_note(&self, draft: &NoteDraft) -> Result<NoteRecord, ApiError>;

    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<NoteRecord, ApiError>;

    /// Succeeds on any 2xx, including 204 No Content.
    async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError>;

    async fn health(&self) -> Result<String, ApiError>;
}
