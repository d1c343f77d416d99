use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseQueryError {
    #[error("unknown filter `{0}` (expected all, pinned or recent)")]
    Filter(String),
    #[error("unknown sort key `{0}` (expected newest, oldest or title)")]
    Sort(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteFilter {
    #[default]
    All,
    Pinned,
    /// Edited within the last 24 hours.
    Recent,
}

impl NoteFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteFilter::All => "all",
            NoteFilter::Pinned => "pinned",
            NoteFilter::Recent => "recent",
        }
    }
}

impl fmt::Display for NoteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteFilter {
    type Err = ParseQueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(NoteFilter::All),
            "pinned" => Ok(NoteFilter::Pinned),
            "recent" | "recently-edited" => Ok(NoteFilter::Recent),
            _ => Err(ParseQueryError::Filter(value.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// `updatedAt` descending.
    #[default]
    Newest,
    /// `createdAt` ascending.
    Oldest,
    /// Case-sensitive lexicographic order of the title.
    Title,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Title => "title",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseQueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "title" => Ok(SortKey::Title),
            _ => Err(ParseQueryError::Sort(value.to_owned())),
        }
    }
}
