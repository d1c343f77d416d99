use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use note_types::{NoteDraft, NoteFilter, RemoteConfig, SortKey, UiLanguage};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const APP_DIR_NAME: &str = "notes";

/// Defaults applied to new notes and to the initial view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesDefaults {
    #[serde(default = "default_new_note_title")]
    pub new_note_title: String,
    #[serde(default)]
    pub new_note_content: String,
    #[serde(default)]
    pub default_filter: NoteFilter,
    #[serde(default)]
    pub default_sort: SortKey,
}

fn default_new_note_title() -> String {
    "New note".to_string()
}

impl Default for NotesDefaults {
    fn default() -> Self {
        Self {
            new_note_title: default_new_note_title(),
            new_note_content: String::new(),
            default_filter: NoteFilter::default(),
            default_sort: SortKey::default(),
        }
    }
}

impl NotesDefaults {
    pub fn draft(&self) -> NoteDraft {
        NoteDraft::new(self.new_note_title.clone(), self.new_note_content.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub language: UiLanguage,
    #[serde(default)]
    pub api: RemoteConfig,
    #[serde(default)]
    pub notes: NotesDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            language: UiLanguage::EnUs,
            api: RemoteConfig::default(),
            notes: NotesDefaults::default(),
        }
    }
}

/// Per-run overrides from the command line. Applied after loading and never
/// written back.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub language: Option<UiLanguage>,
}

impl AppConfig {
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(base_url) = &overrides.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(language) = overrides.language {
            self.language = language;
        }
        self
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push(APP_DIR_NAME);
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        if self.migrate(&mut config) {
            self.save(&config)?;
        }
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) -> bool {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return false;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );
        config.schema_version = CURRENT_SCHEMA_VERSION;
        true
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.notes.draft(), NoteDraft::new("New note", ""));
        assert!(store.path().exists());
    }

    #[test]
    fn reads_back_saved_settings() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let mut config = AppConfig::default();
        config.language = UiLanguage::ZhCn;
        config.api.session_cookie = Some("JSESSIONID=abc".to_string());
        config.notes.default_sort = SortKey::Title;
        store.save(&config).expect("save");

        assert_eq!(store.load_or_init().expect("reload"), config);
    }

    #[test]
    fn upgrades_unversioned_file() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"language":"zh_cn","api":{"base_url":"http://notes.internal:9000"}}"#,
        )
        .expect("write unversioned config");

        let config = store.load_or_init().expect("migrate");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.api.base_url, "http://notes.internal:9000");
        assert_eq!(config.language, UiLanguage::ZhCn);

        let rewritten = fs::read_to_string(store.path()).expect("read rewritten");
        assert!(rewritten.contains("\"schema_version\": 1"));
    }

    #[test]
    fn overrides_do_not_touch_the_file() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");

        let effective = config.with_overrides(&ConfigOverrides {
            base_url: Some("http://127.0.0.1:1234".to_string()),
            language: Some(UiLanguage::ZhCn),
        });
        assert_eq!(effective.api.base_url, "http://127.0.0.1:1234");
        assert_eq!(effective.language, UiLanguage::ZhCn);
        assert_eq!(
            store.load_or_init().expect("reload").api.base_url,
            "http://localhost:8080"
        );
    }
}
