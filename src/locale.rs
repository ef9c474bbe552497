//! Language store: the active locale, its persistence, and the bilingual
//! text projection.
//!
//! The site is authored in both Arabic and English. Any element carrying
//! `data-ar` / `data-en` attributes (including `<option>` elements inside
//! selects) is a projection target: switching locale rewrites its text from
//! the matching attribute, synchronously. The document root gets `lang` and
//! `dir` (`rtl` for Arabic, `ltr` for English).
//!
//! The locale survives restarts through a [`Storage`] backend. Reads that
//! fail or return something other than `ar`/`en` fall back to the configured
//! default; writes that fail are logged and otherwise ignored.

use crate::config::LocaleConfig;
use crate::dom::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("unsupported locale '{0}' (expected 'ar' or 'en')")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ar,
    En,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::En => "en",
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Locale::Ar => TextDirection::Rtl,
            Locale::En => TextDirection::Ltr,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Locale::Ar => Locale::En,
            Locale::En => Locale::Ar,
        }
    }

    pub const ALL: [Locale; 2] = [Locale::Ar, Locale::En];
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ar" => Ok(Locale::Ar),
            "en" => Ok(Locale::En),
            other => Err(LocaleError::Unsupported(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Rtl,
    Ltr,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Rtl => "rtl",
            TextDirection::Ltr => "ltr",
        }
    }
}

/// A pair of translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bilingual {
    pub ar: &'static str,
    pub en: &'static str,
}

impl Bilingual {
    pub const fn new(ar: &'static str, en: &'static str) -> Self {
        Self { ar, en }
    }

    pub fn pick(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ar => self.ar,
            Locale::En => self.en,
        }
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Durable client-side key-value store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object file.
///
/// A missing file reads as empty. Non-string values read as absent.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, StorageError> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .read_map()?
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

pub struct LocaleStore {
    current: Locale,
    key: String,
    storage: Box<dyn Storage>,
}

impl LocaleStore {
    /// Read the persisted locale, falling back to `config.default`.
    pub fn load(storage: Box<dyn Storage>, config: &LocaleConfig) -> Self {
        let current = match storage.get(&config.storage_key) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                warn!(%e, "ignoring stored locale");
                config.default
            }),
            Ok(None) => config.default,
            Err(e) => {
                warn!(%e, "locale storage unreadable, using default");
                config.default
            }
        };
        Self {
            current,
            key: config.storage_key.clone(),
            storage,
        }
    }

    pub fn locale(&self) -> Locale {
        self.current
    }

    /// Make `locale` active: persist it, set `lang`/`dir` on the document
    /// root and re-project every bilingual element.
    pub fn set_locale(&mut self, locale: Locale, doc: &mut Document) {
        self.current = locale;
        if let Err(e) = self.storage.set(&self.key, locale.code()) {
            warn!(%e, %locale, "failed to persist locale");
        }
        apply_locale(doc, locale);
        debug!(%locale, "locale applied");
    }

    /// Parse and apply a locale code.
    pub fn set_locale_str(&mut self, code: &str, doc: &mut Document) -> Result<(), LocaleError> {
        let locale = code.parse()?;
        self.set_locale(locale, doc);
        Ok(())
    }

    pub fn toggle_locale(&mut self, doc: &mut Document) -> Locale {
        let next = self.current.toggled();
        self.set_locale(next, doc);
        next
    }
}

/// Write `lang`/`dir` and project bilingual text for `locale`.
pub fn apply_locale(doc: &mut Document, locale: Locale) {
    let root = doc.root();
    doc.element_mut(root)
        .set_attr("lang", locale.code())
        .set_attr("dir", locale.direction().as_str());
    project_text(doc, locale);
}

/// Rewrite the text of every `[data-ar]` / `[data-en]` element.
///
/// An element lacking the attribute for `locale` (or carrying an empty one)
/// keeps its current text. Select options are ordinary elements here, so
/// one pass covers them.
pub fn project_text(doc: &mut Document, locale: Locale) {
    let attr = format!("data-{}", locale.code());
    for node in doc.query_all("[data-ar], [data-en]") {
        let el = doc.element_mut(node);
        if let Some(text) = el.attr(&attr).filter(|t| !t.is_empty()).map(str::to_string) {
            el.set_text(text);
        }
    }
}
