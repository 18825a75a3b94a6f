//! Translation tables for formatted reports.
//!
//! A table is plain text: one `key;value` pair per line, `\n` or `\r\n`
//! terminated. It only affects the library's report text, never the
//! result tree.
//!
//! The process-wide default is read when a session is built; the last
//! setter wins for sessions built afterwards, existing sessions keep
//! whatever they were given.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};

static DEFAULT_LANGUAGE: RwLock<Option<Arc<LanguageTable>>> = parking_lot::const_rwlock(None);

/// Ordered translation pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTable {
    entries: Vec<(String, String)>,
}

impl LanguageTable {
    /// Parse table text. Blank lines are ignored; a non-blank line
    /// without a `;` separator is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line.split_once(';').ok_or_else(|| {
                Error::InvalidInput(format!("language line {}: missing ';' separator", number + 1))
            })?;
            entries.push((key.to_string(), value.to_string()));
        }
        Ok(Self { entries })
    }

    /// Read and parse a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value for the library's `Language` option.
    pub fn to_option_value(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push(';');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// Replace the process-wide default table.
pub fn set_default_language(table: Option<LanguageTable>) {
    *DEFAULT_LANGUAGE.write() = table.map(Arc::new);
}

/// Current process-wide default table, if any.
pub fn default_language() -> Option<Arc<LanguageTable>> {
    DEFAULT_LANGUAGE.read().clone()
}
