//! Per-session configuration.
//!
//! Set once when a session is built and read by the extraction engine.
//! Hosts pass it as JSON; missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Report plain field values: no variant substitution and no skip
    /// filter, so empty and bookkeeping fields are kept.
    pub raw: bool,
    /// Inject `DurationDropFrame` into video records.
    pub drop_frame: bool,
    /// Keep every field (skip filter off) without disabling substitution.
    pub all_fields: bool,
    /// Ask the library for its full-detail field set.
    pub complete: bool,
    pub parse_unknown_extensions: bool,
    /// Translation table text (`key;value` lines) for formatted reports.
    pub language: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            raw: false,
            drop_frame: false,
            all_fields: false,
            complete: false,
            parse_unknown_extensions: true,
            language: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether empty, variant and bookkeeping fields are dropped.
    pub fn skip_filter(&self) -> bool {
        !self.raw && !self.all_fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!(config.parse_unknown_extensions);
        assert!(config.skip_filter());
    }

    #[test]
    fn raw_and_all_fields_disable_skip_filter() {
        let raw = SessionConfig::from_json(r#"{"raw": true}"#).unwrap();
        assert!(!raw.skip_filter());
        let all = SessionConfig::from_json(r#"{"all_fields": true, "drop_frame": true}"#).unwrap();
        assert!(!all.skip_filter());
        assert!(all.drop_frame);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SessionConfig::from_json("{raw}").is_err());
    }
}
