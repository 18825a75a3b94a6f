//! Field schema: the library's self-described field catalog.
//!
//! Loaded once per session from the `Info_Parameters_CSV` option and
//! read-only afterwards. The catalog is a flat listing where a line with
//! a single token opens a stream kind section and `name;description`
//! lines add fields to it:
//!
//! ```text
//! General
//! Count;Count of objects available in this stream
//! Format;Format used
//! Video
//! Width;Width (aperture size if present) in pixel
//! ```

use crate::backend::MediaBackend;
use crate::error::Result;
use crate::models::StreamKind;
use crate::options;

/// Descriptions containing this marker (any case) are dropped.
const DEPRECATED_MARKER: &str = "deprecated";

/// One catalog field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub description: Option<String>,
}

/// Stream kind → ordered field entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    sections: [Vec<FieldEntry>; 7],
}

impl FieldSchema {
    /// Query the catalog once and parse it.
    pub fn load(backend: &mut dyn MediaBackend) -> Result<Self> {
        let catalog = backend.option(options::FIELD_CATALOG, "")?;
        let schema = Self::parse(&catalog);
        log::debug!(
            "minfo: schema loaded ({} fields)",
            schema.sections.iter().map(Vec::len).sum::<usize>()
        );
        Ok(schema)
    }

    /// Parse catalog text. Never fails: unusable lines are skipped.
    pub fn parse(catalog: &str) -> Self {
        let mut schema = FieldSchema::default();
        // None before the first header, or inside an unknown section.
        let mut current: Option<(StreamKind, Vec<FieldEntry>)> = None;
        let mut in_section = false;

        for line in catalog.lines() {
            let tokens: Vec<&str> = line.split(';').map(str::trim).collect();
            let non_empty = tokens.iter().filter(|t| !t.is_empty()).count();
            if non_empty == 0 {
                continue;
            }

            if tokens.len() == 1 {
                if let Some((kind, entries)) = current.take() {
                    schema.commit(kind, entries);
                }
                in_section = true;
                match tokens[0].parse::<StreamKind>() {
                    Ok(kind) => current = Some((kind, Vec::new())),
                    Err(_) => log::debug!("minfo: skipping catalog section {:?}", tokens[0]),
                }
                continue;
            }

            let (name, description) = (tokens[0], tokens[1]);
            if name.is_empty() {
                continue;
            }
            if description.to_ascii_lowercase().contains(DEPRECATED_MARKER) {
                continue;
            }
            match current.as_mut() {
                Some((_, entries)) => push_entry(entries, name, description),
                None if !in_section => log::debug!("minfo: field {:?} before any section", name),
                None => {}
            }
        }

        if let Some((kind, entries)) = current.take() {
            schema.commit(kind, entries);
        }
        schema
    }

    fn commit(&mut self, kind: StreamKind, entries: Vec<FieldEntry>) {
        let section = &mut self.sections[kind.index()];
        for entry in entries {
            push_entry(section, &entry.name, entry.description.as_deref().unwrap_or(""));
        }
    }

    /// Fields of one kind, in catalog order.
    pub fn fields(&self, kind: StreamKind) -> &[FieldEntry] {
        &self.sections[kind.index()]
    }

    pub fn contains(&self, kind: StreamKind, name: &str) -> bool {
        self.fields(kind).iter().any(|e| e.name == name)
    }

    pub fn description(&self, kind: StreamKind, name: &str) -> Option<&str> {
        self.fields(kind)
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.description.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Vec::is_empty)
    }
}

/// A repeated name keeps its first position and takes the new description.
fn push_entry(entries: &mut Vec<FieldEntry>, name: &str, description: &str) {
    let description = (!description.is_empty()).then(|| description.to_string());
    match entries.iter_mut().find(|e| e.name == name) {
        Some(existing) => existing.description = description,
        None => entries.push(FieldEntry {
            name: name.to_string(),
            description,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    const CATALOG: &str = "General\r\n\
        Count;Count of objects available in this stream\r\n\
        Format;Format used\r\n\
        Format_Settings_SBR;Deprecated, do not use in new projects\r\n\
        Duration;Play time of the stream in ms\r\n\
        Duration/String3;Play time in format : HH:MM:SS.MMM\r\n\
        \r\n\
        Video\r\n\
        Width;Width in pixel\r\n\
        Codec;DEPRECATED\r\n\
        Height;\r\n\
        Menu\r\n\
        Chapters_Pos_Begin;Used by third-party developers\r\n";

    fn names(schema: &FieldSchema, kind: StreamKind) -> Vec<&str> {
        schema.fields(kind).iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn parses_sections_in_order() {
        let schema = FieldSchema::parse(CATALOG);
        assert_eq!(
            names(&schema, StreamKind::General),
            vec!["Count", "Format", "Duration", "Duration/String3"]
        );
        assert_eq!(names(&schema, StreamKind::Video), vec!["Width", "Height"]);
        assert!(schema.fields(StreamKind::Audio).is_empty());
    }

    #[test]
    fn last_section_is_committed_without_sentinel() {
        let schema = FieldSchema::parse(CATALOG);
        assert_eq!(names(&schema, StreamKind::Menu), vec!["Chapters_Pos_Begin"]);
    }

    #[test]
    fn deprecated_entries_are_dropped() {
        let schema = FieldSchema::parse(CATALOG);
        assert!(!schema.contains(StreamKind::General, "Format_Settings_SBR"));
        assert!(!schema.contains(StreamKind::Video, "Codec"));
    }

    #[test]
    fn descriptions_are_optional() {
        let schema = FieldSchema::parse(CATALOG);
        assert_eq!(schema.description(StreamKind::General, "Format"), Some("Format used"));
        assert_eq!(schema.description(StreamKind::Video, "Height"), None);
    }

    #[test]
    fn unknown_sections_and_orphans_are_skipped() {
        let schema = FieldSchema::parse("Orphan;before header\nBogus\nX;y\nAudio\nChannel(s);Channels\n");
        assert!(schema.fields(StreamKind::General).is_empty());
        assert_eq!(names(&schema, StreamKind::Audio), vec!["Channel(s)"]);
    }

    #[test]
    fn repeated_section_headers_extend_the_section() {
        let schema = FieldSchema::parse("Audio\nFormat;a\nVideo\nWidth;w\nAudio\nChannels;c\nFormat;b\n");
        assert_eq!(names(&schema, StreamKind::Audio), vec!["Format", "Channels"]);
        assert_eq!(schema.description(StreamKind::Audio, "Format"), Some("b"));
    }

    #[test]
    fn load_queries_the_catalog() {
        let mut backend = MemoryBackend::new(CATALOG);
        let schema = FieldSchema::load(&mut backend).unwrap();
        assert_eq!(schema, FieldSchema::parse(CATALOG));
        assert!(!schema.is_empty());
    }
}
