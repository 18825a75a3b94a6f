//! In-memory backend with canned responses.
//!
//! Useful for tests and for hosts that want to exercise the pipeline
//! without the native library installed. Field values are stored as the
//! library would report them, variants included (`Duration/String3`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::MediaBackend;
use crate::error::Result;
use crate::models::{InfoKind, StreamKind};
use crate::options;

/// One stream: field name → text, in library order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    fields: Vec<(String, String)>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.push((name.into(), text.into()));
        self
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.as_str())
    }
}

/// One openable input.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedia {
    streams: [Vec<MemoryStream>; 7],
    report: String,
}

impl MemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(mut self, kind: StreamKind, stream: MemoryStream) -> Self {
        self.streams[kind.index()].push(stream);
        self
    }

    /// Text returned by `inform` when no template is set.
    pub fn report(mut self, report: impl Into<String>) -> Self {
        self.report = report.into();
        self
    }

    fn stream_at(&self, kind: StreamKind, stream: usize) -> Option<&MemoryStream> {
        self.streams[kind.index()].get(stream)
    }

    /// Expand `Kind;...%Field%...` template lines against every stream of
    /// that kind. Lines without a kind prefix apply to General.
    fn render(&self, template: &str) -> String {
        let mut out = String::new();
        for line in template.lines() {
            let (kind, body) = match line.split_once(';') {
                Some((head, body)) => match head.parse::<StreamKind>() {
                    Ok(kind) => (kind, body),
                    Err(_) => (StreamKind::General, line),
                },
                None => (StreamKind::General, line),
            };
            for stream in &self.streams[kind.index()] {
                out.push_str(&substitute(body, stream));
                out.push('\n');
            }
        }
        out
    }
}

fn substitute(body: &str, stream: &MemoryStream) -> String {
    let mut out = String::new();
    let mut parts = body.split('%');
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    // Odd segments are field names, even ones literal text.
    for (i, part) in parts.enumerate() {
        if i % 2 == 0 {
            out.push_str(stream.text(part).unwrap_or_default());
        } else {
            out.push_str(part);
        }
    }
    out
}

/// Canned library: a field catalog, a version string and a set of inputs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    catalog: String,
    version: String,
    files: HashMap<PathBuf, MemoryMedia>,
    options: HashMap<String, String>,
    current: Option<PathBuf>,
}

impl MemoryBackend {
    pub fn new(catalog: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            version: "MediaInfoLib - memory".into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Register an input. `open` succeeds only for registered paths.
    pub fn with_file(mut self, path: impl Into<PathBuf>, media: MemoryMedia) -> Self {
        self.files.insert(path.into(), media);
        self
    }

    /// Options set so far, as the library received them.
    pub fn options(&self) -> &HashMap<String, String> {
        &self.options
    }

    fn media(&self) -> Option<&MemoryMedia> {
        self.current.as_ref().and_then(|p| self.files.get(p))
    }

    fn stream(&self, kind: StreamKind, stream: usize) -> Option<&MemoryStream> {
        self.media().and_then(|m| m.stream_at(kind, stream))
    }
}

impl MediaBackend for MemoryBackend {
    fn open(&mut self, path: &Path) -> Result<bool> {
        if self.files.contains_key(path) {
            self.current = Some(path.to_path_buf());
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
        }
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        Ok(())
    }

    /// Catalog and version are computed outputs and `<name>_Get` reads a
    /// stored value. Any other name is a write, an empty value included,
    /// as with the native library.
    fn option(&mut self, name: &str, value: &str) -> Result<String> {
        match name {
            options::FIELD_CATALOG => Ok(self.catalog.clone()),
            options::VERSION => Ok(self.version.clone()),
            _ if name.ends_with(options::GET_SUFFIX) => {
                let setter = &name[..name.len() - options::GET_SUFFIX.len()];
                Ok(self.options.get(setter).cloned().unwrap_or_default())
            }
            _ => {
                self.options.insert(name.to_string(), value.to_string());
                Ok(String::new())
            }
        }
    }

    fn inform(&self) -> Result<String> {
        let Some(media) = self.media() else {
            return Ok(String::new());
        };
        match self.options.get(options::INFORM) {
            Some(template) if !template.is_empty() => Ok(media.render(template)),
            _ => Ok(media.report.clone()),
        }
    }

    fn count(&self, kind: StreamKind, stream: Option<usize>) -> Result<usize> {
        let Some(media) = self.media() else {
            return Ok(0);
        };
        Ok(match stream {
            None => media.streams[kind.index()].len(),
            Some(i) => media.stream_at(kind, i).map_or(0, |s| s.fields.len()),
        })
    }

    fn get(&self, kind: StreamKind, stream: usize, field: &str, info: InfoKind) -> Result<String> {
        let Some(s) = self.stream(kind, stream) else {
            return Ok(String::new());
        };
        let found = s.fields.iter().find(|(n, _)| n == field);
        Ok(match (found, info) {
            (Some((name, _)), InfoKind::Name) => name.clone(),
            (Some((_, text)), InfoKind::Text) => text.clone(),
            _ => String::new(),
        })
    }

    fn get_by_index(
        &self,
        kind: StreamKind,
        stream: usize,
        index: usize,
        info: InfoKind,
    ) -> Result<String> {
        let Some(s) = self.stream(kind, stream) else {
            return Ok(String::new());
        };
        Ok(match (s.fields.get(index), info) {
            (Some((name, _)), InfoKind::Name) => name.clone(),
            (Some((_, text)), InfoKind::Text) => text.clone(),
            _ => String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        let media = MemoryMedia::new()
            .stream(
                StreamKind::General,
                MemoryStream::new().field("Format", "MPEG-4").field("FileSize", "1024"),
            )
            .stream(StreamKind::Audio, MemoryStream::new().field("Format", "AAC"))
            .stream(StreamKind::Audio, MemoryStream::new().field("Format", "AC-3"))
            .report("General\nFormat : MPEG-4\n");
        MemoryBackend::new("General\nFormat;Container format\n").with_file("/media/a.mp4", media)
    }

    #[test]
    fn open_only_registered_paths() {
        let mut b = backend();
        assert!(!b.open(Path::new("/media/missing.mkv")).unwrap());
        assert!(b.open(Path::new("/media/a.mp4")).unwrap());
        assert_eq!(b.count(StreamKind::Audio, None).unwrap(), 2);
        assert_eq!(b.count(StreamKind::General, Some(0)).unwrap(), 2);
        b.close().unwrap();
        assert_eq!(b.count(StreamKind::Audio, None).unwrap(), 0);
    }

    #[test]
    fn get_by_name_and_index() {
        let mut b = backend();
        b.open(Path::new("/media/a.mp4")).unwrap();
        assert_eq!(b.get(StreamKind::Audio, 1, "Format", InfoKind::Text).unwrap(), "AC-3");
        assert_eq!(b.get(StreamKind::Audio, 5, "Format", InfoKind::Text).unwrap(), "");
        assert_eq!(b.get_by_index(StreamKind::General, 0, 1, InfoKind::Name).unwrap(), "FileSize");
        assert_eq!(b.get_by_index(StreamKind::General, 0, 1, InfoKind::Text).unwrap(), "1024");
    }

    #[test]
    fn inform_uses_template_when_set() {
        let mut b = backend();
        b.open(Path::new("/media/a.mp4")).unwrap();
        assert_eq!(b.inform().unwrap(), "General\nFormat : MPEG-4\n");

        b.option(options::INFORM, "Audio;codec=%Format%").unwrap();
        assert_eq!(b.inform().unwrap(), "codec=AAC\ncodec=AC-3\n");
    }

    #[test]
    fn option_channel_stores_and_reads() {
        let mut b = backend();
        assert_eq!(b.option("Complete", "1").unwrap(), "");
        assert_eq!(b.option("Complete_Get", "").unwrap(), "1");
        assert_eq!(b.option(options::VERSION, "").unwrap(), "MediaInfoLib - memory");
    }

    #[test]
    fn empty_value_resets_setter() {
        let mut b = backend();
        b.open(Path::new("/media/a.mp4")).unwrap();
        b.option(options::INFORM, "Audio;%Format%").unwrap();
        assert_eq!(b.inform().unwrap(), "AAC\nAC-3\n");

        b.option(options::INFORM, "").unwrap();
        assert_eq!(b.option("Inform_Get", "").unwrap(), "");
        assert_eq!(b.inform().unwrap(), "General\nFormat : MPEG-4\n");
    }
}
