//! Stream walker and field extraction engine.
//!
//! One pass walks every stream kind in order, every instance of it, and
//! every schema field of that kind, producing a fresh [`ResultTree`].
//! Missing values are absences, not errors; only backend errors
//! propagate.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::MediaBackend;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::models::{Chapters, FieldValue, InfoKind, ResultTree, StreamKind, StreamRecord};
use crate::policy::NormalizationPolicy;
use crate::schema::FieldSchema;

/// Fields that restate what the tree's shape already says.
const BOOKKEEPING_FIELDS: &[&str] = &[
    "Count",
    "Status",
    "StreamCount",
    "StreamKind",
    "StreamKindID",
    "StreamKindPos",
    "StreamOrder",
    "Inform",
    "GeneralCount",
    "VideoCount",
    "AudioCount",
    "TextCount",
    "OtherCount",
    "ImageCount",
    "MenuCount",
];

const DROP_FRAME_FIELD: &str = "DurationDropFrame";
/// SMPTE drop-frame timecode rendering of `Duration`.
const DROP_FRAME_SOURCE: &str = "Duration/String4";

static CHAPTER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z-]*:)?Chapter\s*\d+$").expect("chapter pattern"));

/// Run a full extraction pass.
pub fn extract(
    backend: &dyn MediaBackend,
    schema: &FieldSchema,
    policy: &NormalizationPolicy,
    config: &SessionConfig,
) -> Result<ResultTree> {
    Extractor {
        backend,
        schema,
        policy,
        config,
    }
    .run()
}

struct Extractor<'a> {
    backend: &'a dyn MediaBackend,
    schema: &'a FieldSchema,
    policy: &'a NormalizationPolicy,
    config: &'a SessionConfig,
}

impl Extractor<'_> {
    fn run(&self) -> Result<ResultTree> {
        let mut tree = ResultTree::new();
        for kind in StreamKind::ALL {
            let count = self.backend.count(kind, None)?;
            if count > 0 {
                log::debug!("minfo: {} {} stream(s)", count, kind);
            }
            for stream in 0..count {
                if kind == StreamKind::Menu {
                    // Each menu replaces the table: the last one wins.
                    tree.set_chapters(self.scan_chapters(stream)?);
                }
                let record = self.record(kind, stream)?;
                tree.push(kind, record);
            }
        }
        Ok(tree)
    }

    /// Positional scan of a menu stream. Chapter entries are reported
    /// with the timecode as field name and the label as text.
    fn scan_chapters(&self, stream: usize) -> Result<Option<Chapters>> {
        let kind = StreamKind::Menu;
        let mut chapters = Chapters::default();
        for index in 0..self.backend.count(kind, Some(stream))? {
            let label = self.backend.get_by_index(kind, stream, index, InfoKind::Text)?;
            let label = label.trim();
            if !CHAPTER_LABEL.is_match(label) {
                continue;
            }
            let timecode = self.backend.get_by_index(kind, stream, index, InfoKind::Name)?;
            chapters.insert(label, timecode.trim());
        }
        Ok((!chapters.is_empty()).then_some(chapters))
    }

    fn record(&self, kind: StreamKind, stream: usize) -> Result<StreamRecord> {
        let mut record = StreamRecord::new();
        for entry in self.schema.fields(kind) {
            let name = entry.name.as_str();
            let value = self.resolve(kind, stream, name)?;

            if self.config.skip_filter() && is_skipped(name, &value) {
                continue;
            }

            if kind == StreamKind::Video
                && self.config.drop_frame
                && !self.config.all_fields
                && name == "Duration"
            {
                let timecode = self.backend.get(kind, stream, DROP_FRAME_SOURCE, InfoKind::Text)?;
                let timecode = timecode.trim();
                if !timecode.is_empty() {
                    record.insert(DROP_FRAME_FIELD, self.value(timecode.to_string()));
                }
            }

            record.insert(name, self.value(value));
        }
        Ok(record)
    }

    /// Raw mode returns the plain field exactly as the library reports it.
    /// Otherwise the policy variant comes first when it has a value, and
    /// the result is trimmed.
    fn resolve(&self, kind: StreamKind, stream: usize, name: &str) -> Result<String> {
        if self.config.raw {
            return self.backend.get(kind, stream, name, InfoKind::Text);
        }
        if let Some(variant) = self.policy.resolve(name) {
            let text = self
                .backend
                .get(kind, stream, &variant.field_name(name), InfoKind::Text)?;
            let text = text.trim();
            if !text.is_empty() {
                return Ok(text.to_string());
            }
        }
        let text = self.backend.get(kind, stream, name, InfoKind::Text)?;
        Ok(text.trim().to_string())
    }

    fn value(&self, text: String) -> FieldValue {
        if self.config.raw {
            FieldValue::Text(text)
        } else {
            FieldValue::normalize(text)
        }
    }
}

fn is_skipped(name: &str, value: &str) -> bool {
    value.is_empty() || is_variant_name(name) || BOOKKEEPING_FIELDS.contains(&name)
}

/// `Duration/String`, `Duration/String3`, ...
fn is_variant_name(name: &str) -> bool {
    name.rsplit_once('/')
        .map_or(false, |(_, suffix)| suffix.starts_with("String"))
}
