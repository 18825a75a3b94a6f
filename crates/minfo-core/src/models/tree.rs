//! Result tree: the normalized output of one extraction pass.
//!
//! Records keep field insertion order (schema order), so they are
//! backed by vectors rather than hash maps and serialize as JSON objects
//! in that order.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::stream::StreamKind;
use crate::format::drop_trailing_zeros;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A single resolved field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Normalize a resolved value as text.
    ///
    /// Plain decimal numbers lose trailing fractional zeros and become
    /// numbers; an all-zero fraction collapses to an integer. Anything
    /// that would lose digits as a number (leading zeros, i64 overflow)
    /// stays text.
    pub fn normalize(text: String) -> Self {
        if !is_plain_decimal(&text) {
            return FieldValue::Text(text);
        }
        let trimmed = drop_trailing_zeros(&text);
        let int_part = trimmed
            .trim_start_matches('-')
            .split('.')
            .next()
            .unwrap_or_default();
        if int_part.len() > 1 && int_part.starts_with('0') {
            return FieldValue::Text(text);
        }
        if trimmed.contains('.') {
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => FieldValue::Float(f),
                _ => FieldValue::Text(text),
            }
        } else {
            match trimmed.parse::<i64>() {
                Ok(n) => FieldValue::Integer(n),
                Err(_) => FieldValue::Text(text),
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Integer(n) => serializer.serialize_i64(*n),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// `-?digits(.digits)?`
fn is_plain_decimal(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.map_or(true, digits)
}

// ---------------------------------------------------------------------------
// Ordered maps
// ---------------------------------------------------------------------------

/// Ordered field name → value mapping for one stream instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamRecord {
    fields: Vec<(String, FieldValue)>,
}

impl StreamRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. A repeated name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for StreamRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Chapter label → timecode, in menu order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapters {
    entries: Vec<(String, String)>,
}

impl Chapters {
    pub fn insert(&mut self, label: impl Into<String>, timecode: impl Into<String>) {
        let label = label.into();
        let timecode = timecode.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = timecode,
            None => self.entries.push((label, timecode)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Chapters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, timecode) in &self.entries {
            map.serialize_entry(label, timecode)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Stream kind → ordered stream records, plus the optional chapter table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTree {
    streams: [Vec<StreamRecord>; 7],
    chapters: Option<Chapters>,
}

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one kind, in ascending instance order.
    pub fn streams(&self, kind: StreamKind) -> &[StreamRecord] {
        &self.streams[kind.index()]
    }

    pub fn push(&mut self, kind: StreamKind, record: StreamRecord) {
        self.streams[kind.index()].push(record);
    }

    pub fn chapters(&self) -> Option<&Chapters> {
        self.chapters.as_ref()
    }

    pub fn set_chapters(&mut self, chapters: Option<Chapters>) {
        self.chapters = chapters;
    }

    /// Kinds with at least one record.
    pub fn kinds(&self) -> impl Iterator<Item = StreamKind> + '_ {
        StreamKind::ALL
            .into_iter()
            .filter(move |k| !self.streams[k.index()].is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.streams.iter().all(Vec::is_empty) && self.chapters.is_none()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ResultTree {
    /// Kinds without records are omitted; `Chapters` comes last.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.kinds().count() + usize::from(self.chapters.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for kind in self.kinds() {
            map.serialize_entry(kind.as_str(), self.streams(kind))?;
        }
        if let Some(chapters) = &self.chapters {
            map.serialize_entry("Chapters", chapters)?;
        }
        map.end()
    }
}
