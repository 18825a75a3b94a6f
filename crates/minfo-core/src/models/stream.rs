//! Stream and info kinds.
//!
//! Both mirror the collaborator's C enumerations, so the discriminants
//! are part of the wire contract and must not be reordered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Category of a media stream.
///
/// Declaration order is iteration order and matches the library's
/// zero-based `MediaInfo_stream_t` values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StreamKind {
    General = 0,
    Video = 1,
    Audio = 2,
    Text = 3,
    Other = 4,
    Image = 5,
    Menu = 6,
}

impl StreamKind {
    /// All kinds, in iteration order.
    pub const ALL: [StreamKind; 7] = [
        StreamKind::General,
        StreamKind::Video,
        StreamKind::Audio,
        StreamKind::Text,
        StreamKind::Other,
        StreamKind::Image,
        StreamKind::Menu,
    ];

    /// Name used by the field catalog and in serialized trees.
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::General => "General",
            StreamKind::Video => "Video",
            StreamKind::Audio => "Audio",
            StreamKind::Text => "Text",
            StreamKind::Other => "Other",
            StreamKind::Image => "Image",
            StreamKind::Menu => "Menu",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Value passed across the C boundary.
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("unknown stream kind: {}", s)))
    }
}

/// Which facet of a field to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    Name = 0,
    Text = 1,
    Measure = 2,
    Options = 3,
    NameText = 4,
    MeasureText = 5,
    Info = 6,
    HowTo = 7,
}

impl InfoKind {
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}
