//! Collaborator backends.
//!
//! The session and the extraction engine only see [`MediaBackend`]; the
//! native binding and the in-memory backend are interchangeable.

use std::path::Path;

use crate::error::Result;
use crate::models::{InfoKind, StreamKind};

/// Primitive operations of the media library, bound to one handle.
///
/// A backend value owns its handle: acquiring it is construction,
/// releasing it is `Drop`. Stream numbers are zero-based.
pub trait MediaBackend {
    /// Open an input. `Ok(false)` when the library rejects it.
    fn open(&mut self, path: &Path) -> Result<bool>;
    /// Close the current input, if any. The handle stays valid.
    fn close(&mut self) -> Result<()>;
    /// Generic option channel: set a toggle or read a computed output.
    fn option(&mut self, name: &str, value: &str) -> Result<String>;
    /// Formatted report for the current input.
    fn inform(&self) -> Result<String>;
    /// Number of streams of `kind`, or with `Some(stream)` the number of
    /// fields in that stream.
    fn count(&self, kind: StreamKind, stream: Option<usize>) -> Result<usize>;
    /// One facet of a named field. Empty when absent.
    fn get(&self, kind: StreamKind, stream: usize, field: &str, info: InfoKind) -> Result<String>;
    /// One facet of a field by position within the stream.
    fn get_by_index(
        &self,
        kind: StreamKind,
        stream: usize,
        index: usize,
        info: InfoKind,
    ) -> Result<String>;
}

pub mod memory;
#[cfg(feature = "native")]
pub mod native;

pub use memory::{MemoryBackend, MemoryMedia, MemoryStream};
#[cfg(feature = "native")]
pub use native::{NativeBackend, NativeLibrary};
