//! minfo-core: structured metadata over the MediaInfo library.
//!
//! A session opens a media file through a [`MediaBackend`], walks every
//! stream the library reports and returns a [`ResultTree`]: stream kind →
//! ordered list of field maps, plus an optional chapter table.
//!
//! # Architecture
//!
//! ```text
//! Layer 0: Backend   (native libmediainfo handle, or in-memory)
//! Layer 1: Schema    (field catalog, normalization policy)
//! Layer 2: Extract   (stream walk, variant substitution, chapters)
//! Layer 3: Session   (open/close lifecycle, options, report text)
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod lang;
pub mod models;
pub mod options;
pub mod policy;
pub mod schema;
pub mod session;

pub use backend::{MediaBackend, MemoryBackend, MemoryMedia, MemoryStream};
#[cfg(feature = "native")]
pub use backend::{NativeBackend, NativeLibrary};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use lang::LanguageTable;
pub use models::*;
pub use schema::FieldSchema;
pub use session::Session;
