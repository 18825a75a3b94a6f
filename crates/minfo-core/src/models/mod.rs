//! Data model: stream kinds and the extraction result tree.

pub mod stream;
pub mod tree;

pub use stream::{InfoKind, StreamKind};
pub use tree::{Chapters, FieldValue, ResultTree, StreamRecord};
