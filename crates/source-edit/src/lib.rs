//! Source positions and text splicing for we-migrate.
//!
//! The rewriters never reprint a syntax tree. They record replacements against
//! byte spans of the original text and apply them in one pass, so everything
//! that is not rewritten keeps its original formatting.

mod edits;
mod line_index;
mod span;

pub use edits::{Edit, EditError, SourceEdits};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
