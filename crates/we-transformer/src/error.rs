//! Transform error types.

use source_edit::Span;
use thiserror::Error;

/// A failure that stops the transform of a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A `<script type="data">` block is not a literal value.
    #[error("invalid data literal: {message}")]
    DataLiteral {
        /// What was wrong with the literal.
        message: String,
        /// The location of the data block in the source.
        span: Span,
    },
}

impl TransformError {
    pub fn span(&self) -> Span {
        match self {
            TransformError::DataLiteral { span, .. } => *span,
        }
    }
}
