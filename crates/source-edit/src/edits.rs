//! Span-based text splicing.
//!
//! Edits are recorded against the original text and applied in a single pass.
//! A replacement may cover spans that carry edits of their own; those inner
//! edits are dropped at apply time, so a caller building the outer replacement
//! text is expected to render the inner region with [`SourceEdits::render`]
//! first.

use crate::Span;
use thiserror::Error;

/// Errors from applying edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Two edits overlap without one containing the other.
    #[error("overlapping edits at {first:?} and {second:?}")]
    Overlap { first: Span, second: Span },

    /// An edit span does not fit the source text.
    #[error("edit span {span:?} is outside the source or splits a character")]
    OutOfBounds { span: Span },
}

/// A single replacement of `span` with `text`. Empty spans are insertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
    seq: usize,
}

/// An ordered collection of pending edits against one source text.
#[derive(Debug, Clone, Default)]
pub struct SourceEdits {
    edits: Vec<Edit>,
}

impl SourceEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns the recorded edits in recording order.
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Replaces `span` with `text`.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        let seq = self.edits.len();
        self.edits.push(Edit {
            span,
            text: text.into(),
            seq,
        });
    }

    /// Inserts `text` at `offset`. Insertions at the same offset keep their
    /// recording order.
    pub fn insert(&mut self, offset: impl Into<crate::ByteOffset>, text: impl Into<String>) {
        self.replace(Span::empty(offset), text);
    }

    pub fn delete(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    /// Deletes `span`, widened to whole lines when nothing but whitespace
    /// shares its first and last line.
    pub fn delete_lines(&mut self, source: &str, span: Span) {
        self.delete(line_extent(source, span));
    }

    /// Applies every edit to `source`.
    pub fn apply(&self, source: &str) -> Result<String, EditError> {
        self.render(source, Span::from_usize(0, source.len()))
    }

    /// Returns the text of `span` with every edit that lies inside it applied.
    pub fn render(&self, source: &str, span: Span) -> Result<String, EditError> {
        if span.slice(source).is_none() {
            return Err(EditError::OutOfBounds { span });
        }

        let mut edits: Vec<&Edit> = self
            .edits
            .iter()
            .filter(|edit| span.contains_span(edit.span))
            .collect();
        edits.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then_with(|| (!a.span.is_empty()).cmp(&!b.span.is_empty()))
                .then_with(|| b.span.end.cmp(&a.span.end))
                .then_with(|| a.seq.cmp(&b.seq))
        });

        let mut out = String::with_capacity(u32::from(span.len()) as usize);
        let mut cursor = span.start;
        let mut last_replaced = Span::empty(span.start);

        for edit in edits {
            if edit.span.start < cursor {
                if last_replaced.contains_span(edit.span) {
                    continue;
                }
                return Err(EditError::Overlap {
                    first: last_replaced,
                    second: edit.span,
                });
            }

            let between = Span::new(cursor, edit.span.start);
            let Some(text) = between.slice(source) else {
                return Err(EditError::OutOfBounds { span: edit.span });
            };
            if edit.span.slice(source).is_none() {
                return Err(EditError::OutOfBounds { span: edit.span });
            }
            out.push_str(text);
            out.push_str(&edit.text);
            cursor = edit.span.end;
            if !edit.span.is_empty() {
                last_replaced = edit.span;
            }
        }

        if let Some(rest) = Span::new(cursor, span.end).slice(source) {
            out.push_str(rest);
        }
        Ok(out)
    }
}

/// Widens `span` to cover its leading indentation and trailing line break when
/// the span is the only non-blank content on its lines.
fn line_extent(source: &str, span: Span) -> Span {
    let range = span.range();
    if range.end > source.len() {
        return span;
    }
    let before = &source[..range.start];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    if !before[line_start..].chars().all(|c| c == ' ' || c == '\t') {
        return span;
    }

    let after = &source[range.end..];
    let trailing = after
        .find(|c: char| c != ' ' && c != '\t' && c != ';')
        .unwrap_or(after.len());
    let rest = &after[trailing..];
    let end = if rest.starts_with("\r\n") {
        range.end + trailing + 2
    } else if rest.starts_with('\n') || rest.is_empty() {
        range.end + trailing + usize::from(!rest.is_empty())
    } else {
        return span;
    };

    Span::from_usize(line_start, end)
}
