//! Markup parser for Weex `.we` component files.
//!
//! This crate provides:
//! - Lexer (tokenizer) using `logos`
//! - A lenient recursive descent parser that always produces a tree
//! - An arena [`Document`] with parent back-references
//! - A serializer that prints the tree back as markup
//!
//! # Example
//!
//! ```
//! use we_parser::parse;
//!
//! let source = r#"
//! <template>
//!   <text class="title">{{title}}</text>
//! </template>
//! <script>
//!   module.exports = { data: { title: 'hi' } }
//! </script>
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! let doc = &result.document;
//! let template = doc.children(doc.root())[1];
//! assert_eq!(doc.tag_name(template), Some("template"));
//! ```

mod dom;
mod entities;
mod error;
mod lexer;
mod parser;
mod serialize;

pub use dom::{Attribute, Comment, Descendants, Document, Element, Node, NodeId, NodeKind, Text};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{is_raw_text_element, is_void_element};
pub use source_edit::Span;

/// The result of parsing a `.we` file.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document.
    pub document: Document,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses markup into a document.
///
/// Parsing never fails: problems are reported in [`ParseResult::errors`] and
/// the tree is built from whatever could be recovered.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}
