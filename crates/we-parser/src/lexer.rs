//! Markup lexer using logos.
//!
//! Only tag punctuation and names are tokenized. Text runs, attribute values
//! and raw-text element bodies are read straight from the source by the
//! parser, which restarts the lexer at the offset where it wants the next tag
//! token.

use logos::Logos;
use source_edit::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for tag markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
pub enum TokenKind {
    /// `<!--`
    #[token("<!--")]
    CommentOpen,

    /// `<!`, the start of a doctype or bogus comment
    #[token("<!")]
    BangOpen,

    /// `</`
    #[token("</")]
    LAngleSlash,

    /// `<`
    #[token("<")]
    LAngle,

    /// `>`
    #[token(">")]
    RAngle,

    /// `/>`
    #[token("/>")]
    SlashRAngle,

    /// `/`
    #[token("/")]
    Slash,

    /// `=`
    #[token("=")]
    Eq,

    /// `"`
    #[token("\"")]
    DoubleQuote,

    /// `'`
    #[token("'")]
    SingleQuote,

    /// Spaces, tabs, line breaks and form feeds
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    /// A tag name, attribute name or unquoted attribute value
    #[regex(r#"[^ \t\r\n\x0C<>/="']+"#)]
    Name,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::CommentOpen => "'<!--'",
            TokenKind::BangOpen => "'<!'",
            TokenKind::LAngleSlash => "'</'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::SlashRAngle => "'/>'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::DoubleQuote => "'\"'",
            TokenKind::SingleQuote => "'''",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Name => "name",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer over markup source, optionally starting part-way through it.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    base: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self::at(source, 0)
    }

    /// Creates a lexer whose first token starts at byte `offset`.
    ///
    /// Spans are still reported relative to the start of `source`.
    pub fn at(source: &'src str, offset: usize) -> Self {
        let base = offset.min(source.len());
        Self {
            inner: TokenKind::lexer(source.get(base..).unwrap_or("")),
            source,
            base,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the text of the current token.
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let kind = match self.inner.next() {
            Some(Ok(kind)) => kind,
            Some(Err(())) => TokenKind::Error,
            None => {
                self.finished = true;
                return Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::empty(text_size::TextSize::from(self.source.len() as u32)),
                });
            }
        };

        let range = self.inner.span();
        Some(Token {
            kind,
            span: Span::from_usize(self.base + range.start, self.base + range.end),
        })
    }
}
