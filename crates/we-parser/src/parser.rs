//! Recursive descent parser for `.we` markup.

use crate::dom::{Attribute, Comment, Document, Element, NodeId, NodeKind, Text};
use crate::entities::decode;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::ParseResult;
use smol_str::SmolStr;
use source_edit::Span;

/// HTML void elements that are self-closing and should not have closing tags.
/// See: https://developer.mozilla.org/en-US/docs/Glossary/Void_element
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Returns true if the given element name is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS.contains(&name)
}

/// Returns true if the element's content is not parsed as markup.
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// The markup parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token at the current position.
    current: Token,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
    /// The tree being built.
    document: Document,
    /// Names of the elements currently open, outermost first.
    open_elements: Vec<SmolStr>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            current: token_at(source, 0),
            errors: Vec::new(),
            document: Document::new(),
            open_elements: Vec::new(),
        }
    }

    /// Parses the source into a document.
    pub fn parse(mut self) -> ParseResult {
        let root = self.document.root();
        self.parse_children(root);
        ParseResult {
            document: self.document,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    fn current_kind(&self) -> TokenKind {
        self.current.kind
    }

    fn current_text(&self) -> &'src str {
        self.current.span.slice(self.source).unwrap_or("")
    }

    /// Byte offset of the current token.
    fn offset(&self) -> usize {
        u32::from(self.current.span.start) as usize
    }

    /// Moves to the token starting at `offset`.
    fn seek(&mut self, offset: usize) {
        self.current = token_at(self.source, offset);
    }

    fn advance(&mut self) {
        if self.current.kind != TokenKind::Eof {
            self.seek(u32::from(self.current.span.end) as usize);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.check(TokenKind::Whitespace) {
            self.advance();
        }
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    /// Returns true if a `<` at `pos` opens a tag, closing tag or comment.
    fn is_tag_start(&self, pos: usize) -> bool {
        let bytes = self.source.as_bytes();
        match bytes.get(pos + 1) {
            Some(b) if b.is_ascii_alphabetic() => true,
            Some(b'!') => true,
            Some(b'/') => bytes.get(pos + 2).is_some_and(|b| b.is_ascii_alphabetic()),
            _ => false,
        }
    }

    /// Finds the end of a text run starting at `from`.
    fn text_end(&self, from: usize) -> usize {
        let first_len = self.source[from..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
        let mut search = from + first_len;
        while let Some(i) = self.source[search..].find('<') {
            let pos = search + i;
            if self.is_tag_start(pos) {
                return pos;
            }
            search = pos + 1;
        }
        self.source.len()
    }

    // === Nodes ===

    /// Parses child nodes of `parent` until a closing tag for an open element
    /// or the end of input.
    fn parse_children(&mut self, parent: NodeId) {
        loop {
            match self.current_kind() {
                TokenKind::Eof => return,
                TokenKind::LAngleSlash => {
                    let (name, span) = self.peek_closing_tag();
                    if name.is_empty() {
                        self.parse_text(parent);
                    } else if self.open_elements.iter().any(|open| *open == name) {
                        return;
                    } else {
                        self.error(
                            ParseErrorKind::UnexpectedClosingTag {
                                tag_name: name.to_string(),
                            },
                            span,
                        );
                        self.seek(span.range().end);
                    }
                }
                TokenKind::CommentOpen => self.parse_comment(parent),
                TokenKind::BangOpen => self.skip_bogus_comment(),
                TokenKind::LAngle if self.is_tag_start(self.offset()) => {
                    self.parse_element(parent)
                }
                _ => self.parse_text(parent),
            }
        }
    }

    /// Reads the closing tag at the current `</` without consuming it.
    /// Returns an empty name when `</` is not followed by a tag name.
    fn peek_closing_tag(&self) -> (SmolStr, Span) {
        let start = self.offset();
        let name_token = token_at(self.source, u32::from(self.current.span.end) as usize);
        let name = if name_token.kind == TokenKind::Name
            && self.source.as_bytes()[name_token.span.range().start].is_ascii_alphabetic()
        {
            SmolStr::new(
                name_token
                    .span
                    .slice(self.source)
                    .unwrap_or("")
                    .to_ascii_lowercase(),
            )
        } else {
            SmolStr::default()
        };
        let end = self.source[start..]
            .find('>')
            .map(|i| start + i + 1)
            .unwrap_or(self.source.len());
        (name, Span::from_usize(start, end))
    }

    fn parse_element(&mut self, parent: NodeId) {
        let start = self.offset();
        self.advance(); // `<`
        let name = SmolStr::new(self.current_text().to_ascii_lowercase());
        self.advance();

        let (attributes, self_closing) = self.parse_attributes();
        let open_span = Span::from_usize(start, self.offset());

        let id = self.document.create(NodeKind::Element(Element {
            name: name.clone(),
            attributes,
            self_closing,
            span: open_span,
        }));
        self.document.append_child(parent, id);

        if self_closing || is_void_element(&name) {
            return;
        }

        if is_raw_text_element(&name) {
            self.parse_raw_text(id, &name, open_span);
            return;
        }

        self.open_elements.push(name.clone());
        self.parse_children(id);
        self.open_elements.pop();

        if self.check(TokenKind::LAngleSlash) {
            let (closing, span) = self.peek_closing_tag();
            if closing == name {
                self.seek(span.range().end);
                return;
            }
        }
        self.error(
            ParseErrorKind::UnclosedTag {
                tag_name: name.to_string(),
            },
            open_span,
        );
    }

    /// Parses attributes up to and including the end of the opening tag.
    /// Returns the attributes and whether the tag ended with `/>`.
    fn parse_attributes(&mut self) -> (Vec<Attribute>, bool) {
        let mut attributes: Vec<Attribute> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.current_kind() {
                TokenKind::RAngle => {
                    self.advance();
                    return (attributes, false);
                }
                TokenKind::SlashRAngle => {
                    self.advance();
                    return (attributes, true);
                }
                TokenKind::Eof => {
                    self.error(
                        ParseErrorKind::UnexpectedEof {
                            expected: TokenKind::RAngle.name().to_string(),
                        },
                        self.current.span,
                    );
                    return (attributes, false);
                }
                TokenKind::Slash => self.advance(),
                TokenKind::Name => {
                    let attr = self.parse_attribute();
                    if attributes.iter().any(|existing| existing.name == attr.name) {
                        self.error(
                            ParseErrorKind::DuplicateAttribute {
                                name: attr.name.to_string(),
                            },
                            attr.span,
                        );
                    } else {
                        attributes.push(attr);
                    }
                }
                kind => {
                    self.error(
                        ParseErrorKind::UnexpectedToken {
                            expected: "attribute name".to_string(),
                            found: kind.name().to_string(),
                        },
                        self.current.span,
                    );
                    self.advance();
                }
            }
        }
    }

    /// Parses `name`, `name=value`, `name="value"` or `name='value'`.
    fn parse_attribute(&mut self) -> Attribute {
        let start = self.offset();
        let name = SmolStr::new(self.current_text().to_ascii_lowercase());
        self.advance();
        let name_end = self.offset();

        self.skip_whitespace();
        if !self.eat(TokenKind::Eq) {
            return Attribute {
                name,
                value: String::new(),
                span: Span::from_usize(start, name_end),
            };
        }
        self.skip_whitespace();

        let source = self.source;
        let value_start = self.offset();
        let (raw, end) = match self.current_kind() {
            TokenKind::DoubleQuote | TokenKind::SingleQuote => {
                let quote = source.as_bytes()[value_start] as char;
                let body = value_start + 1;
                match source[body..].find(quote) {
                    Some(i) => (&source[body..body + i], body + i + 1),
                    None => {
                        let stop = source[body..]
                            .find('>')
                            .map(|i| body + i)
                            .unwrap_or(source.len());
                        self.error(
                            ParseErrorKind::UnterminatedAttribute {
                                name: name.to_string(),
                            },
                            Span::from_usize(start, stop),
                        );
                        (&source[body..stop], stop)
                    }
                }
            }
            TokenKind::RAngle | TokenKind::SlashRAngle | TokenKind::Eof => ("", value_start),
            _ => {
                let stop = source[value_start..]
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .map(|i| value_start + i)
                    .unwrap_or(source.len());
                (&source[value_start..stop], stop)
            }
        };
        self.seek(end);

        Attribute {
            name,
            value: decode(raw).into_owned(),
            span: Span::from_usize(start, end),
        }
    }

    /// Reads the body of a `script` or `style` element verbatim.
    fn parse_raw_text(&mut self, id: NodeId, name: &str, open_span: Span) {
        let content_start = self.offset();
        let closing = find_closing_tag(&self.source[content_start..], name)
            .map(|i| content_start + i);
        let content_end = closing.unwrap_or(self.source.len());

        if content_end > content_start {
            let text = self.document.create(NodeKind::Text(Text {
                value: self.source[content_start..content_end].to_string(),
                span: Span::from_usize(content_start, content_end),
            }));
            self.document.append_child(id, text);
        }

        self.seek(content_end);
        if closing.is_some() {
            let (_, span) = self.peek_closing_tag();
            self.seek(span.range().end);
        } else {
            self.error(
                ParseErrorKind::UnclosedTag {
                    tag_name: name.to_string(),
                },
                open_span,
            );
        }
    }

    fn parse_comment(&mut self, parent: NodeId) {
        let start = self.offset();
        let data_start = start + "<!--".len();
        let (data_end, end) = match self.source[data_start..].find("-->") {
            Some(i) => (data_start + i, data_start + i + "-->".len()),
            None => {
                self.error(
                    ParseErrorKind::UnterminatedComment,
                    Span::from_usize(start, self.source.len()),
                );
                (self.source.len(), self.source.len())
            }
        };

        let comment = self.document.create(NodeKind::Comment(Comment {
            data: self.source[data_start..data_end].to_string(),
            span: Span::from_usize(start, end),
        }));
        self.document.append_child(parent, comment);
        self.seek(end);
    }

    /// Skips `<!doctype ...>` and other `<!...>` constructs.
    fn skip_bogus_comment(&mut self) {
        let start = self.offset();
        let end = self.source[start..]
            .find('>')
            .map(|i| start + i + 1)
            .unwrap_or(self.source.len());
        self.seek(end);
    }

    fn parse_text(&mut self, parent: NodeId) {
        let start = self.offset();
        let end = self.text_end(start);
        let text = self.document.create(NodeKind::Text(Text {
            value: decode(&self.source[start..end]).into_owned(),
            span: Span::from_usize(start, end),
        }));
        self.document.append_child(parent, text);
        self.seek(end);
    }
}

/// Lexes the single token starting at `offset`.
fn token_at(source: &str, offset: usize) -> Token {
    Lexer::at(source, offset).next().unwrap_or(Token {
        kind: TokenKind::Eof,
        span: Span::from_usize(source.len(), source.len()),
    })
}

/// Finds `</name` (ASCII case-insensitive) followed by a tag-name boundary.
fn find_closing_tag(haystack: &str, name: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    let needle = format!("</{name}");
    let mut from = 0;
    while let Some(i) = lower[from..].find(&needle) {
        let pos = from + i;
        let after = lower.as_bytes().get(pos + needle.len());
        if matches!(after, None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')) {
            return Some(pos);
        }
        from = pos + needle.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseResult {
        Parser::new(source).parse()
    }

    fn element<'a>(result: &'a ParseResult, id: NodeId) -> &'a Element {
        result.document.element(id).expect("Expected Element")
    }

    #[test]
    fn test_parse_simple_element() {
        let result = parse("<div>hello</div>");
        assert!(result.errors.is_empty());
        let doc = &result.document;
        let children = doc.children(doc.root());
        assert_eq!(children.len(), 1);
        assert_eq!(element(&result, children[0]).name.as_str(), "div");
        assert_eq!(doc.text_content(children[0]), "hello");
    }

    #[test]
    fn test_parse_attributes() {
        let result = parse(r#"<text class="a {{b}}" value='x' else data-n=3>t</text>"#);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let doc = &result.document;
        let text = element(&result, doc.children(doc.root())[0]);
        let attrs: Vec<(&str, &str)> = text
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("class", "a {{b}}"),
                ("value", "x"),
                ("else", ""),
                ("data-n", "3")
            ]
        );
    }

    #[test]
    fn test_names_are_lowercased() {
        let result = parse(r#"<DIV onClick="go"></div>"#);
        assert!(result.errors.is_empty());
        let doc = &result.document;
        let div = element(&result, doc.children(doc.root())[0]);
        assert_eq!(div.name.as_str(), "div");
        assert_eq!(div.attributes[0].name.as_str(), "onclick");
    }

    #[test]
    fn test_script_content_is_raw() {
        let source = "<script>if (a < b && c) { x = '</div>' }</script>";
        let result = parse(source);
        assert!(result.errors.is_empty());
        let doc = &result.document;
        let script = doc.children(doc.root())[0];
        assert_eq!(
            doc.text_content(script),
            "if (a < b && c) { x = '</div>' }"
        );
    }

    #[test]
    fn test_self_closing_and_void() {
        let result = parse(r#"<div><image src="a"/><img src="b"><text>t</text></div>"#);
        assert!(result.errors.is_empty());
        let doc = &result.document;
        let div = doc.children(doc.root())[0];
        let names: Vec<&str> = doc
            .children(div)
            .iter()
            .filter_map(|&id| doc.tag_name(id))
            .collect();
        assert_eq!(names, vec!["image", "img", "text"]);
    }

    #[test]
    fn test_text_with_less_than() {
        let result = parse("<text>{{a < b}}</text>");
        assert!(result.errors.is_empty());
        let doc = &result.document;
        assert_eq!(doc.text_content(doc.root()), "{{a < b}}");
    }

    #[test]
    fn test_comment() {
        let result = parse("<!-- note --><div></div>");
        assert!(result.errors.is_empty());
        let doc = &result.document;
        let first = doc.node(doc.children(doc.root())[0]);
        assert!(matches!(&first.kind, NodeKind::Comment(c) if c.data == " note "));
    }

    #[test]
    fn test_unclosed_tag_is_recovered() {
        let result = parse("<div><text>hi</div>");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0].kind,
            ParseErrorKind::UnclosedTag { tag_name } if tag_name == "text"
        ));
        let doc = &result.document;
        let div = doc.children(doc.root())[0];
        assert_eq!(doc.children(doc.root()).len(), 1);
        assert_eq!(doc.text_content(div), "hi");
    }

    #[test]
    fn test_stray_closing_tag_is_skipped() {
        let result = parse("<div></span>x</div>");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0].kind,
            ParseErrorKind::UnexpectedClosingTag { tag_name } if tag_name == "span"
        ));
        let doc = &result.document;
        assert_eq!(doc.text_content(doc.root()), "x");
    }

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        let result = parse(r#"<div a="1" a="2"></div>"#);
        assert_eq!(result.errors.len(), 1);
        let doc = &result.document;
        let div = element(&result, doc.children(doc.root())[0]);
        assert_eq!(div.attr("a"), Some("1"));
    }

    #[test]
    fn test_attribute_spans_cover_values() {
        let source = r#"<div a="1" b='two' c=3 d></div>"#;
        let result = parse(source);
        let doc = &result.document;
        let div = element(&result, doc.children(doc.root())[0]);
        let spans: Vec<&str> = div
            .attributes
            .iter()
            .map(|a| a.span.slice(source).unwrap())
            .collect();
        assert_eq!(spans, vec![r#"a="1""#, "b='two'", "c=3", "d"]);
    }

    #[test]
    fn test_unterminated_attribute() {
        let result = parse(r#"<div a="1></div>"#);
        assert!(matches!(
            &result.errors[0].kind,
            ParseErrorKind::UnterminatedAttribute { name } if name == "a"
        ));
    }

    #[test]
    fn test_entities_in_attributes_are_decoded() {
        let result = parse(r#"<div if="{{a &amp;&amp; b}}"></div>"#);
        let doc = &result.document;
        let div = element(&result, doc.children(doc.root())[0]);
        assert_eq!(div.attr("if"), Some("{{a && b}}"));
    }

    #[test]
    fn test_find_closing_tag_boundary() {
        assert_eq!(find_closing_tag("a</scripts></SCRIPT>", "script"), Some(11));
        assert_eq!(find_closing_tag("abc", "style"), None);
    }
}
