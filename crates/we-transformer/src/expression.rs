//! Interpolated attribute values.
//!
//! A value such as `a {{b}} c` is split into literal and `{{ }}` tokens and
//! compiled into one JavaScript expression suitable for a bound attribute.

use crate::names::quote;

/// The compiled form of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// The expression source, or the original value when nothing was bound.
    pub code: String,
    /// Whether the value contained at least one interpolation.
    pub dynamic: bool,
}

/// A piece of an interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// The trimmed expression between the markers.
    Interpolation(&'a str),
}

/// Splits `input` into literal and interpolation segments.
///
/// At each `{{` the triple form `{{{ }}}` is tried first, then the double
/// form; the shortest closing marker wins. A marker pair around blank text or
/// without a closing marker stays literal.
pub fn segments(input: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(found) = input[pos..].find("{{") {
        let open = pos + found;
        if let Some((inner, end)) = match_interpolation(input, open) {
            if literal_start < open {
                out.push(Segment::Literal(&input[literal_start..open]));
            }
            out.push(Segment::Interpolation(inner));
            literal_start = end;
            pos = end;
        } else {
            pos = open + 1;
        }
    }

    if literal_start < input.len() {
        out.push(Segment::Literal(&input[literal_start..]));
    }
    out
}

/// Tries to match an interpolation starting at `open`, returning the trimmed
/// expression and the offset just past the closing marker.
fn match_interpolation(input: &str, open: usize) -> Option<(&str, usize)> {
    let candidates: [(&str, &str); 2] = [("{{{", "}}}"), ("{{", "}}")];
    for (opener, closer) in candidates {
        if !input[open..].starts_with(opener) {
            continue;
        }
        let body_start = open + opener.len();
        // The expression is at least one character long.
        let Some(first) = input[body_start..].chars().next() else {
            continue;
        };
        let search_from = body_start + first.len_utf8();
        let Some(close) = input[search_from..].find(closer) else {
            continue;
        };
        let close = search_from + close;
        let inner = input[body_start..close].trim();
        if !inner.is_empty() {
            return Some((inner, close + closer.len()));
        }
    }
    None
}

/// Returns whether `input` contains at least one interpolation.
pub fn has_interpolation(input: &str) -> bool {
    segments(input)
        .iter()
        .any(|segment| matches!(segment, Segment::Interpolation(_)))
}

/// Compiles an attribute value.
///
/// - no interpolation: the value is returned unchanged and `dynamic` is false
/// - a single interpolation spanning the whole (trimmed) value: its expression
/// - otherwise: literals as quoted strings and expressions in parentheses,
///   joined with ` + `
pub fn compile(input: &str) -> Compiled {
    let trimmed = input.trim();
    let parts = segments(trimmed);

    if !parts
        .iter()
        .any(|segment| matches!(segment, Segment::Interpolation(_)))
    {
        return Compiled {
            code: input.to_string(),
            dynamic: false,
        };
    }

    let code = match parts.as_slice() {
        [Segment::Interpolation(expr)] => (*expr).to_string(),
        _ => parts
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => quote(text),
                Segment::Interpolation(expr) => format!("({expr})"),
            })
            .collect::<Vec<_>>()
            .join(" + "),
    };

    Compiled {
        code,
        dynamic: true,
    }
}

/// Removes interpolation markers that wrap the whole value. Anything else is
/// returned trimmed but otherwise untouched.
pub fn strip_full_span(input: &str) -> &str {
    let trimmed = input.trim();
    match segments(trimmed).as_slice() {
        [Segment::Interpolation(expr)] => expr,
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_value_is_unchanged() {
        let compiled = compile(" title ");
        assert_eq!(compiled.code, " title ");
        assert!(!compiled.dynamic);
    }

    #[test]
    fn test_single_interpolation() {
        let compiled = compile("{{ item.name }}");
        assert_eq!(compiled.code, "item.name");
        assert!(compiled.dynamic);
    }

    #[test]
    fn test_triple_interpolation() {
        assert_eq!(compile("{{{raw}}}").code, "raw");
    }

    #[test]
    fn test_concatenation() {
        assert_snapshot!(compile("a {{b}} c").code, @"'a ' + (b) + ' c'");
        assert_snapshot!(compile("b{{b}}").code, @"'b' + (b)");
        assert_snapshot!(compile("{{x}}{{y}}").code, @"(x) + (y)");
    }

    #[test]
    fn test_literal_quotes_are_escaped() {
        assert_eq!(compile("it's {{n}}").code, r"'it\'s ' + (n)");
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert!(!compile("{{open").dynamic);
        assert!(!compile("{{}}").dynamic);
        assert!(!compile("{{   }}").dynamic);
        assert_eq!(compile("a}}b").code, "a}}b");
    }

    #[test]
    fn test_interpolation_spanning_lines() {
        let compiled = compile("{{ a &&\n  b }}");
        assert_eq!(compiled.code, "a &&\n  b");
    }

    #[test]
    fn test_segments_shortest_close() {
        assert_eq!(
            segments("{{a}} and {{b}}"),
            vec![
                Segment::Interpolation("a"),
                Segment::Literal(" and "),
                Segment::Interpolation("b"),
            ]
        );
        // No `}}}` follows, so the double form matches from the same `{{`.
        assert_eq!(segments("{{{a}}"), vec![Segment::Interpolation("{a")]);
    }

    #[test]
    fn test_strip_full_span() {
        assert_eq!(strip_full_span(" {{ (k, v) in list }} "), "(k, v) in list");
        assert_eq!(strip_full_span("item in list"), "item in list");
        assert_eq!(strip_full_span("a {{b}}"), "a {{b}}");
    }

    #[test]
    fn test_has_interpolation() {
        assert!(has_interpolation("x{{y}}"));
        assert!(!has_interpolation("x{y}"));
    }
}
