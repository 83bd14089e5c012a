//! Tag, event and identifier tables shared by the rewriters.

/// Tags provided by the runtime. They are never registered as components.
pub const BUILTIN_TAGS: &[&str] = &[
    "template",
    "style",
    "script",
    "element",
    "wx-element",
    "wa-element",
    "we-element",
    "content",
    "slot",
    "container",
    "div",
    "scroller",
    "list",
    "cell",
    "header",
    "refresh",
    "loading",
    "loading-indicator",
    "text",
    "image",
    "img",
    "input",
    "textarea",
    "switch",
    "slider",
    "slider-neighbor",
    "indicator",
    "video",
    "a",
    "web",
    "embed",
    "richtext",
    "span",
];

/// Native events. On a component tag they need the `.native` modifier.
pub const BUILTIN_EVENTS: &[&str] = &[
    "click",
    "longpress",
    "appear",
    "disappear",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
    "panstart",
    "panmove",
    "panend",
    "horizontalpan",
    "verticalpan",
    "swipe",
    "focus",
    "blur",
    "input",
    "change",
    "return",
    "scroll",
    "load",
];

/// Tags that declare a nested component inside a `.we` file.
pub const ELEMENT_TAGS: &[&str] = &["element", "wx-element", "wa-element", "we-element"];

/// Tags renamed verbatim.
const TAG_RENAMES: &[(&str, &str)] = &[("content", "slot")];

/// The per-item binding introduced for a bare `repeat` list.
pub const DEFAULT_REPEAT_VALUE: &str = "$value";

pub const LEGACY_EXTENSION: &str = ".we";
pub const TARGET_EXTENSION: &str = ".vue";

/// The legacy component library and its replacement.
pub const LEGACY_LIBRARY: &str = "weex-components";
pub const TARGET_LIBRARY: &str = "weex-vue-components";
/// Filename prefix of library components.
pub const LIBRARY_TAG_PREFIX: &str = "wxc-";

/// Request prefix of platform modules.
pub const PLATFORM_MODULE_PREFIX: &str = "@weex-module/";

/// Output directory of nested element components.
pub const COMPONENTS_DIR: &str = "components";

pub fn is_builtin_tag(tag: &str) -> bool {
    BUILTIN_TAGS.contains(&tag)
}

pub fn is_builtin_event(event: &str) -> bool {
    BUILTIN_EVENTS.contains(&event)
}

pub fn is_element_tag(tag: &str) -> bool {
    ELEMENT_TAGS.contains(&tag)
}

/// Returns the new name of a renamed tag.
pub fn renamed_tag(tag: &str) -> Option<&'static str> {
    TAG_RENAMES
        .iter()
        .find(|(from, _)| *from == tag)
        .map(|(_, to)| *to)
}

/// Converts `kebab-case` to `camelCase`. Only a hyphen followed by a
/// lowercase ASCII letter is folded.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Returns the last path segment of `request` without its extension.
pub fn basename(request: &str) -> &str {
    let file = request.rsplit('/').next().unwrap_or(request);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quotes `value` as a single-quoted JavaScript string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders an object key, quoting it when it is not an identifier.
pub fn property_key(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}
