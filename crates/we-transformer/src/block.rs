//! Block segmentation.
//!
//! Splits the top level of a component container into its template, style,
//! script, data literal, typed scripts and nested element definitions. The
//! container is the document root for a file and the element node for a
//! nested `<element>`.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use smol_str::SmolStr;
use we_parser::{Document, NodeId, NodeKind};

use crate::data;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::TransformError;
use crate::names::is_element_tag;
use crate::script;

/// The blocks of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct Blocks {
    /// The first `template` element.
    pub template: Option<NodeId>,
    /// The first non-empty `style` element, holding all style text.
    pub style: Option<NodeId>,
    /// The script element, holding all untyped script text. Synthesized when
    /// the component has none.
    pub script: NodeId,
    /// Keys of every `<script type="data">` block, merged in source order.
    pub data: Option<Map<String, Value>>,
    /// Scripts with any other `type`, first of each type, left in place.
    pub typed_scripts: IndexMap<SmolStr, NodeId>,
    /// Nested element definitions, detached from the container.
    pub elements: Vec<NestedElement>,
}

/// A nested component defined with `<element name="...">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedElement {
    pub name: SmolStr,
    pub node: NodeId,
}

/// Segments the children of `container`.
pub fn segment(
    doc: &mut Document,
    container: NodeId,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Blocks, TransformError> {
    let mut template = None;
    let mut style = None;
    let mut script = None;
    let mut data: Option<Map<String, Value>> = None;
    let mut typed_scripts = IndexMap::new();
    let mut elements = Vec::new();

    for child in doc.children(container).to_vec() {
        let Some(element) = doc.element(child) else {
            continue;
        };
        let span = element.span;
        let name = element.name.clone();

        match name.as_str() {
            "template" => {
                if template.is_none() {
                    template = Some(child);
                } else {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::DuplicateTemplate,
                        "only the first template is converted",
                        span,
                    ));
                }
            }
            "style" => merge_text(doc, &mut style, child),
            "script" => match element.attr("type").map(str::trim) {
                None | Some("") => merge_text(doc, &mut script, child),
                Some("data") => {
                    let source = doc.text_content(child);
                    let map = data::evaluate(&source)
                        .map_err(|message| TransformError::DataLiteral { message, span })?;
                    data.get_or_insert_with(Map::new).extend(map);
                    doc.detach(child);
                }
                Some(kind) => {
                    let kind = SmolStr::new(kind);
                    if typed_scripts.contains_key(&kind) {
                        continue;
                    }
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::PassThroughScript,
                        format!("script of type `{kind}` is kept as is"),
                        span,
                    ));
                    typed_scripts.insert(kind, child);
                }
            },
            tag if is_element_tag(tag) => {
                match element.attr("name").map(str::trim) {
                    Some(name) if is_file_stem(name) => elements.push(NestedElement {
                        name: SmolStr::new(name),
                        node: child,
                    }),
                    Some(name) if !name.is_empty() => diagnostics.push(Diagnostic::new(
                        DiagnosticCode::InvalidElementName,
                        format!("<{tag} name=\"{name}\"> is dropped: the name cannot be a file name"),
                        span,
                    )),
                    _ => diagnostics.push(Diagnostic::new(
                        DiagnosticCode::MissingElementName,
                        format!("<{tag}> without a name is dropped"),
                        span,
                    )),
                }
                doc.detach(child);
            }
            _ => {}
        }
    }

    let script = match script {
        Some(script) => {
            ensure_export(doc, script);
            script
        }
        None => synthesize_script(doc, container),
    };

    tracing::debug!(
        template = template.is_some(),
        style = style.is_some(),
        data = data.is_some(),
        elements = elements.len(),
        "segmented component blocks"
    );

    Ok(Blocks {
        template,
        style,
        script,
        data,
        typed_scripts,
        elements,
    })
}

/// Folds the text of `child` into the block kept in `slot`.
///
/// The first block with text becomes the kept block; the text of later
/// blocks is appended to it on a new line and the later elements are
/// removed. Blocks without text are removed.
fn merge_text(doc: &mut Document, slot: &mut Option<NodeId>, child: NodeId) {
    let text = doc.text_content(child);
    match *slot {
        None if text.is_empty() => doc.detach(child),
        None => {
            doc.set_text_content(child, text);
            *slot = Some(child);
        }
        Some(first) => {
            let mut merged = doc.text_content(first);
            if !merged.is_empty() && !merged.ends_with('\n') && !text.is_empty() {
                merged.push('\n');
            }
            merged.push_str(&text);
            doc.set_text_content(first, merged);
            doc.detach(child);
        }
    }
}

/// Element names become file names in the components directory.
fn is_file_stem(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\', ':'])
}

/// Unparsable scripts are kept as they are, so only a textual check applies.
fn has_export(text: &str) -> bool {
    match script::count_exports(text) {
        Some(count) => count > 0,
        None => text.contains("module.exports") || text.contains("export default"),
    }
}

fn uses_module_syntax(text: &str) -> bool {
    text.lines().map(str::trim_start).any(|line| {
        line.starts_with("import ")
            || line.starts_with("import{")
            || line.starts_with("export ")
            || line.starts_with("export{")
    })
}

fn empty_export(text: &str) -> &'static str {
    if uses_module_syntax(text) {
        "export default {}"
    } else {
        "module.exports = {}"
    }
}

/// Appends an empty export when the script defines none.
fn ensure_export(doc: &mut Document, script: NodeId) {
    let mut text = doc.text_content(script);
    if has_export(&text) {
        return;
    }
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(empty_export(&text));
    text.push('\n');
    doc.set_text_content(script, text);
}

fn synthesize_script(doc: &mut Document, container: NodeId) -> NodeId {
    let script = doc.create(NodeKind::Element(we_parser::Element::new("script")));
    let text = doc.create_text("\nmodule.exports = {}\n");
    doc.append_child(script, text);
    doc.append_child(container, script);
    if container == doc.root() {
        let newline = doc.create_text("\n");
        doc.append_child(container, newline);
    }
    script
}
