//! Main transformation logic.

use indexmap::IndexSet;
use smol_str::SmolStr;
use we_parser::{Attribute, Document, NodeId};

use crate::block;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::TransformError;
use crate::script::{self, ScriptContext};
use crate::template;

/// Attribute added to the style block.
const SCOPED: &str = "scoped";

/// Options for transformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Whether the file is the entry of a migration unit. Entries keep their
    /// `data` as instance state; other components receive it as `props`.
    pub is_entry: bool,
}

/// The result of transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// The `.vue` component.
    pub content: String,
    /// Nested elements, each to be written as its own `.vue` file. Elements
    /// nested inside elements follow their parent.
    pub components: Vec<NestedComponent>,
    /// Notes about parts of the output that may need a manual edit.
    pub diagnostics: Vec<Diagnostic>,
}

/// A nested element materialized as a standalone component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedComponent {
    pub name: String,
    pub content: String,
}

/// Transforms a `.we` component into a `.vue` component.
///
/// Fails only when a `<script type="data">` block is not a literal; every
/// other problem is reported in [`TransformOutput::diagnostics`].
pub fn transform(source: &str, options: TransformOptions) -> Result<TransformOutput, TransformError> {
    let parsed = we_parser::parse(source);
    let mut doc = parsed.document;
    let mut diagnostics: Vec<Diagnostic> = parsed
        .errors
        .iter()
        .map(|error| Diagnostic::new(DiagnosticCode::MarkupParseError, error.to_string(), error.span))
        .collect();

    let mut components = Vec::new();
    let root = doc.root();
    let content = transform_component(
        &mut doc,
        root,
        Level {
            is_entry: options.is_entry,
            nested: false,
            siblings: &[],
        },
        &mut components,
        &mut diagnostics,
    )?;

    Ok(TransformOutput {
        content,
        components,
        diagnostics,
    })
}

#[derive(Debug, Clone, Copy)]
struct Level<'a> {
    is_entry: bool,
    nested: bool,
    /// Elements written to the same components directory as this one.
    siblings: &'a [SmolStr],
}

/// Transforms the component held by `container` and returns its markup.
fn transform_component(
    doc: &mut Document,
    container: NodeId,
    level: Level<'_>,
    components: &mut Vec<NestedComponent>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<String, TransformError> {
    let blocks = block::segment(doc, container, diagnostics)?;

    let mut tags = IndexSet::new();
    if let Some(template) = blocks.template {
        template::rewrite(doc, template, &mut tags);
    }

    let mut scope: Vec<SmolStr> = level.siblings.to_vec();
    for element in &blocks.elements {
        if !scope.contains(&element.name) {
            scope.push(element.name.clone());
        }
    }

    let mut element_names: Vec<SmolStr> = Vec::new();
    for element in &blocks.elements {
        tracing::debug!(name = %element.name, "transforming nested element");
        let mut inner = Vec::new();
        let content = transform_component(
            doc,
            element.node,
            Level {
                is_entry: false,
                nested: true,
                siblings: &scope,
            },
            &mut inner,
            diagnostics,
        )?;
        components.push(NestedComponent {
            name: element.name.to_string(),
            content,
        });
        components.append(&mut inner);
        if !element_names.contains(&element.name) {
            element_names.push(element.name.clone());
        }
    }

    let text = doc.text_content(blocks.script);
    let offset = doc
        .children(blocks.script)
        .first()
        .and_then(|&child| doc.node(child).as_text())
        .map_or(0, |text| u32::from(text.span.start));
    let ctx = ScriptContext {
        is_entry: level.is_entry,
        nested: level.nested,
        data: blocks.data.as_ref(),
        tags: &tags,
        elements: &element_names,
        siblings: level.siblings,
        offset,
    };
    let code = script::rewrite(&text, &ctx, diagnostics);
    doc.set_text_content(blocks.script, code);

    if let Some(style) = blocks.style {
        if let Some(element) = doc.element_mut(style) {
            element.push_attr(Attribute::new(SCOPED, ""));
        }
    }

    tracing::debug!(
        entry = level.is_entry,
        nested = level.nested,
        typed_scripts = blocks.typed_scripts.len(),
        "transformed component"
    );
    Ok(doc.serialize_children(container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(source: &str, is_entry: bool) -> TransformOutput {
        transform(source, TransformOptions { is_entry }).unwrap()
    }

    #[test]
    fn test_conditional_pair() {
        let output = convert(
            r#"<template><div><div if="{{!exp1}}"></div><div else></div></div></template>"#,
            false,
        );
        assert!(output
            .content
            .starts_with(r#"<template><div><div v-if="!exp1"></div><div v-else=""></div></div></template>"#));
    }

    #[test]
    fn test_style_is_scoped_once() {
        let output = convert(
            "<template><div></div></template><style>.a {}</style><style scoped>.b {}</style>",
            false,
        );
        assert!(output.content.contains("<style scoped=\"\">.a {}\n.b {}</style>"), "{}", output.content);
    }

    #[test]
    fn test_missing_script_gets_components() {
        let output = convert("<template><item></item></template>\n", false);
        assert_eq!(
            output.content,
            "<template><item></item></template>\n<script>\nmodule.exports = {\n  components: {\n    item: require('./item.vue')\n  },\n}\n</script>\n"
        );
    }

    #[test]
    fn test_nested_elements() {
        let source = r#"<element name="row">
<template><cell-item></cell-item></template>
<element name="cell-item"><template><text>x</text></template></element>
</element>
<template><list><row></row></list></template>
<script>module.exports = {}</script>"#;
        let output = convert(source, true);
        let names: Vec<&str> = output.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["row", "cell-item"]);
        assert!(output
            .content
            .contains("row: require('./components/row.vue')"));
        assert!(output.components[0]
            .content
            .contains("cellItem: require('./cell-item.vue')"));
        assert!(!output.content.contains("<element"));
    }

    #[test]
    fn test_invalid_data_literal_fails() {
        let error = transform(
            r#"<template></template><script type="data">{ a: b }</script>"#,
            TransformOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, TransformError::DataLiteral { .. }));
    }

    #[test]
    fn test_markup_errors_become_diagnostics() {
        let output = convert("<template><div></template>", false);
        assert!(output
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MarkupParseError));
    }
}
