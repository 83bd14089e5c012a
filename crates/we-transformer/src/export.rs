//! Rewriting of the exported definition object.
//!
//! All changes are span edits on the original script text:
//! - `data` becomes `props` (components) or a `data` factory (entries)
//! - `ready` becomes `mounted`
//! - the data literal is merged into `data`
//! - a `components` map is placed in front of the existing properties

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use source_edit::{LineIndex, SourceEdits, Span};
use swc_common::{BytePos, Span as SwcSpan, Spanned};
use swc_ecma_ast::{BlockStmt, Expr, ObjectLit, Prop, PropName, PropOrSpread, Stmt};

use crate::data::{object_literal, to_js_literal};
use crate::deps::Dependencies;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::names::{property_key, quote};
use crate::script::{unwrap_paren, ScriptContext};

/// The accepted spellings of `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataKind {
    /// `data: { ... }`
    Object,
    /// `data: function () { return { ... } }`
    Function,
    /// `data() { return { ... } }`
    Method,
}

struct DataShape<'o> {
    kind: DataKind,
    key: SwcSpan,
    /// From the key to the end of the value.
    property: SwcSpan,
    /// The object literal holding the data keys.
    object: &'o ObjectLit,
    /// Statements before the `return` of a factory.
    dropped: usize,
}

/// A property value to append to an object literal.
enum Entry<'v> {
    Code(String),
    Literal(&'v Value),
}

impl Entry<'_> {
    fn render(&self, indent: &str) -> String {
        match self {
            Entry::Code(code) => code.clone(),
            Entry::Literal(value) => to_js_literal(value, indent),
        }
    }
}

/// Properties added in front of the existing ones.
enum Leading<'v> {
    Components,
    Data(&'v Map<String, Value>),
}

pub(crate) struct ExportRewriter<'a> {
    source: &'a str,
    lines: LineIndex,
    file_start: BytePos,
    offset: u32,
    edits: &'a mut SourceEdits,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> ExportRewriter<'a> {
    pub(crate) fn new(
        source: &'a str,
        file_start: BytePos,
        offset: u32,
        edits: &'a mut SourceEdits,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            file_start,
            offset,
            edits,
            diagnostics,
        }
    }

    pub(crate) fn rewrite(
        &mut self,
        object: &ObjectLit,
        ctx: &ScriptContext<'_>,
        deps: &Dependencies,
    ) {
        let mut leading = Vec::new();

        // Whether a `data` key is still there once the rewrite is done.
        let mut data_kept = false;
        let mut returned: Option<&ObjectLit> = None;
        if let Some(prop) = find_prop(object, "data") {
            data_kept = true;
            match data_shape(prop) {
                None => self.report(
                    DiagnosticCode::UnsupportedDataShape,
                    "`data` is kept as is: expected an object literal or a function returning one",
                    prop_span(prop),
                ),
                Some(shape) if ctx.is_entry => {
                    self.normalize_data(&shape);
                    returned = Some(shape.object);
                }
                // An empty `data` has no keys to become props and stays
                // instance state.
                Some(shape) if shape.object.props.is_empty() => {
                    if ctx.data.is_some_and(|data| !data.is_empty()) {
                        self.normalize_data(&shape);
                        returned = Some(shape.object);
                    }
                }
                Some(shape) if find_prop(object, "props").is_some() => self.report(
                    DiagnosticCode::UnsupportedDataShape,
                    "`data` is kept as is because `props` is already defined",
                    shape.property,
                ),
                Some(shape) => {
                    self.data_to_props(&shape);
                    data_kept = false;
                }
            }
        }

        if let Some(prop) = find_prop(object, "ready") {
            self.rename_ready(prop);
        }

        if !deps.is_empty() {
            match find_prop(object, "components") {
                None => leading.push(Leading::Components),
                Some(prop) => match existing_object(prop) {
                    Some(existing) => self.merge_components(existing, deps),
                    None => self.report(
                        DiagnosticCode::ComponentsNotObject,
                        "`components` is not an object literal; dependencies were not registered",
                        prop_span(prop),
                    ),
                },
            }
        }

        if let Some(data) = ctx.data.filter(|data| !data.is_empty()) {
            match returned {
                Some(target) => self.merge_data(target, data),
                None if data_kept => self.report(
                    DiagnosticCode::DataInjectionSkipped,
                    "the data literal was not merged because `data` could not be rewritten",
                    object.span,
                ),
                None => leading.push(Leading::Data(data)),
            }
        }

        self.insert_leading(object, &leading, deps);
    }

    fn span(&self, span: SwcSpan) -> Span {
        Span::new(span.lo.0 - self.file_start.0, span.hi.0 - self.file_start.0)
    }

    fn report(&mut self, code: DiagnosticCode, message: impl Into<String>, span: SwcSpan) {
        let span = self.span(span).shift(self.offset);
        self.diagnostics.push(Diagnostic::new(code, message, span));
    }

    fn indent_at(&self, offset: u32) -> String {
        self.lines.indent_at(self.source, offset.into()).to_string()
    }

    fn insert(&mut self, pos: BytePos, text: impl Into<String>) {
        self.edits.insert(pos.0 - self.file_start.0, text);
    }

    fn replace(&mut self, span: SwcSpan, text: impl Into<String>) {
        let span = self.span(span);
        self.edits.replace(span, text);
    }

    /// Turns an entry's `data` into a factory function.
    fn normalize_data(&mut self, shape: &DataShape<'_>) {
        match shape.kind {
            DataKind::Object => {
                self.insert(shape.object.span.lo, "function () { return ");
                self.insert(shape.object.span.hi, "; }");
            }
            DataKind::Method => self.replace(shape.key, "data: function"),
            DataKind::Function => {}
        }
    }

    /// Turns a component's `data` into `props` with defaults.
    fn data_to_props(&mut self, shape: &DataShape<'_>) {
        match shape.kind {
            DataKind::Object => self.replace(shape.key, "props"),
            DataKind::Function | DataKind::Method => {
                self.replace(
                    SwcSpan::new(shape.property.lo, shape.object.span.lo),
                    "props: ",
                );
                self.replace(
                    SwcSpan::new(shape.object.span.hi, shape.property.hi),
                    "",
                );
                if shape.dropped > 0 {
                    self.report(
                        DiagnosticCode::DataStatementsDropped,
                        format!(
                            "{} statement(s) before the `return` of `data` were dropped",
                            shape.dropped
                        ),
                        shape.property,
                    );
                }
            }
        }

        for prop in &shape.object.props {
            let prop = match prop {
                PropOrSpread::Prop(prop) => prop,
                PropOrSpread::Spread(spread) => {
                    self.report(
                        DiagnosticCode::UnsupportedDataShape,
                        "spread in `data` is kept as is",
                        SwcSpan::new(spread.dot3_token.lo, spread.expr.span().hi),
                    );
                    continue;
                }
            };
            match prop.as_ref() {
                Prop::KeyValue(kv) => {
                    let value = kv.value.span();
                    if matches!(unwrap_paren(&kv.value), Expr::Object(_) | Expr::Array(_)) {
                        self.insert(value.lo, "{ default: function () { return ");
                        self.insert(value.hi, "; } }");
                    } else {
                        self.insert(value.lo, "{ default: ");
                        self.insert(value.hi, " }");
                    }
                }
                Prop::Shorthand(ident) => {
                    self.replace(ident.span, format!("{0}: {{ default: {0} }}", ident.sym));
                }
                other => self.report(
                    DiagnosticCode::UnsupportedDataShape,
                    "only `key: value` entries of `data` become props",
                    prop_span(other),
                ),
            }
        }
    }

    fn rename_ready(&mut self, prop: &Prop) {
        match prop {
            Prop::Shorthand(ident) => self.replace(ident.span, "mounted: ready"),
            Prop::KeyValue(kv) => self.replace(kv.key.span(), "mounted"),
            Prop::Method(method) => self.replace(method.key.span(), "mounted"),
            _ => {}
        }
    }

    fn merge_components(&mut self, existing: &ObjectLit, deps: &Dependencies) {
        let present = object_keys(existing);
        let entries = deps
            .iter()
            .filter(|dep| !present.contains(&dep.key))
            .map(|dep| {
                (
                    property_key(&dep.key),
                    Entry::Code(format!("require({})", quote(&dep.path))),
                )
            })
            .collect();
        self.append_entries(existing, entries);
    }

    fn merge_data(&mut self, target: &ObjectLit, data: &Map<String, Value>) {
        let present = object_keys(target);
        let mut entries = Vec::new();
        for (key, value) in data {
            if present.contains(key) {
                self.report(
                    DiagnosticCode::DataInjectionSkipped,
                    format!("`{key}` from the data literal is already returned by `data`"),
                    target.span,
                );
            } else {
                entries.push((property_key(key), Entry::Literal(value)));
            }
        }
        self.append_entries(target, entries);
    }

    /// Appends properties after the last property of `target`.
    fn append_entries(&mut self, target: &ObjectLit, entries: Vec<(String, Entry<'_>)>) {
        if entries.is_empty() {
            return;
        }
        match target.props.last() {
            Some(last) => {
                let span = self.span(prop_or_spread_span(last));
                let indent = self.indent_at(span.start.into());
                let text: String = entries
                    .iter()
                    .map(|(key, value)| format!(",\n{indent}{key}: {}", value.render(&indent)))
                    .collect();
                self.edits.insert(span.end, text);
            }
            None => {
                let open = target.span.lo.0 - self.file_start.0;
                let base = self.indent_at(open);
                let indent = format!("{base}  ");
                let mut text: String = entries
                    .iter()
                    .map(|(key, value)| format!("\n{indent}{key}: {},", value.render(&indent)))
                    .collect();
                text.push('\n');
                text.push_str(&base);
                self.edits.insert(open + 1, text);
            }
        }
    }

    /// Inserts the generated properties before the first existing one.
    fn insert_leading(&mut self, object: &ObjectLit, leading: &[Leading<'_>], deps: &Dependencies) {
        if leading.is_empty() {
            return;
        }
        match object.props.first() {
            Some(first) => {
                let start = self.span(prop_or_spread_span(first)).start;
                let indent = self.indent_at(start.into());
                for item in leading {
                    let text = render_leading(item, &indent, deps);
                    self.edits.insert(start, format!("{text},\n{indent}"));
                }
            }
            None => {
                let open = object.span.lo.0 - self.file_start.0;
                let base = self.indent_at(open);
                let indent = format!("{base}  ");
                for item in leading {
                    let text = render_leading(item, &indent, deps);
                    self.edits.insert(open + 1, format!("\n{indent}{text},"));
                }
                self.edits.insert(open + 1, format!("\n{base}"));
            }
        }
    }
}

fn render_leading(item: &Leading<'_>, indent: &str, deps: &Dependencies) -> String {
    match item {
        Leading::Components => {
            let entries: Vec<String> = deps
                .render_entries()
                .into_iter()
                .map(|entry| format!("{indent}  {entry}"))
                .collect();
            format!("components: {{\n{}\n{indent}}}", entries.join(",\n"))
        }
        Leading::Data(data) => format!(
            "data: function () {{\n{indent}  return {};\n{indent}}}",
            object_literal(data, &format!("{indent}  "))
        ),
    }
}

fn key_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string_lossy().into_owned()),
        _ => None,
    }
}

fn prop_key(prop: &Prop) -> Option<String> {
    match prop {
        Prop::KeyValue(kv) => key_name(&kv.key),
        Prop::Method(method) => key_name(&method.key),
        Prop::Getter(getter) => key_name(&getter.key),
        Prop::Setter(setter) => key_name(&setter.key),
        Prop::Shorthand(ident) => Some(ident.sym.to_string()),
        _ => None,
    }
}

fn find_prop<'o>(object: &'o ObjectLit, name: &str) -> Option<&'o Prop> {
    object.props.iter().find_map(|prop| match prop {
        PropOrSpread::Prop(prop) if prop_key(prop).as_deref() == Some(name) => Some(prop.as_ref()),
        _ => None,
    })
}

fn object_keys(object: &ObjectLit) -> FxHashSet<String> {
    object
        .props
        .iter()
        .filter_map(|prop| match prop {
            PropOrSpread::Prop(prop) => prop_key(prop),
            PropOrSpread::Spread(_) => None,
        })
        .collect()
}

/// Returns the object literal assigned to a `key: { ... }` property.
fn existing_object(prop: &Prop) -> Option<&ObjectLit> {
    match prop {
        Prop::KeyValue(kv) => match unwrap_paren(&kv.value) {
            Expr::Object(object) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

fn prop_span(prop: &Prop) -> SwcSpan {
    match prop {
        Prop::KeyValue(kv) => SwcSpan::new(kv.key.span().lo, kv.value.span().hi),
        Prop::Method(method) => {
            let function = &method.function;
            let lo = method.key.span().lo.min(function.span.lo);
            let hi = function
                .body
                .as_ref()
                .map_or(function.span.hi, |body| body.span.hi);
            SwcSpan::new(lo, hi)
        }
        Prop::Getter(getter) => getter.span,
        Prop::Setter(setter) => setter.span,
        other => other.span(),
    }
}

fn prop_or_spread_span(prop: &PropOrSpread) -> SwcSpan {
    match prop {
        PropOrSpread::Prop(prop) => prop_span(prop),
        PropOrSpread::Spread(spread) => SwcSpan::new(spread.dot3_token.lo, spread.expr.span().hi),
    }
}

fn data_shape(prop: &Prop) -> Option<DataShape<'_>> {
    match prop {
        Prop::KeyValue(kv) => {
            let property = SwcSpan::new(kv.key.span().lo, kv.value.span().hi);
            match unwrap_paren(&kv.value) {
                Expr::Object(object) => Some(DataShape {
                    kind: DataKind::Object,
                    key: kv.key.span(),
                    property,
                    object,
                    dropped: 0,
                }),
                Expr::Fn(function) => {
                    let function = &function.function;
                    if function.is_async || function.is_generator {
                        return None;
                    }
                    let (object, dropped) = returned_object(function.body.as_ref()?)?;
                    Some(DataShape {
                        kind: DataKind::Function,
                        key: kv.key.span(),
                        property,
                        object,
                        dropped,
                    })
                }
                _ => None,
            }
        }
        Prop::Method(method) => {
            let function = &method.function;
            if function.is_async || function.is_generator {
                return None;
            }
            let body = function.body.as_ref()?;
            let (object, dropped) = returned_object(body)?;
            Some(DataShape {
                kind: DataKind::Method,
                key: method.key.span(),
                property: SwcSpan::new(method.key.span().lo, body.span.hi),
                object,
                dropped,
            })
        }
        _ => None,
    }
}

/// Finds the first top-level `return { ... }` of a function body and the
/// number of statements before it.
fn returned_object(body: &BlockStmt) -> Option<(&ObjectLit, usize)> {
    let (index, ret) = body
        .stmts
        .iter()
        .enumerate()
        .find_map(|(i, stmt)| match stmt {
            Stmt::Return(ret) => Some((i, ret)),
            _ => None,
        })?;
    match ret.arg.as_deref().map(unwrap_paren) {
        Some(Expr::Object(object)) => Some((object, index)),
        _ => None,
    }
}
