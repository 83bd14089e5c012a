//! Script rewriting.
//!
//! The script is parsed with swc but never reprinted. Every rewrite is a
//! span edit recorded against the original text, so untouched code keeps its
//! formatting and comments. A first pass over the syntax tree handles loads,
//! imports and member-call idioms and locates the exported definition; the
//! definition object itself is then rewritten by [`crate::export`].

use std::sync::Arc;

use indexmap::IndexSet;
use serde_json::{Map, Value};
use smol_str::SmolStr;
use source_edit::{EditError, SourceEdits, Span};
use swc_common::{BytePos, FileName, SourceMap, Span as SwcSpan, Spanned};
use swc_ecma_ast::{
    AssignExpr, AssignOp, AssignTarget, CallExpr, Callee, Decl, ExportDefaultDecl,
    ExportDefaultExpr, Expr, ExprStmt, ImportDecl, ImportSpecifier, Lit, MemberProp, Module,
    ModuleExportName, ObjectLit, SimpleAssignTarget, Stmt, VarDecl,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::deps::{
    is_component_request, is_library_request, relocate, target_request, Dependencies,
    DependencyKind,
};
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::export::ExportRewriter;
use crate::names::{property_key, quote, PLATFORM_MODULE_PREFIX};

/// Everything the script rewrite needs from the rest of the component.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    /// Whether the component is the entry of a migration unit.
    pub is_entry: bool,
    /// Whether the component is itself a nested element.
    pub nested: bool,
    /// The merged `<script type="data">` literal.
    pub data: Option<&'a Map<String, Value>>,
    /// Tag names used in the template, in first-seen order.
    pub tags: &'a IndexSet<SmolStr>,
    /// Names of the nested elements defined by the component.
    pub elements: &'a [SmolStr],
    /// Elements written next to this one when it is itself nested.
    pub siblings: &'a [SmolStr],
    /// Byte offset of the script text in the `.we` source, for diagnostics.
    pub offset: u32,
}

/// Rewrites the script text of a component.
///
/// Unparsable scripts and conflicting edits leave the text unchanged and
/// report a diagnostic.
pub fn rewrite(source: &str, ctx: &ScriptContext<'_>, diagnostics: &mut Vec<Diagnostic>) -> String {
    let program = match parse_program(source) {
        Ok(program) => program,
        Err((message, span)) => {
            let span = Span::new(span.lo.0, span.hi.0).shift(ctx.offset);
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::ScriptParseError,
                format!("script kept as is, it could not be parsed: {message}"),
                span,
            ));
            return source.to_string();
        }
    };

    let mut visitor = ScriptVisitor::new(source, program.file_start, ctx.offset, ctx.nested);
    match &program.kind {
        ProgramKind::Module(module) => module.visit_with(&mut visitor),
        ProgramKind::Script(script) => script.visit_with(&mut visitor),
    }

    let ScriptVisitor {
        mut edits,
        requests,
        export,
        exports_seen,
        diagnostics: found,
        conflict,
        ..
    } = visitor;
    diagnostics.extend(found);

    let mut deps = if ctx.nested {
        Dependencies::nested()
    } else {
        Dependencies::new()
    };
    for (request, kind) in &requests {
        deps.add_explicit(request, *kind);
    }
    for tag in ctx.tags {
        deps.add_tag(tag);
    }
    for sibling in ctx.siblings {
        deps.add_sibling(sibling);
    }
    for element in ctx.elements {
        deps.add_element(element);
    }
    tracing::debug!(count = deps.len(), "resolved component dependencies");

    match &export {
        Some(export) => {
            let mut rewriter = ExportRewriter::new(
                source,
                program.file_start,
                ctx.offset,
                &mut edits,
                diagnostics,
            );
            rewriter.rewrite(&export.object, ctx, &deps);
        }
        None => {
            if exports_seen == 0 && (!deps.is_empty() || ctx.data.is_some()) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::UnsupportedExportShape,
                    "no exported object literal found; components and data were not added",
                    Span::empty(ctx.offset),
                ));
            }
        }
    }

    let result = match conflict {
        Some(error) => Err(error),
        None => edits.apply(source),
    };
    match result {
        Ok(text) => text,
        Err(error) => {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::EditConflict,
                format!("script kept as is: {error}"),
                Span::empty(ctx.offset),
            ));
            source.to_string()
        }
    }
}

struct ParsedProgram {
    kind: ProgramKind,
    file_start: BytePos,
}

enum ProgramKind {
    Module(Module),
    Script(swc_ecma_ast::Script),
}

/// Parses `source` as a module, falling back to a classic script. Errors
/// carry a message and a span relative to `source`.
fn parse_program(source: &str) -> Result<ParsedProgram, (String, SwcSpan)> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("we-script".into()).into(),
        source.to_string(),
    );
    let file_start = fm.start_pos;
    let syntax = Syntax::Es(EsSyntax {
        jsx: false,
        ..Default::default()
    });

    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
    let module_error = match parser.parse_module() {
        Ok(module) => {
            return Ok(ParsedProgram {
                kind: ProgramKind::Module(module),
                file_start,
            })
        }
        Err(error) => error,
    };

    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
    match parser.parse_script() {
        Ok(script) => Ok(ParsedProgram {
            kind: ProgramKind::Script(script),
            file_start,
        }),
        Err(_) => {
            let span = module_error.span();
            let relative = SwcSpan::new(
                BytePos(span.lo.0.saturating_sub(file_start.0)),
                BytePos(span.hi.0.saturating_sub(file_start.0)),
            );
            Err((module_error.kind().msg().into_owned(), relative))
        }
    }
}

/// The first exported definition object.
struct ExportSite {
    object: ObjectLit,
}

struct ScriptVisitor<'s> {
    source: &'s str,
    file_start: BytePos,
    offset: u32,
    /// Whether in-place component paths resolve from the components directory.
    nested: bool,
    edits: SourceEdits,
    /// Explicit component loads in source order.
    requests: Vec<(String, DependencyKind)>,
    export: Option<ExportSite>,
    exports_seen: usize,
    diagnostics: Vec<Diagnostic>,
    conflict: Option<EditError>,
}

impl<'s> ScriptVisitor<'s> {
    fn new(source: &'s str, file_start: BytePos, offset: u32, nested: bool) -> Self {
        Self {
            source,
            file_start,
            offset,
            nested,
            edits: SourceEdits::new(),
            requests: Vec::new(),
            export: None,
            exports_seen: 0,
            diagnostics: Vec::new(),
            conflict: None,
        }
    }

    fn span(&self, span: SwcSpan) -> Span {
        Span::new(span.lo.0 - self.file_start.0, span.hi.0 - self.file_start.0)
    }

    fn report(&mut self, code: DiagnosticCode, message: impl Into<String>, span: SwcSpan) {
        let span = self.span(span).shift(self.offset);
        self.diagnostics.push(Diagnostic::new(code, message, span));
    }

    /// Records a load that is removed from the script. Component loads become
    /// explicit dependencies; a load of the whole library is dropped.
    fn take_load(&mut self, request: &str, kind: DependencyKind) -> bool {
        if is_component_request(request) {
            self.requests.push((request.to_string(), kind));
            true
        } else {
            is_library_request(request)
        }
    }

    /// Removes declarators initialized with a component load. Returns whether
    /// anything was removed; the kept declarators are visited here.
    fn remove_declarators(&mut self, var: &VarDecl, stmt_span: SwcSpan) -> bool {
        let removed: Vec<bool> = var
            .decls
            .iter()
            .map(|decl| {
                decl.init
                    .as_deref()
                    .and_then(require_request)
                    .is_some_and(|request| {
                        self.take_load(&request, DependencyKind::ExplicitRequest)
                    })
            })
            .collect();

        if !removed.contains(&true) {
            return false;
        }
        if removed.iter().all(|&r| r) {
            let span = self.span(stmt_span);
            self.edits.delete_lines(self.source, span);
            return true;
        }

        let decls = &var.decls;
        for (i, decl) in decls.iter().enumerate() {
            if !removed[i] {
                decl.visit_with(self);
                continue;
            }
            let span = if i + 1 < decls.len() {
                SwcSpan::new(decl.span.lo, decls[i + 1].span.lo)
            } else {
                let kept = removed[..i].iter().rposition(|&r| !r).unwrap_or(0);
                SwcSpan::new(decls[kept].span.hi, decl.span.hi)
            };
            let span = self.span(span);
            self.edits.delete(span);
        }
        true
    }

    /// Counts an exported definition. Returns whether it is the first one.
    fn count_export(&mut self, span: SwcSpan) -> bool {
        self.exports_seen += 1;
        if self.exports_seen > 1 {
            self.report(
                DiagnosticCode::ExtraExport,
                "only the first exported definition is rewritten",
                span,
            );
            return false;
        }
        true
    }

    fn record_export(&mut self, expr: &Expr, span: SwcSpan) {
        if !self.count_export(span) {
            return;
        }
        match unwrap_paren(expr) {
            Expr::Object(object) => {
                self.export = Some(ExportSite {
                    object: object.clone(),
                });
            }
            _ => self.report_unsupported_export(span),
        }
    }

    fn report_unsupported_export(&mut self, span: SwcSpan) {
        self.report(
            DiagnosticCode::UnsupportedExportShape,
            "the exported definition is not an object literal and is kept as is",
            span,
        );
    }

    fn replace(&mut self, span: SwcSpan, text: impl Into<String>) {
        let span = self.span(span);
        self.edits.replace(span, text);
    }
}

impl Visit for ScriptVisitor<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(ExprStmt { span, expr }) => {
                if let Some(request) = require_request(expr) {
                    if self.take_load(&request, DependencyKind::ExplicitRequest) {
                        let span = self.span(*span);
                        self.edits.delete_lines(self.source, span);
                        return;
                    }
                }
            }
            Stmt::Decl(Decl::Var(var)) => {
                if self.remove_declarators(var, var.span) {
                    return;
                }
            }
            _ => {}
        }
        stmt.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, import: &ImportDecl) {
        let request = import.src.value.to_string_lossy().into_owned();
        if self.take_load(&request, DependencyKind::ExplicitImport) {
            let span = self.span(import.span);
            self.edits.delete_lines(self.source, span);
        } else if let Some(module) = request.strip_prefix(PLATFORM_MODULE_PREFIX) {
            self.replace(import.span, platform_import(import, module));
        }
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        call.visit_children_with(self);

        if let Some(request) = require_request_call(call) {
            if let Some(module) = request.strip_prefix(PLATFORM_MODULE_PREFIX) {
                self.replace(call.span, format!("weex.requireModule({})", quote(module)));
            } else if is_component_request(&request) {
                if let Some(arg) = call.args.first() {
                    let path = relocate(target_request(&request), self.nested);
                    self.replace(arg.expr.span(), quote(&path));
                }
            }
            return;
        }

        let Callee::Expr(callee) = &call.callee else {
            return;
        };
        let Expr::Member(member) = callee.as_ref() else {
            return;
        };
        let MemberProp::Ident(method) = &member.prop else {
            return;
        };
        let receiver = match member.obj.as_ref() {
            Expr::This(_) => "this".to_string(),
            Expr::Ident(ident) => ident.sym.to_string(),
            _ => return,
        };
        let Some(first) = call.args.first() else {
            return;
        };

        match method.sym.as_str() {
            "$el" if first.spread.is_none() => {
                let arg = self.span(first.expr.span());
                match self.edits.render(self.source, arg) {
                    Ok(arg) => self.replace(call.span, format!("{receiver}.$refs[{arg}]")),
                    Err(error) => self.conflict = Some(error),
                }
            }
            name @ ("$dispatch" | "$broadcast") => {
                self.replace(method.span, "$emit");
                self.report(
                    DiagnosticCode::NonEquivalentEvent,
                    format!("`{name}` became `$emit`, which only notifies the direct parent"),
                    call.span,
                );
            }
            _ => {}
        }
    }

    fn visit_assign_expr(&mut self, assign: &AssignExpr) {
        if assign.op == AssignOp::Assign && is_module_exports(&assign.left) {
            self.record_export(&assign.right, assign.span);
        }
        assign.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, export: &ExportDefaultExpr) {
        self.record_export(&export.expr, export.span);
        export.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, export: &ExportDefaultDecl) {
        if self.count_export(export.span) {
            self.report_unsupported_export(export.span);
        }
        export.visit_children_with(self);
    }
}

/// Counts the exported definitions of a script, or `None` when it does not
/// parse.
pub(crate) fn count_exports(source: &str) -> Option<usize> {
    let program = parse_program(source).ok()?;
    let mut visitor = ScriptVisitor::new(source, program.file_start, 0, false);
    match &program.kind {
        ProgramKind::Module(module) => module.visit_with(&mut visitor),
        ProgramKind::Script(script) => script.visit_with(&mut visitor),
    }
    Some(visitor.exports_seen)
}

pub(crate) fn unwrap_paren(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_paren(&paren.expr),
        _ => expr,
    }
}

/// Returns the request of a `require('...')` expression.
fn require_request(expr: &Expr) -> Option<String> {
    match unwrap_paren(expr) {
        Expr::Call(call) => require_request_call(call),
        _ => None,
    }
}

fn require_request_call(call: &CallExpr) -> Option<String> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Ident(ident) = callee.as_ref() else {
        return None;
    };
    if ident.sym.as_str() != "require" || call.args.len() != 1 {
        return None;
    }
    let arg = &call.args[0];
    if arg.spread.is_some() {
        return None;
    }
    match arg.expr.as_ref() {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string_lossy().into_owned()),
        _ => None,
    }
}

fn is_module_exports(target: &AssignTarget) -> bool {
    let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = target else {
        return false;
    };
    let Expr::Ident(object) = member.obj.as_ref() else {
        return false;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return false;
    };
    object.sym.as_str() == "module" && prop.sym.as_str() == "exports"
}

/// Renders an `@weex-module` import as `weex.requireModule` declarations.
fn platform_import(import: &ImportDecl, module: &str) -> String {
    let call = format!("weex.requireModule({})", quote(module));
    let mut statements = Vec::new();
    let mut named = Vec::new();

    for specifier in &import.specifiers {
        match specifier {
            ImportSpecifier::Default(default) => {
                statements.push(format!("const {} = {call};", default.local.sym));
            }
            ImportSpecifier::Namespace(namespace) => {
                statements.push(format!("const {} = {call};", namespace.local.sym));
            }
            ImportSpecifier::Named(specifier) => {
                let local = specifier.local.sym.to_string();
                let imported = specifier.imported.as_ref().map(|name| match name {
                    ModuleExportName::Ident(ident) => ident.sym.to_string(),
                    ModuleExportName::Str(s) => s.value.to_string_lossy().into_owned(),
                });
                match imported {
                    Some(imported) if imported != local => {
                        named.push(format!("{}: {local}", property_key(&imported)));
                    }
                    _ => named.push(local),
                }
            }
        }
    }

    if !named.is_empty() {
        statements.push(format!("const {{ {} }} = {call};", named.join(", ")));
    }
    if statements.is_empty() {
        statements.push(format!("{call};"));
    }
    statements.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str, is_entry: bool, tags: &[&str]) -> (String, Vec<Diagnostic>) {
        let tags: IndexSet<SmolStr> = tags.iter().map(|t| SmolStr::new(t)).collect();
        let ctx = ScriptContext {
            is_entry,
            nested: false,
            data: None,
            tags: &tags,
            elements: &[],
            siblings: &[],
            offset: 0,
        };
        let mut diagnostics = Vec::new();
        let out = rewrite(source, &ctx, &mut diagnostics);
        (out, diagnostics)
    }

    #[test]
    fn test_el_becomes_refs() {
        let (out, _) = run(
            "module.exports = {\n  methods: {\n    f() { this.$el('list').scrollTop = 0; vm.$el(name + 'x') }\n  }\n}",
            true,
            &[],
        );
        assert!(out.contains("this.$refs['list'].scrollTop = 0"), "{out}");
        assert!(out.contains("vm.$refs[name + 'x']"), "{out}");
    }

    #[test]
    fn test_el_without_argument_is_kept() {
        let (out, _) = run("module.exports = {}\nthis.$el()", true, &[]);
        assert_eq!(out, "module.exports = {}\nthis.$el()");
    }

    #[test]
    fn test_dispatch_and_broadcast_become_emit() {
        let (out, diagnostics) = run(
            "module.exports = {\n  methods: {\n    f() { this.$dispatch('done', 1); other.$broadcast('x') }\n  }\n}",
            true,
            &[],
        );
        assert!(out.contains("this.$emit('done', 1)"), "{out}");
        assert!(out.contains("other.$emit('x')"), "{out}");
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::NonEquivalentEvent, DiagnosticCode::NonEquivalentEvent]
        );
    }

    #[test]
    fn test_component_loads_are_removed_and_registered() {
        let source = "require('weex-components')\nrequire('./item.we')\nvar util = require('./util')\nmodule.exports = {}\n";
        let (out, _) = run(source, true, &[]);
        assert_eq!(
            out,
            "var util = require('./util')\nmodule.exports = {\n  components: {\n    item: require('./item.vue')\n  },\n}\n"
        );
    }

    #[test]
    fn test_mixed_declarators() {
        let source = "var a = 1, b = require('./b.we'), c = 2\nmodule.exports = {}";
        let (out, _) = run(source, true, &[]);
        assert!(out.starts_with("var a = 1, c = 2\n"), "{out}");

        let source = "var a = 1, b = require('./b.we')\nmodule.exports = {}";
        let (out, _) = run(source, true, &[]);
        assert!(out.starts_with("var a = 1\n"), "{out}");
    }

    #[test]
    fn test_imports() {
        let source = "import Item from './item.we'\nimport 'weex-components'\nimport modal from '@weex-module/modal'\nimport { fetch, get as load } from '@weex-module/stream'\nexport default {}\n";
        let (out, _) = run(source, true, &[]);
        assert_eq!(
            out,
            "const modal = weex.requireModule('modal');\nconst { fetch, get: load } = weex.requireModule('stream');\nexport default {\n  components: {\n    item: require('./item.vue')\n  },\n}\n"
        );
    }

    #[test]
    fn test_platform_module_require() {
        let (out, _) = run(
            "var modal = require('@weex-module/modal')\nmodule.exports = {}",
            true,
            &[],
        );
        assert_eq!(out, "var modal = weex.requireModule('modal')\nmodule.exports = {}");
    }

    #[test]
    fn test_unparsable_script_is_kept() {
        let (out, diagnostics) = run("module.exports = {", true, &["item"]);
        assert_eq!(out, "module.exports = {");
        assert_eq!(diagnostics[0].code, DiagnosticCode::ScriptParseError);
    }

    #[test]
    fn test_non_object_export() {
        let (out, diagnostics) = run("module.exports = factory()", true, &["item"]);
        assert_eq!(out, "module.exports = factory()");
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnsupportedExportShape);
    }

    #[test]
    fn test_default_export_declaration_is_kept() {
        let source = "export default class Card {}";
        let (out, diagnostics) = run(source, false, &["item"]);
        assert_eq!(out, source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnsupportedExportShape);
    }

    #[test]
    fn test_count_exports() {
        assert_eq!(count_exports("module.exports = {}"), Some(1));
        assert_eq!(count_exports("// module.exports = {}\nvar a = 'export default'"), Some(0));
        assert_eq!(count_exports("export default function () {}"), Some(1));
        assert_eq!(count_exports("module.exports = {"), None);
    }

    #[test]
    fn test_extra_export_is_reported() {
        let (_, diagnostics) = run("module.exports = {}\nmodule.exports = {}", true, &[]);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ExtraExport);
    }
}
