//! Evaluation of `<script type="data">` literals.
//!
//! The block holds a plain object literal. It is parsed as a JavaScript
//! expression and folded into JSON without running any code.

use std::sync::Arc;

use serde_json::{Map, Number, Value};
use swc_common::{FileName, SourceMap};
use swc_ecma_ast::{
    ArrayLit, EsVersion, Expr, Lit, ObjectLit, Prop, PropName, PropOrSpread, UnaryExpr, UnaryOp,
};
use swc_ecma_parser::{parse_file_as_expr, EsSyntax, Syntax};

/// Largest integer that survives a round trip through an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Parses `source` and converts it into a JSON object.
pub fn evaluate(source: &str) -> Result<Map<String, Value>, String> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("we-data".into()).into(),
        source.to_string(),
    );
    let expr = parse_file_as_expr(
        &fm,
        Syntax::Es(EsSyntax::default()),
        EsVersion::Es2022,
        None,
        &mut Vec::new(),
    )
    .map_err(|e| format!("parse error: {:?}", e.kind()))?;

    match to_json(&expr)? {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected an object literal, found {}", type_name(&other))),
    }
}

fn to_json(expr: &Expr) -> Result<Value, String> {
    match expr {
        Expr::Paren(paren) => to_json(&paren.expr),
        Expr::Lit(lit) => lit_to_json(lit),
        Expr::Unary(UnaryExpr { op, arg, .. }) => match (op, arg.as_ref()) {
            (UnaryOp::Minus, Expr::Lit(Lit::Num(num))) => number(-num.value),
            (UnaryOp::Plus, Expr::Lit(Lit::Num(num))) => number(num.value),
            _ => Err("unsupported unary expression".to_string()),
        },
        Expr::Array(array) => array_to_json(array),
        Expr::Object(object) => object_to_json(object),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let raw = tpl
                .quasis
                .iter()
                .map(|quasi| quasi.raw.to_string())
                .collect::<String>();
            Ok(Value::String(raw))
        }
        Expr::Tpl(_) => Err("template literal with substitutions".to_string()),
        Expr::Ident(ident) => Err(format!("identifier `{}`", ident.sym)),
        Expr::Call(_) => Err("function call".to_string()),
        Expr::Fn(_) | Expr::Arrow(_) => Err("function".to_string()),
        _ => Err("unsupported expression".to_string()),
    }
}

fn lit_to_json(lit: &Lit) -> Result<Value, String> {
    match lit {
        Lit::Str(s) => Ok(Value::String(s.value.to_string_lossy().into_owned())),
        Lit::Bool(b) => Ok(Value::Bool(b.value)),
        Lit::Null(_) => Ok(Value::Null),
        Lit::Num(num) => number(num.value),
        _ => Err("unsupported literal".to_string()),
    }
}

fn number(value: f64) -> Result<Value, String> {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return Ok(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| format!("number {value} has no JSON form"))
}

fn array_to_json(array: &ArrayLit) -> Result<Value, String> {
    let mut items = Vec::with_capacity(array.elems.len());
    for elem in &array.elems {
        match elem {
            None => items.push(Value::Null),
            Some(elem) if elem.spread.is_some() => {
                return Err("spread element".to_string());
            }
            Some(elem) => items.push(to_json(&elem.expr)?),
        }
    }
    Ok(Value::Array(items))
}

fn object_to_json(object: &ObjectLit) -> Result<Value, String> {
    let mut map = Map::new();
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            return Err("spread property".to_string());
        };
        match prop.as_ref() {
            Prop::KeyValue(kv) => {
                let key = prop_name(&kv.key)?;
                map.insert(key, to_json(&kv.value)?);
            }
            Prop::Shorthand(ident) => {
                return Err(format!("shorthand property `{}`", ident.sym));
            }
            _ => return Err("method or accessor".to_string()),
        }
    }
    Ok(Value::Object(map))
}

fn prop_name(key: &PropName) -> Result<String, String> {
    match key {
        PropName::Ident(ident) => Ok(ident.sym.to_string()),
        PropName::Str(s) => Ok(s.value.to_string_lossy().into_owned()),
        PropName::Num(num) => match number(num.value)? {
            Value::Number(n) => Ok(n.to_string()),
            _ => Err("unsupported numeric key".to_string()),
        },
        _ => Err("computed key".to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Renders a JSON value as a JavaScript literal with identifier keys left
/// unquoted. Nested values are indented by `indent` plus two spaces per level.
pub fn to_js_literal(value: &Value, indent: &str) -> String {
    let mut out = String::new();
    write_js(value, indent, &mut out);
    out
}

/// Renders an object map the way [`to_js_literal`] renders an object value.
pub fn object_literal(map: &Map<String, Value>, indent: &str) -> String {
    let mut out = String::new();
    write_object(map, indent, &mut out);
    out
}

fn write_js(value: &Value, indent: &str, out: &mut String) {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => out.push_str(&value.to_string()),
        Value::String(s) => out.push_str(&crate::names::quote(s)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            let inner = format!("{indent}  ");
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&inner);
                write_js(item, &inner, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(indent);
            out.push(']');
        }
        Value::Object(map) => write_object(map, indent, out),
    }
}

fn write_object(map: &Map<String, Value>, indent: &str, out: &mut String) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    let inner = format!("{indent}  ");
    out.push_str("{\n");
    for (i, (key, item)) in map.iter().enumerate() {
        out.push_str(&inner);
        out.push_str(&crate::names::property_key(key));
        out.push_str(": ");
        write_js(item, &inner, out);
        if i + 1 < map.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(indent);
    out.push('}');
}
