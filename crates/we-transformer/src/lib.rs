//! Weex `.we` to Vue `.vue` transformation.
//!
//! This crate rewrites a legacy Weex component into a Vue single-file
//! component. It handles:
//! - Segmenting the file into template, style, script, data and nested
//!   element blocks
//! - Rewriting template directives and interpolated attributes
//! - Rewriting the script: `data` to `props`, `ready` to `mounted`, legacy
//!   call idioms and component loads
//! - Registering the components used by the template
//!
//! # Example
//!
//! ```
//! use we_transformer::{transform, TransformOptions};
//!
//! let source = r#"<template>
//!   <div if="{{show}}"><text>{{title}}</text></div>
//! </template>
//! <script>
//!   module.exports = {
//!     data: { show: true, title: 'hi' }
//!   }
//! </script>
//! "#;
//!
//! let output = transform(source, TransformOptions::default()).unwrap();
//! assert!(output.content.contains(r#"<div v-if="show">"#));
//! assert!(output.content.contains("props: {"));
//! ```

mod block;
mod data;
mod deps;
mod diagnostic;
mod error;
mod export;
mod expression;
mod names;
mod script;
mod template;
mod transform;

pub use deps::{Dependencies, Dependency, DependencyKind};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use error::TransformError;
pub use expression::{compile, Compiled};
pub use names::COMPONENTS_DIR;
pub use transform::{transform, NestedComponent, TransformOptions, TransformOutput};
