//! End-to-end runs of the `we-migrate` binary against a temporary project.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

#[derive(Debug, Deserialize)]
struct JsonReport {
    files: Vec<JsonFile>,
    summary: JsonSummary,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonFile {
    input: String,
    entry: bool,
    status: String,
    output: Option<String>,
    #[serde(default)]
    components: Vec<String>,
    error: Option<String>,
    diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonDiagnostic {
    severity: String,
    code: String,
    message: String,
    start: JsonPosition,
}

#[derive(Debug, Deserialize)]
struct JsonPosition {
    line: u32,
    column: u32,
}

#[derive(Debug, Deserialize)]
struct JsonSummary {
    file_count: usize,
    migrated: usize,
    failed: usize,
}

const INDEX: &str = r#"<template>
  <div>
    <item title="{{title}}"></item>
  </div>
</template>

<script>
  module.exports = {
    data: {
      title: 'Home'
    }
  }
</script>
"#;

const ITEM: &str = r#"<template>
  <text>{{title}}</text>
</template>

<script>
  module.exports = {
    data: {
      title: ''
    },
    methods: {
      tap: function () {
        this.$dispatch('tap')
      }
    }
  }
</script>
"#;

const WITH_ELEMENT: &str = r#"<element name="badge">
  <template><text>{{count}}</text></template>
</element>

<template><badge count="{{n}}"></badge></template>
"#;

fn write(root: &Path, file: &str, content: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/index.we", INDEX);
    write(dir.path(), "src/components/item.we", ITEM);
    write(dir.path(), "src/badge-list.we", WITH_ELEMENT);
    write(dir.path(), "src/node_modules/lib/skip.we", INDEX);
    write(dir.path(), "src/README.md", "not a component");
    dir
}

fn migrate(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_we-migrate"))
        .args(args)
        .current_dir(root)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn json_report(output: &Output) -> JsonReport {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_migrates_into_output_dir() {
    let dir = project();
    let output = migrate(
        dir.path(),
        &["src", "-o", "dist", "-e", "src/index.we", "--format", "json"],
    );
    assert!(output.status.success(), "{output:?}");

    let report = json_report(&output);
    assert_eq!(report.summary.file_count, 3);
    assert_eq!(report.summary.migrated, 3);
    assert_eq!(report.summary.failed, 0);

    let index = fs::read_to_string(dir.path().join("dist/index.vue")).unwrap();
    assert!(index.contains(r#"<item :title="title"></item>"#));
    assert!(index.contains("item: require('./item.vue')"));
    assert!(index.contains("data: function () { return {"));

    let item = fs::read_to_string(dir.path().join("dist/components/item.vue")).unwrap();
    assert!(item.contains("props: {"));
    assert!(item.contains("title: { default: '' }"));
    assert!(item.contains("this.$emit('tap')"));

    let badge = fs::read_to_string(dir.path().join("dist/components/badge.vue")).unwrap();
    assert!(badge.contains("<text>{{count}}</text>"));
    assert!(badge.contains("module.exports = {}"));

    assert!(!dir.path().join("dist/node_modules").exists());
    assert!(!dir.path().join("dist/README.vue").exists());
}

#[test]
fn test_json_report_lists_entries_and_diagnostics() {
    let dir = project();
    let output = migrate(
        dir.path(),
        &["src", "-o", "dist", "-e", "src/index.we", "--format", "json"],
    );
    let report = json_report(&output);

    let index = report
        .files
        .iter()
        .find(|file| file.input.ends_with("index.we"))
        .unwrap();
    assert!(index.entry);
    assert_eq!(index.status, "migrated");
    assert_eq!(index.output.as_deref(), Some("dist/index.vue"));

    let item = report
        .files
        .iter()
        .find(|file| file.input.ends_with("item.we"))
        .unwrap();
    assert!(!item.entry);
    let event = &item.diagnostics[0];
    assert_eq!(event.code, "non-equivalent-event");
    assert_eq!(event.severity, "warning");
    assert_eq!((event.start.line, event.start.column), (12, 9));

    let badge = report
        .files
        .iter()
        .find(|file| file.input.ends_with("badge-list.we"))
        .unwrap();
    assert_eq!(badge.components, vec!["dist/components/badge.vue"]);
}

#[test]
fn test_in_place_output_keeps_directories() {
    let dir = project();
    let output = migrate(dir.path(), &["src/components"]);
    assert!(output.status.success(), "{output:?}");
    assert!(dir.path().join("src/components/item.vue").exists());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "Migrated 1 of 1 file, 1 diagnostic to review\n");
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = project();
    let output = migrate(dir.path(), &["src", "-o", "dist", "--dry-run"]);
    assert!(output.status.success(), "{output:?}");
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_failed_file_does_not_stop_the_batch() {
    let dir = project();
    write(
        dir.path(),
        "src/broken.we",
        "<template><div></div></template>\n<script type=\"data\">{ title: makeTitle() }</script>\n",
    );
    let output = migrate(dir.path(), &["src", "-o", "dist", "--format", "json"]);
    assert_eq!(output.status.code(), Some(1));

    let report = json_report(&output);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.migrated, 3);
    let broken = report
        .files
        .iter()
        .find(|file| file.input.ends_with("broken.we"))
        .unwrap();
    assert_eq!(broken.status, "failed");
    assert!(broken.error.as_deref().unwrap().contains("invalid data literal"));
    assert!(!dir.path().join("dist/broken.vue").exists());
    assert!(dir.path().join("dist/index.vue").exists());
}

#[test]
fn test_config_file() {
    let dir = project();
    write(
        dir.path(),
        "we-migrate.json",
        r#"{ "output": "out", "entry": ["src/index.we"], "ignore": ["**/components/**"] }"#,
    );
    let output = migrate(dir.path(), &["src", "--format", "json"]);
    assert!(output.status.success(), "{output:?}");

    let report = json_report(&output);
    assert_eq!(report.summary.file_count, 2);
    assert!(report.files.iter().any(|file| file.entry));
    assert!(dir.path().join("out/index.vue").exists());
    assert!(!dir.path().join("out/components/item.vue").exists());
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = project();
    write(dir.path(), "we-migrate.json", "{ output: ");
    let output = migrate(dir.path(), &["src"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("src/index.vue").exists());
}
