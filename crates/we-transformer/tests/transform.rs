use pretty_assertions::assert_eq;
use we_transformer::{transform, DiagnosticCode, TransformOptions};

fn component(source: &str) -> String {
    transform(source, TransformOptions { is_entry: false })
        .unwrap()
        .content
}

fn entry(source: &str) -> String {
    transform(source, TransformOptions { is_entry: true })
        .unwrap()
        .content
}

const LIST: &str = r#"<template>
  <div class="wrapper">
    <list-item repeat="{{(i, item) in items}}" item="{{item}}" onclick="select"></list-item>
    <text class="title {{active ? 'on' : ''}}" style="color: {{color}};">
      {{title}}
    </text>
  </div>
</template>

<style>
  .wrapper { flex-direction: column; }
</style>

<script>
  require('./list-item.we');
  module.exports = {
    data: {
      title: 'Tabs',
      items: []
    },
    ready: function () {
      this.$el('list').scrollTo(0);
    }
  }
</script>
"#;

const LIST_VUE: &str = r#"<template>
  <div class="wrapper">
    <list-item v-for="(item, i) in items" :item="item" @click.native="select"></list-item>
    <text :class="['title', active ? 'on' : '']" :style="{ color: color }">{{title}}</text>
  </div>
</template>

<style scoped="">
  .wrapper { flex-direction: column; }
</style>

<script>
  module.exports = {
    components: {
      listItem: require('./list-item.vue')
    },
    props: {
      title: { default: 'Tabs' },
      items: { default: function () { return []; } }
    },
    mounted: function () {
      this.$refs['list'].scrollTo(0);
    }
  }
</script>
"#;

#[test]
fn test_component_end_to_end() {
    assert_eq!(component(LIST), LIST_VUE);
}

#[test]
fn test_conditional_pair() {
    let out = component(r#"<template><div if="{{!exp1}}"></div><div else></div></template>"#);
    assert!(out.starts_with(r#"<template><div v-if="!exp1"></div><div v-else=""></div></template>"#));
}

#[test]
fn test_props_defaults() {
    let out = component(
        "<template><div></div></template>\n<script>\nmodule.exports = {\n  data: { level: 1, items: [1,2] }\n}\n</script>\n",
    );
    assert!(
        out.contains(
            "props: { level: { default: 1 }, items: { default: function () { return [1,2]; } } }"
        ),
        "{out}"
    );
}

#[test]
fn test_entry_keeps_data_and_merges_literal() {
    let source = r#"<template><text>{{greeting}} {{name}}</text></template>
<script type="data">{ "name": "weex", "tags": ["a"] }</script>
<script>
module.exports = {
  data: {
    greeting: 'hello'
  }
}
</script>
"#;
    let expected = r#"<template><text>{{greeting}} {{name}}</text></template>

<script>
module.exports = {
  data: function () { return {
    greeting: 'hello',
    name: 'weex',
    tags: [
      'a'
    ]
  }; }
}
</script>
"#;
    assert_eq!(entry(source), expected);
}

#[test]
fn test_library_components() {
    let source = r#"<template>
  <wxc-tabbar tab-items="{{tabItems}}" ontabbar-item-clicked="onclick"></wxc-tabbar>
</template>
<script>
  require('weex-components');
  module.exports = {
    data: { tabItems: [] }
  }
</script>
"#;
    let out = entry(source);
    assert!(out.contains(r#"<wxc-tabbar :tab-items="tabItems" @tabbar-item-clicked="onclick">"#));
    assert!(out.contains("wxcTabbar: require('weex-vue-components/tabbar.vue')"));
    assert!(!out.contains("require('weex-components')"));
}

#[test]
fn test_platform_modules() {
    let source = r#"<script>
var modal = require('@weex-module/modal')
module.exports = {
  methods: {
    toast() { modal.toast({ message: 'hi' }) }
  }
}
</script>"#;
    assert!(entry(source).contains("var modal = weex.requireModule('modal')"));
}

#[test]
fn test_nested_element_files() {
    let source = r#"<element name="row">
  <template><text class="{{cls}}">{{label}}</text></template>
  <script>module.exports = { data: { label: '', cls: 'a' } }</script>
</element>

<template><list><row repeat="{{rows}}" label="{{$value}}"></row></list></template>
<script>module.exports = { data: { rows: [] } }</script>
"#;
    let output = transform(source, TransformOptions { is_entry: true }).unwrap();
    assert_eq!(output.components.len(), 1);

    let row = &output.components[0];
    assert_eq!(row.name, "row");
    assert_eq!(
        row.content,
        r#"
  <template><text :class="[cls]">{{label}}</text></template>
  <script>module.exports = { props: { label: { default: '' }, cls: { default: 'a' } } }</script>
"#
    );

    assert!(output
        .content
        .contains(r#"<row v-for="$value in rows" :label="$value"></row>"#));
    assert!(output
        .content
        .contains("row: require('./components/row.vue')"));
}

#[test]
fn test_nested_element_paths_resolve_from_components_dir() {
    let source = r#"<element name="badge"><template><text>b</text></template></element>
<element name="row">
  <template><div><item></item><badge></badge><wxc-button></wxc-button></div></template>
  <script>
require('./other.we')
module.exports = {
  methods: {
    load() { return lazy(require('./card.we')) }
  }
}
</script>
</element>

<template><list><row></row></list></template>
"#;
    let output = transform(source, TransformOptions::default()).unwrap();
    let names: Vec<&str> = output.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["badge", "row"]);

    let row = &output.components[1].content;
    assert!(row.contains("other: require('../other.vue')"), "{row}");
    assert!(row.contains("item: require('../item.vue')"), "{row}");
    assert!(row.contains("badge: require('./badge.vue')"), "{row}");
    assert!(row.contains("wxcButton: require('weex-vue-components/button.vue')"), "{row}");
    assert!(row.contains("lazy(require('../card.vue'))"), "{row}");
    assert!(!row.contains("./other.we"), "{row}");

    assert!(output
        .content
        .contains("row: require('./components/row.vue')"));
}

#[test]
fn test_split_scripts_are_joined_on_separate_lines() {
    let source = "<template><text>{{a}}</text></template>\n<script>var b = 2</script><script>module.exports = { data: { a: 1 } }</script>\n";
    let output = transform(source, TransformOptions::default()).unwrap();
    assert!(output
        .diagnostics
        .iter()
        .all(|d| d.code != DiagnosticCode::ScriptParseError));
    assert!(output
        .content
        .contains("var b = 2\nmodule.exports = { props: { a: { default: 1 } } }"));
}

#[test]
fn test_best_effort_rewrites_are_reported() {
    let source = r#"<template><div></div></template>
<script>
module.exports = {
  methods: {
    done() { this.$dispatch('done') }
  }
}
</script>"#;
    let output = transform(source, TransformOptions::default()).unwrap();
    assert!(output.content.contains("this.$emit('done')"));
    let diagnostic = &output.diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::NonEquivalentEvent);
    let at = diagnostic.span.range();
    assert_eq!(&source[at], "this.$dispatch('done')");
}
