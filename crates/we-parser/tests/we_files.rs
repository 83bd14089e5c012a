use pretty_assertions::assert_eq;
use we_parser::{parse, NodeKind};

const TABBAR: &str = r#"<template>
  <div class="wrapper">
    <wxc-tabbar tab-items="{{tabItems}}" ontabbar-item-clicked="onclick"></wxc-tabbar>
    <text class="title" if="{{!hidden}}">
      {{title}}
    </text>
    <image repeat="{{(i, img) in images}}" src="{{img}}" />
  </div>
</template>

<style>
  .wrapper { flex-direction: column; }
</style>

<script>
  require('weex-components');
  module.exports = {
    data: {
      title: 'Tabs',
      hidden: false,
      images: []
    }
  }
</script>
"#;

fn top_level_names(source: &str) -> Vec<String> {
    let result = parse(source);
    let doc = &result.document;
    doc.children(doc.root())
        .iter()
        .filter_map(|&id| doc.tag_name(id).map(str::to_string))
        .collect()
}

#[test]
fn test_we_file_structure() {
    let result = parse(TABBAR);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(top_level_names(TABBAR), vec!["template", "style", "script"]);

    let doc = &result.document;
    let template = doc.children(doc.root())[0];
    let tags: Vec<&str> = doc
        .descendants(template)
        .filter_map(|id| doc.tag_name(id))
        .collect();
    assert_eq!(tags, vec!["template", "div", "wxc-tabbar", "text", "image"]);
}

#[test]
fn test_we_file_serializes_back() {
    let result = parse(TABBAR);
    let expected = TABBAR.replace(
        r#"src="{{img}}" />"#,
        r#"src="{{img}}"></image>"#,
    );
    assert_eq!(result.document.serialize(), expected);
}

#[test]
fn test_script_text_keeps_parent_link() {
    let result = parse(TABBAR);
    let doc = &result.document;
    let script = doc.children(doc.root())[4];
    assert_eq!(doc.tag_name(script), Some("script"));
    let text = doc.children(script)[0];
    assert_eq!(doc.parent(text), Some(script));
    assert!(matches!(doc.node(text).kind, NodeKind::Text(_)));
    assert!(doc.text_content(script).contains("module.exports"));
}

#[test]
fn test_elements_and_data_script() {
    let source = r#"<element name="item">
  <template><text>{{label}}</text></template>
</element>
<template><item label="a"></item></template>
<script type="data">{ "label": "x" }</script>"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(
        top_level_names(source),
        vec!["element", "template", "script"]
    );

    let doc = &result.document;
    let element = doc.element(doc.children(doc.root())[0]).unwrap();
    assert_eq!(element.attr("name"), Some("item"));
}

#[test]
fn test_broken_markup_still_produces_a_tree() {
    let source = "<template><div><text>unclosed</div></template><script>module.exports = {}";
    let result = parse(source);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(top_level_names(source), vec!["template", "script"]);
    let doc = &result.document;
    let script = doc.children(doc.root())[1];
    assert_eq!(doc.text_content(script), "module.exports = {}");
}
