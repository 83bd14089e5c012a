//! Component registry assembly.
//!
//! Dependencies come from three places: explicit loads in the script, tag
//! names used in the markup, and nested elements. They are keyed by the
//! basename of their final path, so a tag used in the markup never shadows
//! an explicit load of the same component.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::names::{
    basename, camel_case, is_builtin_tag, property_key, quote, COMPONENTS_DIR, LEGACY_EXTENSION,
    LEGACY_LIBRARY, LIBRARY_TAG_PREFIX, TARGET_EXTENSION, TARGET_LIBRARY,
};

/// How a dependency was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    ExplicitRequest,
    ExplicitImport,
    ImplicitTag,
    NestedElement,
}

/// A resolved component dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The camel-cased registration key.
    pub key: String,
    /// The request path written into the `components` map.
    pub path: String,
    pub kind: DependencyKind,
}

/// An ordered registry of dependencies, unique by path basename.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    entries: IndexMap<SmolStr, Dependency>,
    /// Whether the owning component is written to the components directory.
    nested: bool,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry for a nested element. Relative paths resolve from the
    /// components directory, one level below the file that defined it.
    pub fn nested() -> Self {
        Self {
            entries: IndexMap::new(),
            nested: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.values()
    }

    /// Records an explicit load of a legacy component, keyed by the basename
    /// of the request as written. The first load of a basename wins over
    /// later loads and always wins over an implicit entry.
    pub fn add_explicit(&mut self, request: &str, kind: DependencyKind) {
        let name = SmolStr::new(basename(request));
        let path = relocate(target_request(request), self.nested);
        match self.entries.get(&name) {
            Some(existing) if existing.kind != DependencyKind::ImplicitTag => {}
            _ => {
                self.entries.insert(name.clone(), dependency(&name, path, kind));
            }
        }
    }

    /// Records a tag used in the markup. Built-in tags and tags already
    /// registered are skipped.
    pub fn add_tag(&mut self, tag: &str) {
        if is_builtin_tag(tag) {
            return;
        }
        let name = SmolStr::new(tag);
        if self.entries.contains_key(&name) {
            return;
        }
        let path = match tag.strip_prefix(LIBRARY_TAG_PREFIX) {
            Some(rest) => format!("{TARGET_LIBRARY}/{rest}{TARGET_EXTENSION}"),
            None => relocate(format!("./{tag}{TARGET_EXTENSION}"), self.nested),
        };
        self.entries
            .insert(name.clone(), dependency(&name, path, DependencyKind::ImplicitTag));
    }

    /// Records a nested element. Top-level components find their elements
    /// in the components directory; elements are siblings of each other.
    pub fn add_element(&mut self, element: &str) {
        let path = if self.nested {
            format!("./{element}{TARGET_EXTENSION}")
        } else {
            format!("./{COMPONENTS_DIR}/{element}{TARGET_EXTENSION}")
        };
        let name = SmolStr::new(element);
        self.entries.shift_remove(&name);
        self.entries
            .insert(name.clone(), dependency(&name, path, DependencyKind::NestedElement));
    }

    /// Points a tag at an element written next to this component.
    pub fn add_sibling(&mut self, element: &str) {
        if let Some(dep) = self.entries.get_mut(element) {
            if dep.kind == DependencyKind::ImplicitTag {
                dep.path = format!("./{element}{TARGET_EXTENSION}");
                dep.kind = DependencyKind::NestedElement;
            }
        }
    }

    /// Renders the `key: require('path')` entries of the `components` map.
    pub fn render_entries(&self) -> Vec<String> {
        self.iter()
            .map(|dep| {
                format!(
                    "{}: require({})",
                    property_key(&dep.key),
                    quote(&dep.path)
                )
            })
            .collect()
    }
}

fn dependency(name: &str, path: String, kind: DependencyKind) -> Dependency {
    Dependency {
        key: camel_case(name),
        path,
        kind,
    }
}

/// Maps a legacy component request to its target request.
///
/// `./item.we` becomes `./item.vue`; library requests move to the new
/// library and lose the `wxc-` filename prefix.
pub fn target_request(request: &str) -> String {
    let request = match request.strip_suffix(LEGACY_EXTENSION) {
        Some(stem) => format!("{stem}{TARGET_EXTENSION}"),
        None => request.to_string(),
    };

    let Some(rest) = request
        .strip_prefix(LEGACY_LIBRARY)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return request;
    };

    let (dir, file) = match rest.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, rest),
    };
    let file = file.strip_prefix(LIBRARY_TAG_PREFIX).unwrap_or(file);
    match dir {
        Some(dir) => format!("{TARGET_LIBRARY}/{dir}/{file}"),
        None => format!("{TARGET_LIBRARY}/{file}"),
    }
}

/// Moves a relative path one directory up for a component written to the
/// components directory. Package paths are left alone.
pub fn relocate(path: String, nested: bool) -> String {
    if !nested {
        return path;
    }
    if let Some(rest) = path.strip_prefix("./") {
        format!("../{rest}")
    } else if path.starts_with("../") {
        format!("../{path}")
    } else {
        path
    }
}

/// Returns whether `request` loads a legacy component file.
pub fn is_component_request(request: &str) -> bool {
    request.ends_with(LEGACY_EXTENSION)
}

/// Returns whether `request` loads the whole legacy component library.
pub fn is_library_request(request: &str) -> bool {
    request == LEGACY_LIBRARY
}
