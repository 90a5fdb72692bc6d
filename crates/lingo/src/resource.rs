/*
 * resource.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiled locale resources.
//!
//! Raw locale data is a JSON-like document whose leaves are template
//! strings. Compilation turns it into a tree of [`ResourceValue`]s whose
//! leaves are always [`Renderer`]s.

use crate::error::{LocaleError, Result};
use lingo_template::{Sandbox, Scope, Template, TemplateResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Separator between key path segments.
pub const KEY_SEPARATOR: char = '.';

/// A mapping from key segment to value. Ordered so key listings are stable.
pub type ResourceTree = BTreeMap<String, ResourceValue>;

/// Something that turns a render scope into a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderer {
    /// A compiled template (constant or interpolated).
    Template(Arc<Template>),
    /// Returns the key itself; used when missing keys are allowed.
    Passthrough(String),
}

impl Renderer {
    /// Render with the given scope and limits.
    pub fn render(&self, scope: &Scope, sandbox: &Sandbox) -> TemplateResult<String> {
        match self {
            Renderer::Template(template) => template.render(scope, sandbox),
            Renderer::Passthrough(key) => Ok(key.clone()),
        }
    }

    /// The template source, or the key for passthrough renderers.
    pub fn source(&self) -> &str {
        match self {
            Renderer::Template(template) => template.source(),
            Renderer::Passthrough(key) => key,
        }
    }
}

/// A compiled resource value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValue {
    /// A leaf.
    Renderer(Renderer),
    /// A nested level addressed by key segment.
    Tree(ResourceTree),
    /// An ordered list addressed by numeric segment.
    Sequence(Vec<ResourceValue>),
}

/// Compile a raw document for `locale` into a resource tree.
///
/// The root must be an object. Strings become renderers, arrays become
/// sequences, objects become trees; any other leaf is rejected, as is any
/// key containing the key separator.
pub fn compile_tree(locale: &str, raw: &serde_json::Value) -> Result<ResourceTree> {
    let serde_json::Value::Object(map) = raw else {
        return Err(LocaleError::InvalidResourceShape {
            locale: locale.to_string(),
            path: String::new(),
            found: json_type_name(raw),
        });
    };

    let mut path = Vec::new();
    compile_object(locale, map, &mut path)
}

fn compile_object(
    locale: &str,
    map: &serde_json::Map<String, serde_json::Value>,
    path: &mut Vec<String>,
) -> Result<ResourceTree> {
    let mut tree = ResourceTree::new();
    for (key, value) in map {
        path.push(key.clone());
        if key.contains(KEY_SEPARATOR) {
            return Err(LocaleError::InvalidResourceShape {
                locale: locale.to_string(),
                path: join_path(path),
                found: "key segment containing '.'",
            });
        }
        let compiled = compile_value(locale, value, path)?;
        path.pop();
        tree.insert(key.clone(), compiled);
    }
    Ok(tree)
}

fn compile_value(
    locale: &str,
    value: &serde_json::Value,
    path: &mut Vec<String>,
) -> Result<ResourceValue> {
    match value {
        serde_json::Value::String(source) => {
            let template =
                Template::compile(source).map_err(|source| LocaleError::TemplateSyntax {
                    locale: locale.to_string(),
                    key: join_path(path),
                    source,
                })?;
            Ok(ResourceValue::Renderer(Renderer::Template(Arc::new(
                template,
            ))))
        }
        serde_json::Value::Object(map) => Ok(ResourceValue::Tree(compile_object(
            locale, map, path,
        )?)),
        serde_json::Value::Array(items) => {
            let mut compiled = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                compiled.push(compile_value(locale, item, path)?);
                path.pop();
            }
            Ok(ResourceValue::Sequence(compiled))
        }
        other => Err(LocaleError::InvalidResourceShape {
            locale: locale.to_string(),
            path: join_path(path),
            found: json_type_name(other),
        }),
    }
}

fn join_path(path: &[String]) -> String {
    path.join(".")
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Merge `incoming` into `target`.
///
/// When both sides hold a tree for a key the trees are merged recursively;
/// in every other case the incoming value replaces the existing one.
pub fn deep_merge(target: &mut ResourceTree, incoming: ResourceTree) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(ResourceValue::Tree(existing)), ResourceValue::Tree(nested)) => {
                deep_merge(existing, nested);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Find the renderer at a dotted key path.
///
/// Numeric segments index into sequences. Paths that end on a tree or a
/// sequence do not resolve.
pub fn lookup<'a>(tree: &'a ResourceTree, key: &str) -> Option<&'a Renderer> {
    let mut segments = key.split(KEY_SEPARATOR);
    let mut current = tree.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            ResourceValue::Tree(map) => map.get(segment)?,
            ResourceValue::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
            ResourceValue::Renderer(_) => return None,
        };
    }

    match current {
        ResourceValue::Renderer(renderer) => Some(renderer),
        ResourceValue::Tree(_) | ResourceValue::Sequence(_) => None,
    }
}

/// Every dotted path that leads to a renderer, depth first.
pub fn collect_keys(tree: &ResourceTree) -> Vec<String> {
    let mut keys = Vec::new();
    for (key, value) in tree {
        collect_value_keys(value, key.clone(), &mut keys);
    }
    keys
}

fn collect_value_keys(value: &ResourceValue, path: String, keys: &mut Vec<String>) {
    match value {
        ResourceValue::Renderer(_) => keys.push(path),
        ResourceValue::Tree(map) => {
            for (key, child) in map {
                collect_value_keys(child, format!("{path}{KEY_SEPARATOR}{key}"), keys);
            }
        }
        ResourceValue::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_value_keys(child, format!("{path}{KEY_SEPARATOR}{index}"), keys);
            }
        }
    }
}
