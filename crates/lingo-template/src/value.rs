/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template values, helpers and the render scope.
//!
//! A [`Scope`] is the only thing an expression can see. It is built fresh
//! for every render by the caller, so nothing an evaluation does can leak
//! into a later render.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Result returned by a [`Helper`]. Errors are plain messages; the evaluator
/// wraps them into an execution error.
pub type HelperResult = Result<Value, String>;

type HelperFn = dyn Fn(&Scope, &[Value]) -> HelperResult + Send + Sync;

/// A host function callable from inside a template.
///
/// Helpers are invoked with the enclosing render scope as their receiver, so
/// a helper such as `pluralize` can read ambient bindings (for example the
/// active `locale`) without the template passing them explicitly.
#[derive(Clone)]
pub struct Helper {
    name: Arc<str>,
    func: Arc<HelperFn>,
}

impl Helper {
    /// Wrap a closure as a named helper.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Scope, &[Value]) -> HelperResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The helper's name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the helper with `receiver` as its scope.
    pub fn call(&self, receiver: &Scope, args: &[Value]) -> HelperResult {
        (self.func)(receiver, args)
    }

    /// Whether two handles refer to the same underlying function.
    pub fn ptr_eq(&self, other: &Helper) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Helper({})", self.name)
    }
}

/// A value that can appear in a render scope or be produced by an expression.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or explicitly null.
    #[default]
    Null,

    /// A boolean value.
    Bool(bool),

    /// A number. All numbers are doubles, as in the data formats we load.
    Number(f64),

    /// A string value.
    String(String),

    /// A list of values.
    List(Vec<Value>),

    /// A map of string keys to values.
    Map(IndexMap<String, Value>),

    /// A callable helper.
    Function(Helper),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Truthiness used by `!`, `&&`, `||` and `?:`.
    ///
    /// `false`, `null`, `0`, `NaN` and the empty string are falsy; everything
    /// else, including empty lists and maps, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Function(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic and ordering.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::List(_) | Value::Map(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// Render this value as output text.
    ///
    /// - Null: ""
    /// - Number: integral values without a fractional part
    /// - List: elements joined with ","
    /// - Map: "[object]"
    /// - Function: "[function name]"
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(","),
            Value::Map(_) => "[object]".to_string(),
            Value::Function(helper) => format!("[function {}]", helper.name()),
        }
    }

    /// Short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// Convert a JSON value into a template value.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Helper> for Value {
    fn from(helper: Helper) -> Self {
        Value::Function(helper)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Format a number the way templates print it: `5`, `2.5`, `-0` as `0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Variable bindings visible to a template during one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    variables: IndexMap<String, Value>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope by stacking layers; later layers override earlier ones.
    pub fn layered<'a>(layers: impl IntoIterator<Item = &'a Scope>) -> Scope {
        let mut scope = Scope::new();
        for layer in layers {
            scope.extend(layer);
        }
        scope
    }

    /// Build a scope from the entries of a JSON object.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Scope {
        Scope {
            variables: map
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v)))
                .collect(),
        }
    }

    /// Insert a binding, replacing any existing one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Register a helper under its own name.
    pub fn insert_helper(&mut self, helper: Helper) {
        self.variables
            .insert(helper.name().to_string(), Value::Function(helper));
    }

    /// Look up a binding.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Remove a binding.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.variables.shift_remove(key)
    }

    /// Whether a binding exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// Copy every binding of `other` into this scope, overriding collisions.
    pub fn extend(&mut self, other: &Scope) {
        for (k, v) in &other.variables {
            self.variables.insert(k.clone(), v.clone());
        }
    }

    /// Iterate over bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the scope has no bindings.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Scope {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
