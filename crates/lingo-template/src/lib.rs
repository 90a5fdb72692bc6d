/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Sandboxed string templates for lingo locale resources.
//!
//! A template is plain text with embedded `${expression}` spans:
//!
//! - Variables and nested fields: `${name}`, `${user.address.city}`
//! - Indexing: `${items[0]}`, `${user["name"]}`
//! - Helper calls: `${pluralize(count, ["apple", "apples"])}`
//! - Arithmetic, comparison and logic: `${count * 2}`, `${a && b}`
//! - Conditionals: `${count > 1 ? "many" : "one"}`
//! - Escaping: `\${` renders a literal `${`, and `\\${x}` renders a
//!   backslash followed by the value of `x`
//!
//! # Architecture
//!
//! The engine knows nothing about locales. Expressions only see the
//! [`Scope`] passed to [`Template::render`]; host functionality is exposed
//! through [`Helper`]s placed in that scope. Every render runs under a
//! [`Sandbox`] wall-clock budget and either returns the complete output or a
//! [`TemplateError::Execution`].
//!
//! # Example
//!
//! ```
//! use lingo_template::{Sandbox, Scope, Template};
//!
//! let template = Template::compile("Hello, ${name}!")?;
//!
//! let mut scope = Scope::new();
//! scope.insert("name", "World");
//!
//! let output = template.render(&scope, &Sandbox::default())?;
//! assert_eq!(output, "Hello, World!");
//! # Ok::<(), lingo_template::TemplateError>(())
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
mod lexer;
pub mod parser;
pub mod sandbox;
pub mod value;

// Re-export main types at crate root
pub use ast::{BinaryOp, Constant, Expr, Segment, UnaryOp};
pub use error::{TemplateError, TemplateResult};
pub use parser::{EXPRESSION_MARKER, Template};
pub use sandbox::{DEFAULT_EXECUTION_BUDGET, Deadline, Sandbox};
pub use value::{Helper, HelperResult, Scope, Value, format_number};
