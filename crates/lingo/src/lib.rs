/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Locale resources, resolution and pluralization.
//!
//! Resource documents are JSON-like trees whose leaves are template
//! strings. [`Localizer::load_resource`] compiles them with
//! [`lingo_template`] and deep-merges them into a per-locale tree. A
//! [`LocaleContext`] resolves a requested locale tag and renders keys through
//! a fallback chain (exact tag, base language, optionally the default
//! locale).
//!
//! Templates can call `pluralize(count, forms)`, which selects a word form
//! using the plural rule of the context's locale.
//!
//! # Example
//!
//! ```
//! use lingo::{Configuration, Localizer};
//! use lingo_template::Scope;
//! use serde_json::json;
//!
//! let mut localizer = Localizer::new(Configuration::default());
//! localizer.load_resource("en", &json!({
//!     "cart": {"items": "You have ${pluralize(count, [\"item\", \"items\"])}"}
//! }))?;
//!
//! let data: Scope = [("count", 3_i64)].into_iter().collect();
//! let text = localizer.render("en-US", "cart.items", &data)?;
//! assert_eq!(text, "You have 3 items");
//! # Ok::<(), lingo::LocaleError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod helpers;
pub mod localizer;
pub mod plural;
pub mod resource;
pub mod store;
pub mod tag;

pub use config::{Configuration, DEFAULT_LOCALE};
pub use context::LocaleContext;
pub use error::{LocaleError, Result};
pub use localizer::Localizer;
pub use plural::{PluralEngine, PluralForm, PluralRule};
pub use resource::{Renderer, ResourceTree, ResourceValue};
pub use store::{CoverageReport, LocaleCoverage, Repository};
pub use tag::LocaleTag;
