/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for loading and rendering locale resources.

use lingo_template::TemplateError;
use thiserror::Error;

/// Result type alias for lingo operations.
pub type Result<T> = std::result::Result<T, LocaleError>;

/// Errors that can occur while loading or rendering locale resources.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocaleError {
    /// Loaded data is not an object tree of strings, or a key segment
    /// contains the key separator.
    ///
    /// `path` is empty when the root itself has the wrong type.
    #[error("Invalid resource for locale '{locale}' at '{path}': unexpected {found}")]
    InvalidResourceShape {
        locale: String,
        path: String,
        found: &'static str,
    },

    /// A resource string could not be compiled as a template.
    #[error("Invalid template for key '{key}' in locale '{locale}': {source}")]
    TemplateSyntax {
        locale: String,
        key: String,
        #[source]
        source: TemplateError,
    },

    /// A template failed or ran out of time while rendering.
    #[error("Failed to render key '{key}' in locale '{locale}': {message}")]
    TemplateExecution {
        locale: String,
        key: String,
        message: String,
    },

    /// No renderer was found for a key anywhere in the fallback chain.
    #[error("Resource key '{key}' not found for locale '{locale}'")]
    ResourceKeyNotFound { locale: String, key: String },

    /// A configuration document could not be read.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}
