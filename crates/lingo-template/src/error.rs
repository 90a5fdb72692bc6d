/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template compilation and execution.

use thiserror::Error;

/// Errors that can occur during template operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// The template source could not be parsed.
    ///
    /// `position` is a byte offset into the template source.
    #[error("Syntax error at offset {position}: {message}")]
    Syntax { message: String, position: usize },

    /// Evaluation failed, either because an expression raised an error or
    /// because the execution budget ran out.
    #[error("Execution error: {message}")]
    Execution { message: String },
}

impl TemplateError {
    /// Build a syntax error at the given byte offset.
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        TemplateError::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Build an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        TemplateError::Execution {
            message: message.into(),
        }
    }

    /// The underlying message, without the error kind prefix.
    pub fn message(&self) -> &str {
        match self {
            TemplateError::Syntax { message, .. } | TemplateError::Execution { message } => {
                message
            }
        }
    }
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
