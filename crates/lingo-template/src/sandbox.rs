/*
 * sandbox.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Execution limits for template evaluation.
//!
//! Evaluation is cooperative: the evaluator calls [`Deadline::check`] before
//! every node and after every helper call, and aborts the render once the
//! wall-clock budget has elapsed. Only the render that ran out of time is
//! affected.

use crate::error::{TemplateError, TemplateResult};
use std::time::{Duration, Instant};

/// Default wall-clock budget for one render.
pub const DEFAULT_EXECUTION_BUDGET: Duration = Duration::from_millis(500);

/// Limits applied to every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sandbox {
    budget: Duration,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self {
            budget: DEFAULT_EXECUTION_BUDGET,
        }
    }
}

impl Sandbox {
    /// A sandbox with the given wall-clock budget.
    pub fn with_budget(budget: Duration) -> Self {
        Self { budget }
    }

    /// The wall-clock budget per render.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Start the clock for one render.
    pub fn start(&self) -> Deadline {
        Deadline {
            started: Instant::now(),
            budget: self.budget,
        }
    }
}

/// A running execution clock.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Fail once the budget has elapsed.
    pub fn check(&self) -> TemplateResult<()> {
        if self.started.elapsed() > self.budget {
            Err(TemplateError::execution(format!(
                "script execution timed out after {}ms",
                self.budget.as_millis()
            )))
        } else {
            Ok(())
        }
    }
}
