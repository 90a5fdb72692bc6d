//! Command implementations for the lingo CLI
//!
//! Each command reads from an already loaded `Localizer` and writes its
//! report to the given output.

pub mod coverage;
pub mod keys;
pub mod locales;
pub mod render;
