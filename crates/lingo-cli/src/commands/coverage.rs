/*
 * coverage.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `lingo coverage`: translation progress of every locale.

use anyhow::Result;
use lingo::Localizer;
use std::io::Write;

pub fn execute(localizer: &Localizer, reference: Option<&str>, out: &mut impl Write) -> Result<()> {
    let report = localizer.coverage_report(reference);
    writeln!(
        out,
        "Reference: {} ({} keys)",
        report.reference, report.total_keys
    )?;

    for locale in &report.locales {
        writeln!(
            out,
            "{}\t{:.1}%\t{} missing\t{} extra",
            locale.locale,
            locale.progress * 100.0,
            locale.missing.len(),
            locale.overspecified.len()
        )?;
        for key in &locale.missing {
            writeln!(out, "  - {key}")?;
        }
        for key in &locale.overspecified {
            writeln!(out, "  + {key}")?;
        }
    }
    Ok(())
}
