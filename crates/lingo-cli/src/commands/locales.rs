/*
 * locales.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `lingo locales`: list loaded locales with their key counts.

use anyhow::Result;
use lingo::Localizer;
use std::io::Write;

pub fn execute(localizer: &Localizer, out: &mut impl Write) -> Result<()> {
    for locale in localizer.available_locales() {
        let keys = localizer.resource_keys(&locale).len();
        writeln!(out, "{locale}\t{keys} keys")?;
    }
    Ok(())
}
