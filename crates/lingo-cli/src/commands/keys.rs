/*
 * keys.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `lingo keys <LOCALE>`: print every key path of a locale.

use anyhow::Result;
use lingo::Localizer;
use std::io::Write;

pub fn execute(localizer: &Localizer, locale: &str, out: &mut impl Write) -> Result<()> {
    for key in localizer.resource_keys(locale).iter() {
        writeln!(out, "{key}")?;
    }
    Ok(())
}
