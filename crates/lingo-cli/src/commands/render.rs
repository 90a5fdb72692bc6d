/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `lingo render <LOCALE> <KEY>`: render one key.
//!
//! Template data comes from `--data` (a JSON object) and repeated
//! `-D NAME=VALUE` definitions, which win over `--data`. A definition's
//! value is read as JSON when it parses (`-D count=3`), otherwise as a
//! plain string (`-D name=Ann`).

use anyhow::{Context, Result};
use lingo::Localizer;
use lingo_template::{Scope, Value};
use std::io::Write;

/// Arguments for the render command
#[derive(Debug, Default)]
pub struct RenderArgs {
    pub locale: String,
    pub key: String,
    /// JSON object with template data
    pub data: Option<String>,
    /// NAME=VALUE definitions
    pub defines: Vec<String>,
}

pub fn execute(localizer: &Localizer, args: &RenderArgs, out: &mut impl Write) -> Result<()> {
    let data = build_scope(args)?;
    let ctx = localizer.create_context(Some(args.locale.as_str()), Scope::new());
    tracing::debug!(requested = %args.locale, effective = ctx.locale(), key = %args.key, "Rendering");

    let text = ctx.render(&args.key, &data)?;
    writeln!(out, "{text}")?;
    Ok(())
}

fn build_scope(args: &RenderArgs) -> Result<Scope> {
    let mut scope = match &args.data {
        Some(json) => {
            let value: serde_json::Value =
                serde_json::from_str(json).context("Invalid --data JSON")?;
            let serde_json::Value::Object(map) = value else {
                anyhow::bail!("--data must be a JSON object");
            };
            Scope::from_json(&map)
        }
        None => Scope::new(),
    };

    for define in &args.defines {
        let (name, raw) = define
            .split_once('=')
            .with_context(|| format!("Invalid definition '{define}', expected NAME=VALUE"))?;
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .map_or_else(|_| Value::from(raw), |json| Value::from_json(&json));
        scope.insert(name.trim(), value);
    }
    Ok(scope)
}
