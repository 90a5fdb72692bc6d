/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Reads locale files from a directory into a Localizer.
 */

//! Directory loader.
//!
//! Two layouts are recognised, and may be mixed:
//!
//! ```text
//! locales/
//!   en.json            -> locale "en"
//!   de.yaml            -> locale "de"
//!   pt-BR/
//!     common.yml       -> locale "pt-BR"
//!     checkout/cart.json
//! ```
//!
//! Files are loaded in path order, so later files win on shared keys.

use anyhow::{Context, Result};
use lingo::Localizer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A resource file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Parse a document into a JSON value tree.
    pub fn parse(self, source: &str) -> Result<serde_json::Value> {
        let value = match self {
            Format::Json => serde_json::from_str(source)?,
            Format::Yaml => serde_yaml::from_str(source)?,
        };
        Ok(value)
    }
}

/// A resource file and the locale it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    pub locale: String,
    pub path: PathBuf,
    pub format: Format,
}

/// Find every loadable file under `dir`, in path order.
pub fn discover(dir: &Path) -> Result<Vec<LocaleFile>> {
    if !dir.is_dir() {
        anyhow::bail!("Locale directory does not exist: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(format) = Format::from_path(path) else {
            debug!(path = %path.display(), "Skipping file with unknown extension");
            continue;
        };
        let Some(locale) = locale_for(dir, path) else {
            debug!(path = %path.display(), "Skipping file without a locale name");
            continue;
        };

        files.push(LocaleFile {
            locale,
            path: path.to_path_buf(),
            format,
        });
    }
    Ok(files)
}

/// `<dir>/<locale>.<ext>` or `<dir>/<locale>/.../<file>.<ext>`.
fn locale_for(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let mut components = relative.components();
    let first = components.next()?;

    let name = if components.next().is_some() {
        first.as_os_str().to_str()?
    } else {
        path.file_stem()?.to_str()?
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// Load every file under `dir` into `localizer`. Returns the file count.
pub fn load_directory(localizer: &mut Localizer, dir: &Path) -> Result<usize> {
    let files = discover(dir)?;
    for file in &files {
        let source = fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read {}", file.path.display()))?;
        let raw = file
            .format
            .parse(&source)
            .with_context(|| format!("Failed to parse {}", file.path.display()))?;
        localizer
            .load_resource(&file.locale, &raw)
            .with_context(|| format!("Failed to load {}", file.path.display()))?;
        debug!(locale = %file.locale, path = %file.path.display(), "Loaded locale file");
    }
    Ok(files.len())
}
