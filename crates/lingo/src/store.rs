/*
 * store.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The resource repository.
//!
//! # Invariants
//!
//! 1. **Leaves are renderers**: every leaf reachable from a stored tree was
//!    produced by [`compile_tree`]; raw text is never stored.
//!
//! 2. **Loads are all-or-nothing**: a document is fully compiled before it is
//!    merged, so a failed load leaves earlier state untouched.
//!
//! 3. **Key cache follows writes**: every load or reset of a locale drops
//!    that locale's cached key list before returning.
//!
//! Rendering only needs `&Repository`; loading and resetting need
//! `&mut Repository`, so writers can never overlap live contexts.

use crate::error::Result;
use crate::resource::{Renderer, ResourceTree, collect_keys, compile_tree, deep_merge, lookup};
use crate::tag::normalize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

/// Per-locale compiled resources plus a memo of their key paths.
#[derive(Debug, Default)]
pub struct Repository {
    trees: BTreeMap<String, ResourceTree>,
    key_cache: RwLock<HashMap<String, Arc<[String]>>>,
}

impl Repository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `raw` and deep-merge it into the tree for `locale`.
    pub fn load_resource(&mut self, locale: &str, raw: &serde_json::Value) -> Result<()> {
        let locale = normalize(locale);
        let compiled = compile_tree(&locale, raw)?;
        let incoming = compiled.len();

        deep_merge(self.trees.entry(locale.clone()).or_default(), compiled);
        self.invalidate(&locale);

        tracing::debug!(locale = %locale, top_level_keys = incoming, "Loaded locale resources");
        Ok(())
    }

    /// Drop one locale, or everything when `locale` is `None`.
    pub fn reset_resource(&mut self, locale: Option<&str>) {
        match locale {
            Some(locale) => {
                let locale = normalize(locale);
                self.trees.remove(&locale);
                self.invalidate(&locale);
            }
            None => {
                self.trees.clear();
                self.cache_mut().clear();
            }
        }
    }

    /// Whether resources are loaded for `locale`.
    pub fn has_locale(&self, locale: &str) -> bool {
        self.trees.contains_key(&normalize(locale))
    }

    /// Loaded locale tags, sorted.
    pub fn available_locales(&self) -> Vec<String> {
        self.trees.keys().cloned().collect()
    }

    /// The compiled tree for `locale`.
    pub fn tree(&self, locale: &str) -> Option<&ResourceTree> {
        self.trees.get(&normalize(locale))
    }

    /// The renderer at `key` in exactly `locale`, without any fallback.
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&Renderer> {
        self.tree(locale).and_then(|tree| lookup(tree, key))
    }

    /// Every key path reachable in `locale`, depth first. Unknown locales
    /// have no keys.
    pub fn resource_keys(&self, locale: &str) -> Arc<[String]> {
        let locale = normalize(locale);
        if let Some(keys) = self
            .key_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&locale)
        {
            return Arc::clone(keys);
        }

        let keys: Arc<[String]> = self
            .trees
            .get(&locale)
            .map(collect_keys)
            .unwrap_or_default()
            .into();
        self.key_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(locale, Arc::clone(&keys));
        keys
    }

    /// Keys of `reference` that `target` lacks, in reference order.
    pub fn missing_keys(&self, target: &str, reference: &str) -> Vec<String> {
        let target_keys = self.resource_keys(target);
        let present: HashSet<&str> = target_keys.iter().map(String::as_str).collect();
        self.resource_keys(reference)
            .iter()
            .filter(|key| !present.contains(key.as_str()))
            .cloned()
            .collect()
    }

    /// Keys of `target` that `reference` lacks.
    pub fn overspecified_keys(&self, target: &str, reference: &str) -> Vec<String> {
        self.missing_keys(reference, target)
    }

    /// Share of `reference` keys present in `target`, in `[0, 1]`.
    ///
    /// A reference without keys counts as fully translated.
    pub fn translation_progress(&self, target: &str, reference: &str) -> f64 {
        let total = self.resource_keys(reference).len();
        if total == 0 {
            return 1.0;
        }
        let missing = self.missing_keys(target, reference).len();
        (total - missing) as f64 / total as f64
    }

    /// Coverage of every loaded locale against `reference`.
    pub fn coverage_report(&self, reference: &str) -> CoverageReport {
        let reference = normalize(reference);
        let locales = self
            .trees
            .keys()
            .map(|locale| LocaleCoverage {
                locale: locale.clone(),
                missing: self.missing_keys(locale, &reference),
                overspecified: self.overspecified_keys(locale, &reference),
                progress: self.translation_progress(locale, &reference),
            })
            .collect();

        CoverageReport {
            total_keys: self.resource_keys(&reference).len(),
            reference,
            locales,
        }
    }

    fn invalidate(&mut self, locale: &str) {
        self.cache_mut().remove(locale);
    }

    fn cache_mut(&mut self) -> &mut HashMap<String, Arc<[String]>> {
        self.key_cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Coverage of all loaded locales relative to a reference locale.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// The reference locale tag.
    pub reference: String,
    /// Number of keys in the reference locale.
    pub total_keys: usize,
    /// Per-locale coverage, sorted by tag.
    pub locales: Vec<LocaleCoverage>,
}

/// Coverage statistics for one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleCoverage {
    /// Locale tag.
    pub locale: String,
    /// Reference keys this locale lacks.
    pub missing: Vec<String>,
    /// Keys this locale has that the reference does not.
    pub overspecified: Vec<String>,
    /// Translation progress in `[0, 1]`.
    pub progress: f64,
}
