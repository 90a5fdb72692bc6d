/*
 * localizer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The [`Localizer`] ties the repository, configuration and plural engine
//! together.

use crate::config::Configuration;
use crate::context::LocaleContext;
use crate::error::Result;
use crate::helpers::pluralize_helper;
use crate::plural::PluralEngine;
use crate::store::{CoverageReport, Repository};
use lingo_template::Scope;
use std::sync::Arc;

/// Loaded locale resources plus the settings used to render them.
#[derive(Debug)]
pub struct Localizer {
    config: Configuration,
    repository: Repository,
    plurals: Arc<PluralEngine>,
    base_scope: Scope,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl Localizer {
    /// A localizer with no resources and the built-in plural rules.
    pub fn new(config: Configuration) -> Self {
        Self::with_plural_engine(config, PluralEngine::new())
    }

    /// Use a customized plural engine for the `pluralize` helper.
    pub fn with_plural_engine(config: Configuration, plurals: PluralEngine) -> Self {
        let plurals = Arc::new(plurals);

        let mut base_scope = Scope::new();
        base_scope.insert_helper(pluralize_helper(Arc::clone(&plurals)));
        base_scope.extend(&config.template_data);

        Self {
            config,
            repository: Repository::new(),
            plurals,
            base_scope,
        }
    }

    /// The configuration shared by every context.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The loaded resources.
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// The engine behind the `pluralize` helper.
    pub fn plural_engine(&self) -> &Arc<PluralEngine> {
        &self.plurals
    }

    /// Compile and merge resources for `locale`.
    pub fn load_resource(&mut self, locale: &str, raw: &serde_json::Value) -> Result<()> {
        self.repository.load_resource(locale, raw)
    }

    /// Drop one locale, or all of them.
    pub fn reset_resource(&mut self, locale: Option<&str>) {
        self.repository.reset_resource(locale);
    }

    /// Loaded locale tags, sorted.
    pub fn available_locales(&self) -> Vec<String> {
        self.repository.available_locales()
    }

    /// Every key path of `locale`.
    pub fn resource_keys(&self, locale: &str) -> Arc<[String]> {
        self.repository.resource_keys(locale)
    }

    /// Keys of `reference` that `target` lacks.
    pub fn missing_keys(&self, target: &str, reference: &str) -> Vec<String> {
        self.repository.missing_keys(target, reference)
    }

    /// Keys of `target` that `reference` lacks.
    pub fn overspecified_keys(&self, target: &str, reference: &str) -> Vec<String> {
        self.repository.overspecified_keys(target, reference)
    }

    /// Share of `reference` keys present in `target`.
    pub fn translation_progress(&self, target: &str, reference: &str) -> f64 {
        self.repository.translation_progress(target, reference)
    }

    /// Coverage of every locale against `reference`, or the default locale.
    pub fn coverage_report(&self, reference: Option<&str>) -> CoverageReport {
        self.repository
            .coverage_report(reference.unwrap_or(&self.config.default_locale))
    }

    /// Create a rendering context for a requested locale.
    pub fn create_context(&self, locale: Option<&str>, data: Scope) -> LocaleContext<'_> {
        LocaleContext::new(
            &self.repository,
            &self.config,
            &self.base_scope,
            locale,
            data,
        )
    }

    /// Render a single key without keeping a context around.
    pub fn render(&self, locale: &str, key: &str, data: &Scope) -> Result<String> {
        self.create_context(Some(locale), Scope::new())
            .render(key, data)
    }
}
