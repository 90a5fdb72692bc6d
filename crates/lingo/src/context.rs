/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-request locale resolution and rendering.
//!
//! A [`LocaleContext`] is created for one incoming locale tag. It resolves
//! the tag against the loaded locales once, then renders keys through the
//! fallback chain:
//!
//! 1. the effective locale (`pt-br`)
//! 2. its base language (`pt`)
//! 3. the default locale, when `default_language_on_missing` is set
//! 4. the key itself, when missing keys are allowed
//!
//! Templates see a scope built from, lowest first: the configuration's
//! template data, a `locale` binding, the context data and the per-call
//! data. Helpers such as `pluralize` read the effective locale from a
//! reserved binding placed above all of these.

use crate::config::Configuration;
use crate::error::{LocaleError, Result};
use crate::helpers::{HELPER_LOCALE_BINDING, LOCALE_BINDING};
use crate::resource::Renderer;
use crate::store::Repository;
use crate::tag::{LocaleTag, normalize};
use lingo_template::Scope;

/// Rendering state for one request.
#[derive(Debug, Clone)]
pub struct LocaleContext<'a> {
    repository: &'a Repository,
    config: &'a Configuration,
    base_scope: &'a Scope,
    requested: String,
    locale: LocaleTag,
    data: Scope,
}

impl<'a> LocaleContext<'a> {
    /// Resolve `requested` (or the default locale) against `repository`.
    ///
    /// `base_scope` holds the bindings beneath the context data: built-in
    /// helpers and the configuration's template data.
    pub fn new(
        repository: &'a Repository,
        config: &'a Configuration,
        base_scope: &'a Scope,
        requested: Option<&str>,
        data: Scope,
    ) -> Self {
        let mut context = Self {
            repository,
            config,
            base_scope,
            requested: String::new(),
            locale: LocaleTag::new(&config.default_locale),
            data,
        };
        context.set_locale(requested);
        context
    }

    /// Re-run resolution for a new requested tag.
    pub fn set_locale(&mut self, requested: Option<&str>) {
        let requested = requested
            .map(normalize)
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| normalize(&self.config.default_locale));
        let tag = LocaleTag::new(&requested);

        self.locale = if self.repository.has_locale(tag.as_str())
            || self.repository.has_locale(tag.base())
        {
            tag
        } else {
            let fallback = LocaleTag::new(&self.config.default_locale);
            tracing::debug!(
                requested = %requested,
                effective = %fallback,
                "Locale not loaded, using default locale"
            );
            fallback
        };
        self.requested = requested;
    }

    /// The normalized tag that was asked for.
    pub fn requested_locale(&self) -> &str {
        &self.requested
    }

    /// The effective locale.
    pub fn locale(&self) -> &str {
        self.locale.as_str()
    }

    /// The base language of the effective locale.
    pub fn base_locale(&self) -> &str {
        self.locale.base()
    }

    /// Context-level template data.
    pub fn data(&self) -> &Scope {
        &self.data
    }

    /// Mutable context-level template data, for bindings shared by later
    /// renders.
    pub fn data_mut(&mut self) -> &mut Scope {
        &mut self.data
    }

    /// Render `key` with `per_call` data layered over the context data.
    pub fn render(&self, key: &str, per_call: &Scope) -> Result<String> {
        let passthrough;
        let renderer = match self.find(key) {
            Some(renderer) => renderer,
            None if self.config.allows_missing() => {
                tracing::debug!(locale = %self.locale, key, "Key not found, rendering key");
                passthrough = Renderer::Passthrough(key.to_string());
                &passthrough
            }
            None => {
                return Err(LocaleError::ResourceKeyNotFound {
                    locale: self.locale.to_string(),
                    key: key.to_string(),
                });
            }
        };

        let mut scope = Scope::layered([self.base_scope]);
        scope.insert(LOCALE_BINDING, self.locale.as_str());
        scope.extend(&self.data);
        scope.extend(per_call);
        scope.insert(HELPER_LOCALE_BINDING, self.locale.as_str());

        renderer
            .render(&scope, &self.config.sandbox())
            .map_err(|err| LocaleError::TemplateExecution {
                locale: self.locale.to_string(),
                key: key.to_string(),
                message: err.message().to_string(),
            })
    }

    fn find(&self, key: &str) -> Option<&'a Renderer> {
        let repository = self.repository;
        repository
            .lookup(self.locale.as_str(), key)
            .or_else(|| repository.lookup(self.locale.base(), key))
            .or_else(|| {
                self.config
                    .default_language_on_missing
                    .then(|| repository.lookup(&self.config.default_locale, key))
                    .flatten()
            })
    }
}
