/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Localizer configuration.
//!
//! A configuration is fixed for the lifetime of the contexts created from
//! it. It can be built in code with the `with_*` setters or read from YAML:
//!
//! ```yaml
//! default-locale: en
//! allow-missing: false
//! default-language-on-missing: true
//! execution-budget-ms: 250
//! ```

use crate::error::{LocaleError, Result};
use crate::tag::normalize;
use lingo_template::{DEFAULT_EXECUTION_BUDGET, Sandbox, Scope};
use serde::Deserialize;
use std::time::Duration;

/// Locale used when a requested locale cannot be resolved.
pub const DEFAULT_LOCALE: &str = "en";

/// Options shared by every context of a localizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct Configuration {
    /// Locale of last resort, and the one used when none is requested.
    pub default_locale: String,

    /// Render the key itself instead of failing when it cannot be found.
    pub allow_missing: bool,

    /// Look keys up in the default locale before giving up. Implies
    /// `allow_missing`.
    pub default_language_on_missing: bool,

    /// Wall-clock budget for a single render, in milliseconds.
    pub execution_budget_ms: u64,

    /// Bindings visible to every template, beneath context and per-call
    /// data. The `pluralize` helper is always available underneath.
    #[serde(skip)]
    pub template_data: Scope,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            allow_missing: false,
            default_language_on_missing: false,
            execution_budget_ms: DEFAULT_EXECUTION_BUDGET.as_millis() as u64,
            template_data: Scope::new(),
        }
    }
}

impl Configuration {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: Configuration =
            serde_yaml::from_str(source).map_err(|e| LocaleError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.default_locale = normalize(&self.default_locale);
        if self.default_locale.is_empty() {
            return Err(LocaleError::InvalidConfiguration {
                message: "default-locale must not be empty".to_string(),
            });
        }
        Ok(self)
    }

    pub fn with_default_locale(mut self, locale: &str) -> Self {
        self.default_locale = normalize(locale);
        self
    }

    pub fn with_allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }

    pub fn with_default_language_on_missing(mut self, enabled: bool) -> Self {
        self.default_language_on_missing = enabled;
        self
    }

    pub fn with_execution_budget(mut self, budget: Duration) -> Self {
        self.execution_budget_ms = budget.as_millis() as u64;
        self
    }

    /// Add bindings on top of the existing template data.
    pub fn with_template_data(mut self, data: &Scope) -> Self {
        self.template_data.extend(data);
        self
    }

    /// Whether unresolved keys render as themselves.
    pub fn allows_missing(&self) -> bool {
        self.allow_missing || self.default_language_on_missing
    }

    /// The per-render execution limits.
    pub fn sandbox(&self) -> Sandbox {
        Sandbox::with_budget(Duration::from_millis(self.execution_budget_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.default_locale, "en");
        assert!(!config.allows_missing());
        assert_eq!(config.sandbox().budget(), Duration::from_millis(500));
        assert!(config.template_data.is_empty());
    }

    #[test]
    fn test_default_language_implies_allow_missing() {
        let config = Configuration::default().with_default_language_on_missing(true);
        assert!(!config.allow_missing);
        assert!(config.allows_missing());
    }

    #[test]
    fn test_builder() {
        let config = Configuration::default()
            .with_default_locale("de_AT")
            .with_allow_missing(true)
            .with_execution_budget(Duration::from_millis(20))
            .with_template_data(&[("site", "Example")].into_iter().collect());

        assert_eq!(config.default_locale, "de-at");
        assert!(config.allows_missing());
        assert_eq!(config.execution_budget_ms, 20);
        assert_eq!(config.template_data.get("site").map(|v| v.render()), Some("Example".to_string()));
    }

    #[test]
    fn test_from_yaml() {
        let config = Configuration::from_yaml_str(
            "default-locale: FR_ca\ndefault-language-on-missing: true\nexecution-budget-ms: 100\n",
        )
        .unwrap();
        assert_eq!(config.default_locale, "fr-ca");
        assert!(config.default_language_on_missing);
        assert!(!config.allow_missing);
        assert_eq!(config.execution_budget_ms, 100);
    }

    #[test]
    fn test_from_yaml_partial_uses_defaults() {
        let config = Configuration::from_yaml_str("allow-missing: true\n").unwrap();
        assert_eq!(config.default_locale, "en");
        assert!(config.allow_missing);
        assert_eq!(config.execution_budget_ms, 500);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_fields() {
        let err = Configuration::from_yaml_str("locale: en\n").unwrap_err();
        assert!(matches!(err, LocaleError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_yaml_rejects_empty_locale() {
        let err = Configuration::from_yaml_str("default-locale: '  '\n").unwrap_err();
        assert_eq!(
            err,
            LocaleError::InvalidConfiguration {
                message: "default-locale must not be empty".to_string()
            }
        );
    }
}
