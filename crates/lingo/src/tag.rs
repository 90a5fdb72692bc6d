/*
 * tag.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Normalized locale tags.

use std::fmt;

/// A normalized locale tag such as `en` or `pt-br`.
///
/// Normalization trims surrounding whitespace, lower-cases, and replaces
/// `_` with `-`. It is idempotent, and every lookup and load goes through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleTag(String);

impl LocaleTag {
    /// Normalize a raw tag.
    pub fn new(raw: &str) -> Self {
        LocaleTag(normalize(raw))
    }

    /// The normalized tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language part before the first hyphen (`pt` for `pt-br`).
    pub fn base(&self) -> &str {
        base_of(&self.0)
    }

    /// The base language as its own tag.
    pub fn base_tag(&self) -> LocaleTag {
        LocaleTag(self.base().to_string())
    }

    /// Whether the tag carries a region or other subtag.
    pub fn has_subtag(&self) -> bool {
        self.0.contains('-')
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocaleTag {
    fn from(raw: &str) -> Self {
        LocaleTag::new(raw)
    }
}

impl From<String> for LocaleTag {
    fn from(raw: String) -> Self {
        LocaleTag::new(&raw)
    }
}

/// Normalize a raw locale tag: `" en_US "` becomes `"en-us"`.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace('_', "-")
}

/// The substring before the first hyphen.
pub fn base_of(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("en_US"), "en-us");
        assert_eq!(normalize("  PT-br "), "pt-br");
        assert_eq!(normalize("zh_Hant_TW"), "zh-hant-tw");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["en_US", " De-AT ", "sr_Latn_RS", "fr", "", "  "] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_base() {
        assert_eq!(LocaleTag::new("pt_BR").base(), "pt");
        assert_eq!(LocaleTag::new("en").base(), "en");
        assert_eq!(LocaleTag::new("zh-Hant-TW").base_tag(), LocaleTag::new("zh"));
        assert!(LocaleTag::new("en-gb").has_subtag());
        assert!(!LocaleTag::new("en").has_subtag());
    }

    #[test]
    fn test_display() {
        assert_eq!(LocaleTag::from("EN_gb").to_string(), "en-gb");
    }
}
