/*
 * plural.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Plural form selection.
//!
//! Languages are grouped into rule families. Each family maps a count to a
//! zero-based index into the word forms an author supplies for a key, for
//! example `["apple", "apples"]` in English or `["файл", "файла", "файлов"]`
//! in Russian.
//!
//! # Failure Modes
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | Unknown language | Fallback language rule, one warning per tag |
//! | Index past the supplied forms | Last form, one warning per (tag, form count) |
//! | No forms at all | The count itself |

use crate::tag::{LocaleTag, base_of, normalize};
use lingo_template::format_number;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// Language used when neither a tag nor its base has a registered rule.
pub const DEFAULT_PLURAL_LANGUAGE: &str = "en";

/// A plural-rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
    /// `one` vs `other`, singular only for exactly 1 (English, German, ...).
    TwoForm,
    /// `zero/one` vs `other`, singular for 0 and 1 (French, Brazilian Portuguese).
    TwoFormThreshold,
    /// Three forms driven by the last one and two digits (Russian, Ukrainian, ...).
    EastSlavic,
    /// Three forms; singular only for exactly 1, teens take the third form (Polish).
    Polish,
    /// Three forms: 1, 2-4, everything else (Czech, Slovak).
    WestSlavic,
    /// A single form regardless of count (Chinese, Japanese, ...).
    Invariant,
    /// Singular when the count ends in 1 but not 11 (Icelandic, Macedonian).
    Icelandic,
    /// Six forms: zero, one, two, few, many, other (Arabic).
    Arabic,
}

/// Built-in language table. Keys are normalized tags; full tags such as
/// `pt-br` take precedence over their base language.
const LANGUAGE_RULES: &[(&str, PluralRule)] = &[
    ("af", PluralRule::TwoForm),
    ("bg", PluralRule::TwoForm),
    ("ca", PluralRule::TwoForm),
    ("da", PluralRule::TwoForm),
    ("de", PluralRule::TwoForm),
    ("el", PluralRule::TwoForm),
    ("en", PluralRule::TwoForm),
    ("eo", PluralRule::TwoForm),
    ("es", PluralRule::TwoForm),
    ("et", PluralRule::TwoForm),
    ("eu", PluralRule::TwoForm),
    ("fa", PluralRule::TwoForm),
    ("fi", PluralRule::TwoForm),
    ("fo", PluralRule::TwoForm),
    ("gl", PluralRule::TwoForm),
    ("he", PluralRule::TwoForm),
    ("hi", PluralRule::TwoForm),
    ("hu", PluralRule::TwoForm),
    ("it", PluralRule::TwoForm),
    ("nb", PluralRule::TwoForm),
    ("nl", PluralRule::TwoForm),
    ("nn", PluralRule::TwoForm),
    ("no", PluralRule::TwoForm),
    ("pt", PluralRule::TwoForm),
    ("sq", PluralRule::TwoForm),
    ("sv", PluralRule::TwoForm),
    ("sw", PluralRule::TwoForm),
    ("ta", PluralRule::TwoForm),
    ("te", PluralRule::TwoForm),
    ("tr", PluralRule::TwoForm),
    ("ur", PluralRule::TwoForm),
    ("fil", PluralRule::TwoFormThreshold),
    ("fr", PluralRule::TwoFormThreshold),
    ("hy", PluralRule::TwoFormThreshold),
    ("pt-br", PluralRule::TwoFormThreshold),
    ("tl", PluralRule::TwoFormThreshold),
    ("be", PluralRule::EastSlavic),
    ("bs", PluralRule::EastSlavic),
    ("hr", PluralRule::EastSlavic),
    ("ru", PluralRule::EastSlavic),
    ("sr", PluralRule::EastSlavic),
    ("uk", PluralRule::EastSlavic),
    ("pl", PluralRule::Polish),
    ("cs", PluralRule::WestSlavic),
    ("sk", PluralRule::WestSlavic),
    ("id", PluralRule::Invariant),
    ("ja", PluralRule::Invariant),
    ("km", PluralRule::Invariant),
    ("ko", PluralRule::Invariant),
    ("lo", PluralRule::Invariant),
    ("ms", PluralRule::Invariant),
    ("my", PluralRule::Invariant),
    ("th", PluralRule::Invariant),
    ("vi", PluralRule::Invariant),
    ("zh", PluralRule::Invariant),
    ("is", PluralRule::Icelandic),
    ("mk", PluralRule::Icelandic),
    ("ar", PluralRule::Arabic),
];

impl PluralRule {
    /// Look up the built-in rule for an exact normalized tag.
    pub fn for_tag(tag: &str) -> Option<PluralRule> {
        LANGUAGE_RULES
            .iter()
            .find(|(lang, _)| *lang == tag)
            .map(|(_, rule)| *rule)
    }

    /// Number of distinct forms this family can select.
    pub fn form_count(self) -> usize {
        match self {
            PluralRule::Invariant => 1,
            PluralRule::TwoForm | PluralRule::TwoFormThreshold | PluralRule::Icelandic => 2,
            PluralRule::EastSlavic | PluralRule::Polish | PluralRule::WestSlavic => 3,
            PluralRule::Arabic => 6,
        }
    }

    /// Zero-based form index for `count`. Negative counts use their magnitude.
    pub fn index(self, count: f64) -> usize {
        let n = count.abs();
        let units = n % 10.0;
        let tens = n % 100.0;
        let few_units = (2.0..=4.0).contains(&units) && !(10.0..20.0).contains(&tens);

        match self {
            PluralRule::TwoForm => usize::from(n != 1.0),
            PluralRule::TwoFormThreshold => usize::from(n > 1.0),
            PluralRule::EastSlavic => {
                if units == 1.0 && tens != 11.0 {
                    0
                } else if few_units {
                    1
                } else {
                    2
                }
            }
            PluralRule::Polish => {
                if n == 1.0 {
                    0
                } else if few_units {
                    1
                } else {
                    2
                }
            }
            PluralRule::WestSlavic => {
                if n == 1.0 {
                    0
                } else if (2.0..=4.0).contains(&n) {
                    1
                } else {
                    2
                }
            }
            PluralRule::Invariant => 0,
            PluralRule::Icelandic => usize::from(units != 1.0 || tens == 11.0),
            PluralRule::Arabic => {
                if n < 3.0 {
                    n as usize
                } else if (3.0..=10.0).contains(&tens) {
                    3
                } else if tens >= 11.0 {
                    4
                } else {
                    5
                }
            }
        }
    }
}

/// Result of evaluating a computed form.
pub type FormResult = Result<String, String>;

/// One word form supplied by an author.
pub enum PluralForm<'a> {
    /// A word; rendered as `"<count> <word>"`.
    Literal(&'a str),
    /// A function of the raw count producing the final string.
    Computed(Box<dyn Fn(f64) -> FormResult + 'a>),
}

impl std::fmt::Debug for PluralForm<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluralForm::Literal(word) => f.debug_tuple("Literal").field(word).finish(),
            PluralForm::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Selects plural forms, with per-instance warning de-duplication.
#[derive(Debug)]
pub struct PluralEngine {
    fallback_language: String,
    overrides: HashMap<String, PluralRule>,
    warned: Mutex<HashSet<String>>,
}

impl Default for PluralEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PluralEngine {
    /// An engine using the built-in table and English as fallback language.
    pub fn new() -> Self {
        Self {
            fallback_language: DEFAULT_PLURAL_LANGUAGE.to_string(),
            overrides: HashMap::new(),
            warned: Mutex::new(HashSet::new()),
        }
    }

    /// Use another language's rule for unknown tags.
    pub fn with_fallback_language(mut self, tag: &str) -> Self {
        self.fallback_language = normalize(tag);
        self
    }

    /// Register or override the rule for a tag.
    pub fn register(&mut self, tag: &str, rule: PluralRule) {
        self.overrides.insert(normalize(tag), rule);
    }

    fn lookup(&self, tag: &str) -> Option<PluralRule> {
        let exact = self
            .overrides
            .get(tag)
            .copied()
            .or_else(|| PluralRule::for_tag(tag));
        exact.or_else(|| {
            let base = base_of(tag);
            self.overrides
                .get(base)
                .copied()
                .or_else(|| PluralRule::for_tag(base))
        })
    }

    /// The rule for a tag: full tag, then base, then the fallback language.
    ///
    /// The first miss for a given tag is logged; later misses are silent.
    pub fn rule_for(&self, tag: &str) -> PluralRule {
        let tag = LocaleTag::new(tag);
        if let Some(rule) = self.lookup(tag.as_str()) {
            return rule;
        }

        if self.first_time(format!("rule:{tag}")) {
            tracing::warn!(
                locale = %tag,
                fallback = %self.fallback_language,
                "No plural rule for locale, using fallback language rule"
            );
        }
        self.lookup(&self.fallback_language)
            .unwrap_or(PluralRule::TwoForm)
    }

    /// Select and render the form for `count`.
    ///
    /// Literal forms render as `"<count> <word>"`; computed forms receive the
    /// raw count. With no forms the count itself is returned. If the rule
    /// needs more forms than supplied, the last form is used.
    pub fn select_form(&self, count: f64, forms: &[PluralForm<'_>], tag: &str) -> FormResult {
        let Some(last) = forms.len().checked_sub(1) else {
            return Ok(format_number(count));
        };

        let rule = self.rule_for(tag);
        let index = rule.index(count);
        if index > last && self.first_time(format!("clamp:{}:{}", normalize(tag), forms.len())) {
            tracing::warn!(
                locale = %normalize(tag),
                needed = rule.form_count(),
                supplied = forms.len(),
                "Too few plural forms supplied, using the last one"
            );
        }

        match &forms[index.min(last)] {
            PluralForm::Literal(word) => Ok(format!("{} {word}", format_number(count))),
            PluralForm::Computed(func) => func(count),
        }
    }

    /// Convenience for literal-only forms.
    pub fn pluralize(&self, count: f64, words: &[&str], tag: &str) -> String {
        let forms: Vec<PluralForm<'_>> = words.iter().map(|w| PluralForm::Literal(w)).collect();
        // Literal forms cannot fail.
        self.select_form(count, &forms, tag)
            .unwrap_or_else(|_| format_number(count))
    }

    fn first_time(&self, key: String) -> bool {
        self.warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }

    /// Whether a fallback warning has been emitted for `tag`.
    pub fn has_warned(&self, tag: &str) -> bool {
        self.warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&format!("rule:{}", normalize(tag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn indices(rule: PluralRule, counts: &[f64]) -> Vec<usize> {
        counts.iter().map(|&n| rule.index(n)).collect()
    }

    #[test]
    fn test_two_form() {
        assert_eq!(indices(PluralRule::TwoForm, &[0.0, 1.0, 2.0, 11.0, 1.5]), vec![1, 0, 1, 1, 1]);
    }

    #[test]
    fn test_two_form_threshold() {
        assert_eq!(
            indices(PluralRule::TwoFormThreshold, &[0.0, 1.0, 1.5, 2.0, 100.0]),
            vec![0, 0, 1, 1, 1]
        );
    }

    #[test]
    fn test_east_slavic() {
        assert_eq!(
            indices(
                PluralRule::EastSlavic,
                &[1.0, 2.0, 4.0, 5.0, 11.0, 12.0, 14.0, 21.0, 22.0, 25.0, 111.0, 0.0]
            ),
            vec![0, 1, 1, 2, 2, 2, 2, 0, 1, 2, 2, 2]
        );
    }

    #[test]
    fn test_polish() {
        assert_eq!(
            indices(PluralRule::Polish, &[1.0, 2.0, 5.0, 12.0, 21.0, 22.0, 0.0]),
            vec![0, 1, 2, 2, 2, 1, 2]
        );
    }

    #[test]
    fn test_west_slavic() {
        assert_eq!(
            indices(PluralRule::WestSlavic, &[1.0, 2.0, 4.0, 5.0, 22.0]),
            vec![0, 1, 1, 2, 2]
        );
    }

    #[test]
    fn test_invariant() {
        assert_eq!(indices(PluralRule::Invariant, &[0.0, 1.0, 7.0]), vec![0, 0, 0]);
    }

    #[test]
    fn test_icelandic() {
        assert_eq!(
            indices(PluralRule::Icelandic, &[1.0, 2.0, 11.0, 21.0, 111.0]),
            vec![0, 1, 1, 0, 1]
        );
    }

    #[test]
    fn test_arabic() {
        assert_eq!(
            indices(
                PluralRule::Arabic,
                &[0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 99.0, 100.0, 102.0, 103.0, 111.0]
            ),
            vec![0, 1, 2, 3, 3, 4, 4, 5, 5, 3, 4]
        );
    }

    #[test]
    fn test_negative_counts_use_magnitude() {
        assert_eq!(PluralRule::TwoForm.index(-1.0), 0);
        assert_eq!(PluralRule::EastSlavic.index(-3.0), 1);
    }

    #[test]
    fn test_english_literals() {
        let engine = PluralEngine::new();
        assert_eq!(engine.pluralize(1.0, &["apple", "apples"], "en"), "1 apple");
        assert_eq!(engine.pluralize(5.0, &["apple", "apples"], "en"), "5 apples");
        assert_eq!(engine.pluralize(2.5, &["apple", "apples"], "en"), "2.5 apples");
    }

    #[test]
    fn test_full_tag_before_base() {
        let engine = PluralEngine::new();
        assert_eq!(engine.rule_for("pt-BR"), PluralRule::TwoFormThreshold);
        assert_eq!(engine.rule_for("pt_PT"), PluralRule::TwoForm);
        assert_eq!(engine.rule_for("ru-RU"), PluralRule::EastSlavic);
    }

    #[test]
    fn test_unknown_language_falls_back_and_warns_once() {
        let engine = PluralEngine::new();
        assert!(!engine.has_warned("xx"));
        assert_eq!(engine.rule_for("xx"), PluralRule::TwoForm);
        assert!(engine.has_warned("xx"));
        // A second lookup must not register a second warning key.
        assert!(!engine.first_time("rule:xx".to_string()));
        assert_eq!(engine.pluralize(1.0, &["thing", "things"], "xx-yy"), "1 thing");
    }

    #[test]
    fn test_warning_state_is_per_instance() {
        let first = PluralEngine::new();
        let second = PluralEngine::new();
        first.rule_for("zz");
        assert!(first.has_warned("zz"));
        assert!(!second.has_warned("zz"));
    }

    #[test]
    fn test_fallback_language_is_configurable() {
        let engine = PluralEngine::new().with_fallback_language("fr");
        assert_eq!(engine.rule_for("xx"), PluralRule::TwoFormThreshold);
    }

    #[test]
    fn test_register_override() {
        let mut engine = PluralEngine::new();
        engine.register("en_X_PIRATE", PluralRule::Invariant);
        assert_eq!(engine.rule_for("en-x-pirate"), PluralRule::Invariant);
        assert_eq!(engine.rule_for("en"), PluralRule::TwoForm);
    }

    #[test]
    fn test_clamps_to_last_form() {
        let engine = PluralEngine::new();
        // Russian needs three forms; only two supplied.
        assert_eq!(engine.pluralize(5.0, &["файл", "файла"], "ru"), "5 файла");
        assert_eq!(engine.pluralize(100.0, &["x"], "ar"), "100 x");
    }

    #[test]
    fn test_no_forms_returns_count() {
        let engine = PluralEngine::new();
        assert_eq!(engine.select_form(3.0, &[], "en").unwrap(), "3");
    }

    #[test]
    fn test_computed_forms() {
        let engine = PluralEngine::new();
        let forms = [
            PluralForm::Literal("item"),
            PluralForm::Computed(Box::new(|n| Ok(format!("{n} items!")))),
        ];
        assert_eq!(engine.select_form(1.0, &forms, "en").unwrap(), "1 item");
        assert_eq!(engine.select_form(4.0, &forms, "en").unwrap(), "4 items!");

        let failing = [PluralForm::Computed(Box::new(|_| Err("nope".to_string())))];
        assert_eq!(engine.select_form(1.0, &failing, "en").unwrap_err(), "nope");
    }
}
