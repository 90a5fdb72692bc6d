/*
 * localizer_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for loading, resolving and rendering locale resources.
 */

use lingo::{Configuration, LocaleError, Localizer, PluralEngine, PluralRule};
use lingo_template::{Helper, Scope, Value};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

fn scope(entries: &[(&str, &str)]) -> Scope {
    entries.iter().map(|(k, v)| (*k, *v)).collect()
}

fn shop() -> Localizer {
    let mut localizer = Localizer::new(Configuration::default());
    localizer
        .load_resource(
            "en",
            &json!({
                "greeting": "Hello, ${name}",
                "cart": {
                    "summary": "You have ${pluralize(count, [\"apple\", \"apples\"])}",
                    "empty": "Your cart is empty"
                },
                "steps": ["Choose", "Pay"]
            }),
        )
        .unwrap();
    localizer
        .load_resource(
            "pl",
            &json!({
                "cart": {"summary": "Masz ${pluralize(count, [\"jabłko\", \"jabłka\", \"jabłek\"])}"}
            }),
        )
        .unwrap();
    localizer
}

#[test]
fn test_render_with_data() {
    let localizer = shop();
    let text = localizer
        .render("en", "greeting", &scope(&[("name", "Ann")]))
        .unwrap();
    assert_eq!(text, "Hello, Ann");
}

#[test]
fn test_region_falls_back_to_base() {
    let localizer = shop();
    let ctx = localizer.create_context(Some("en-US"), Scope::new());
    assert_eq!(ctx.locale(), "en-us");
    assert_eq!(ctx.base_locale(), "en");
    assert_eq!(
        ctx.render("greeting", &scope(&[("name", "Bo")])).unwrap(),
        "Hello, Bo"
    );
}

#[test]
fn test_exact_locale_wins_over_base_and_default() {
    let config = Configuration::default().with_default_language_on_missing(true);
    let mut localizer = Localizer::new(config);
    localizer.load_resource("en", &json!({"title": "Default"})).unwrap();
    localizer.load_resource("fr", &json!({"title": "Base"})).unwrap();
    localizer.load_resource("fr-ca", &json!({"title": "Exact"})).unwrap();

    let data = Scope::new();
    assert_eq!(localizer.render("fr-CA", "title", &data).unwrap(), "Exact");
    assert_eq!(localizer.render("fr-BE", "title", &data).unwrap(), "Base");
    assert_eq!(localizer.render("de", "title", &data).unwrap(), "Default");
}

#[test]
fn test_allow_missing_returns_key() {
    let mut localizer = Localizer::new(Configuration::default().with_allow_missing(true));
    localizer.load_resource("en", &json!({"a": "A"})).unwrap();
    assert_eq!(
        localizer.render("en", "no.such.key", &Scope::new()).unwrap(),
        "no.such.key"
    );
}

#[test]
fn test_missing_key_is_an_error_by_default() {
    let localizer = shop();
    assert_eq!(
        localizer.render("pl", "greeting", &Scope::new()).unwrap_err(),
        LocaleError::ResourceKeyNotFound {
            locale: "pl".to_string(),
            key: "greeting".to_string()
        }
    );
}

#[test]
fn test_default_language_on_missing() {
    let mut localizer =
        Localizer::new(Configuration::default().with_default_language_on_missing(true));
    localizer.load_resource("en", &json!({"only": "Only in English"})).unwrap();
    localizer.load_resource("de", &json!({"other": "Anderes"})).unwrap();

    assert_eq!(
        localizer.render("de", "only", &Scope::new()).unwrap(),
        "Only in English"
    );
}

#[test]
fn test_pluralize_in_templates() {
    let localizer = shop();
    let mut data = Scope::new();

    data.insert("count", 1_i64);
    assert_eq!(
        localizer.render("en", "cart.summary", &data).unwrap(),
        "You have 1 apple"
    );
    data.insert("count", 5_i64);
    assert_eq!(
        localizer.render("en", "cart.summary", &data).unwrap(),
        "You have 5 apples"
    );
    data.insert("count", 22_i64);
    assert_eq!(
        localizer.render("pl", "cart.summary", &data).unwrap(),
        "Masz 22 jabłka"
    );
    data.insert("count", 12_i64);
    assert_eq!(
        localizer.render("pl", "cart.summary", &data).unwrap(),
        "Masz 12 jabłek"
    );
}

#[test]
fn test_pluralize_directly() {
    let localizer = shop();
    let engine = localizer.plural_engine();
    assert_eq!(engine.pluralize(1.0, &["apple", "apples"], "en"), "1 apple");
    assert_eq!(engine.pluralize(5.0, &["apple", "apples"], "en"), "5 apples");
}

#[test]
fn test_custom_plural_engine() {
    let mut engine = PluralEngine::new();
    engine.register("en", PluralRule::Invariant);
    let mut localizer = Localizer::with_plural_engine(Configuration::default(), engine);
    localizer
        .load_resource("en", &json!({"n": "${pluralize(n, [\"thing\", \"things\"])}"}))
        .unwrap();

    let data: Scope = [("n", 3_i64)].into_iter().collect();
    assert_eq!(localizer.render("en", "n", &data).unwrap(), "3 thing");
}

#[test]
fn test_throwing_template_is_execution_error() {
    let mut localizer = Localizer::default();
    localizer
        .load_resource("en", &json!({"broken": "Value: ${explode()}"}))
        .unwrap();

    let err = localizer.render("en", "broken", &Scope::new()).unwrap_err();
    assert_eq!(
        err,
        LocaleError::TemplateExecution {
            locale: "en".to_string(),
            key: "broken".to_string(),
            message: "explode is not defined".to_string(),
        }
    );
}

#[test]
fn test_slow_helper_times_out() {
    let config = Configuration::default().with_execution_budget(Duration::from_millis(10));
    let mut localizer = Localizer::new(config);
    localizer.load_resource("en", &json!({"slow": "${slow()}"})).unwrap();

    let mut data = Scope::new();
    data.insert_helper(Helper::new("slow", |_: &Scope, _: &[Value]| {
        std::thread::sleep(Duration::from_millis(50));
        Ok(Value::from("done"))
    }));

    let err = localizer.render("en", "slow", &data).unwrap_err();
    let LocaleError::TemplateExecution { message, .. } = err else {
        panic!("expected execution error, got {err:?}");
    };
    assert!(message.contains("timed out"), "unexpected message: {message}");
}

#[test]
fn test_config_template_data_is_visible() {
    let config = Configuration::default().with_template_data(&scope(&[("brand", "Acme")]));
    let mut localizer = Localizer::new(config);
    localizer
        .load_resource("en", &json!({"welcome": "Welcome to ${brand}, ${locale}"}))
        .unwrap();

    assert_eq!(
        localizer.render("en-GB", "welcome", &Scope::new()).unwrap(),
        "Welcome to Acme, en-gb"
    );
}

#[test]
fn test_context_data_and_set_locale() {
    let mut localizer = Localizer::default();
    localizer.load_resource("en", &json!({"hi": "Hi ${name}"})).unwrap();
    localizer.load_resource("es", &json!({"hi": "Hola ${name}"})).unwrap();

    let mut ctx = localizer.create_context(Some("en"), scope(&[("name", "Ana")]));
    assert_eq!(ctx.render("hi", &Scope::new()).unwrap(), "Hi Ana");

    ctx.set_locale(Some("es_MX"));
    assert_eq!(ctx.locale(), "es-mx");
    assert_eq!(ctx.render("hi", &Scope::new()).unwrap(), "Hola Ana");
}

#[test]
fn test_unknown_locale_uses_default() {
    let localizer = shop();
    let ctx = localizer.create_context(Some("tlh"), Scope::new());
    assert_eq!(ctx.requested_locale(), "tlh");
    assert_eq!(ctx.locale(), "en");
}

#[test]
fn test_sequence_keys() {
    let localizer = shop();
    assert_eq!(localizer.render("en", "steps.1", &Scope::new()).unwrap(), "Pay");
    assert_eq!(
        localizer.resource_keys("en").to_vec(),
        vec!["cart.empty", "cart.summary", "greeting", "steps.0", "steps.1"]
    );
}

#[test]
fn test_merge_later_load_wins() {
    let mut localizer = shop();
    localizer
        .load_resource("en", &json!({"greeting": "Hi, ${name}", "cart": {"empty": "Nothing here"}}))
        .unwrap();

    let data = scope(&[("name", "Cy")]);
    assert_eq!(localizer.render("en", "greeting", &data).unwrap(), "Hi, Cy");
    assert_eq!(
        localizer.render("en", "cart.empty", &data).unwrap(),
        "Nothing here"
    );
    assert_eq!(localizer.render("en", "steps.0", &data).unwrap(), "Choose");
}

#[test]
fn test_coverage_queries() {
    let localizer = shop();

    assert_eq!(
        localizer.missing_keys("pl", "en"),
        vec!["cart.empty", "greeting", "steps.0", "steps.1"]
    );
    assert!(localizer.overspecified_keys("pl", "en").is_empty());
    assert_eq!(localizer.translation_progress("pl", "en"), 0.2);
    assert_eq!(localizer.translation_progress("en", "en"), 1.0);

    let report = localizer.coverage_report(None);
    assert_eq!(report.reference, "en");
    assert_eq!(report.total_keys, 5);
    assert_eq!(localizer.available_locales(), vec!["en", "pl"]);
}

#[test]
fn test_reset_resource() {
    let mut localizer = shop();
    localizer.reset_resource(Some("pl"));
    assert_eq!(localizer.available_locales(), vec!["en"]);

    localizer.reset_resource(None);
    assert!(localizer.available_locales().is_empty());
    assert!(localizer.resource_keys("en").is_empty());
}

#[test]
fn test_invalid_resource_rejected() {
    let mut localizer = shop();
    let err = localizer
        .load_resource("en", &json!({"cart": {"count": true}}))
        .unwrap_err();
    assert_eq!(
        err,
        LocaleError::InvalidResourceShape {
            locale: "en".to_string(),
            path: "cart.count".to_string(),
            found: "boolean",
        }
    );

    let err = localizer
        .load_resource("en", &json!({"bad": "${1 +}"}))
        .unwrap_err();
    assert!(matches!(err, LocaleError::TemplateSyntax { ref key, .. } if key == "bad"));

    // Earlier state is untouched.
    assert_eq!(localizer.resource_keys("en").len(), 5);
}

#[test]
fn test_locale_in_data_does_not_change_plural_rule() {
    let mut localizer = Localizer::default();
    localizer
        .load_resource(
            "en",
            &json!({"apples": "${pluralize(n, [\"apple\", \"apples\"])} near ${locale}"}),
        )
        .unwrap();

    let mut data = Scope::new();
    data.insert("n", 0_i64);
    assert_eq!(
        localizer.render("en", "apples", &data).unwrap(),
        "0 apples near en"
    );

    data.insert("locale", "fr");
    assert_eq!(
        localizer.render("en", "apples", &data).unwrap(),
        "0 apples near fr"
    );
}

#[test]
fn test_dotted_key_rejected_at_load() {
    let mut localizer = Localizer::default();
    let err = localizer
        .load_resource("en", &json!({"a.b": "x"}))
        .unwrap_err();
    assert!(matches!(err, LocaleError::InvalidResourceShape { ref path, .. } if path == "a.b"));
    assert!(localizer.resource_keys("en").is_empty());
}

#[test]
fn test_localizer_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Localizer>();
}
