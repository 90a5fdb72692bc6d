/*
 * helpers.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in template helpers.

use crate::plural::{DEFAULT_PLURAL_LANGUAGE, PluralEngine, PluralForm};
use lingo_template::{Helper, HelperResult, Scope, Value};
use std::sync::Arc;

/// Name of the scope binding that exposes the effective locale to templates.
/// Template data may shadow it.
pub const LOCALE_BINDING: &str = "locale";

/// Binding that carries the effective locale to helpers. It is inserted
/// after all template data, and `@` cannot start an identifier, so neither
/// data nor templates can change it.
pub const HELPER_LOCALE_BINDING: &str = "@locale";

/// `pluralize(count, forms)`.
///
/// `forms` is a list of words or functions of the count, or a single word.
/// The language comes from the calling scope's [`HELPER_LOCALE_BINDING`].
pub fn pluralize_helper(engine: Arc<PluralEngine>) -> Helper {
    Helper::new("pluralize", move |receiver: &Scope, args: &[Value]| {
        pluralize(&engine, receiver, args)
    })
}

fn pluralize(engine: &PluralEngine, receiver: &Scope, args: &[Value]) -> HelperResult {
    let count = args.first().map_or(0.0, Value::to_number);
    let locale = match receiver.get(HELPER_LOCALE_BINDING) {
        Some(Value::String(tag)) => tag.as_str(),
        _ => DEFAULT_PLURAL_LANGUAGE,
    };

    let items: &[Value] = match args.get(1) {
        None | Some(Value::Null) => &[],
        Some(Value::List(items)) => items,
        Some(single) => std::slice::from_ref(single),
    };

    let mut forms = Vec::with_capacity(items.len());
    for item in items {
        let form = match item {
            Value::String(word) => PluralForm::Literal(word),
            Value::Function(helper) => PluralForm::Computed(Box::new(move |n: f64| {
                helper
                    .call(receiver, &[Value::Number(n)])
                    .map(|value| value.render())
            })),
            other => {
                return Err(format!(
                    "forms must be strings or functions, found {}",
                    other.type_name()
                ));
            }
        };
        forms.push(form);
    }

    engine
        .select_form(count, &forms, locale)
        .map(Value::String)
}
