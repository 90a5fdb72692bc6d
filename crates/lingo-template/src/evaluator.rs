/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template evaluation engine.
//!
//! Expressions are evaluated against a read-only [`Scope`]. The evaluator has
//! no access to anything outside that scope: names that are not bound raise
//! an error, and the only way to run host code is through [`Helper`]s that
//! the caller placed in the scope.
//!
//! [`Helper`]: crate::value::Helper

use crate::ast::{BinaryOp, Constant, Expr, Segment, UnaryOp};
use crate::error::{TemplateError, TemplateResult};
use crate::parser::{Template, TemplateBody};
use crate::sandbox::{Deadline, Sandbox};
use crate::value::{Scope, Value};
use std::cmp::Ordering;

impl Template {
    /// Render this template against `scope` within the limits of `sandbox`.
    ///
    /// Constant templates return their text without evaluation. Any failure
    /// while evaluating an expression, including running out of time, is
    /// reported as [`TemplateError::Execution`]; no partial output is
    /// returned.
    pub fn render(&self, scope: &Scope, sandbox: &Sandbox) -> TemplateResult<String> {
        match &self.body {
            TemplateBody::Constant => Ok(self.source.clone()),
            TemplateBody::Interpolated(segments) => {
                let deadline = sandbox.start();
                render_segments(segments, scope, &deadline).inspect_err(|err| {
                    tracing::debug!(
                        error = %err,
                        budget_ms = sandbox.budget().as_millis() as u64,
                        "Template render aborted"
                    );
                })
            }
        }
    }
}

fn render_segments(
    segments: &[Segment],
    scope: &Scope,
    deadline: &Deadline,
) -> TemplateResult<String> {
    let mut output = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Expression(expr) => {
                let value = evaluate(expr, scope, deadline)?;
                output.push_str(&value.render());
            }
        }
    }
    Ok(output)
}

/// Evaluate a single expression.
pub fn evaluate(expr: &Expr, scope: &Scope, deadline: &Deadline) -> TemplateResult<Value> {
    deadline.check()?;

    match expr {
        Expr::Constant(constant) => Ok(match constant {
            Constant::Null => Value::Null,
            Constant::Bool(b) => Value::Bool(*b),
            Constant::Number(n) => Value::Number(*n),
            Constant::String(s) => Value::String(s.clone()),
        }),

        Expr::Identifier { name, .. } => scope
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::execution(format!("{name} is not defined"))),

        Expr::Array(items) => items
            .iter()
            .map(|item| evaluate(item, scope, deadline))
            .collect::<TemplateResult<Vec<_>>>()
            .map(Value::List),

        Expr::Member {
            object, property, ..
        } => {
            let target = evaluate(object, scope, deadline)?;
            member(&target, property, object)
        }

        Expr::Index { object, index, .. } => {
            let target = evaluate(object, scope, deadline)?;
            let key = evaluate(index, scope, deadline)?;
            index_value(&target, &key, object)
        }

        Expr::Call { callee, args, .. } => {
            let Value::Function(helper) = evaluate(callee, scope, deadline)? else {
                return Err(TemplateError::execution(format!(
                    "{} is not a function",
                    callee.describe()
                )));
            };
            let args = args
                .iter()
                .map(|arg| evaluate(arg, scope, deadline))
                .collect::<TemplateResult<Vec<_>>>()?;
            let result = helper
                .call(scope, &args)
                .map_err(|message| TemplateError::execution(format!("{}: {message}", helper.name())))?;
            // Helpers run host code; re-check the clock once they return.
            deadline.check()?;
            Ok(result)
        }

        Expr::Unary { op, operand } => {
            let value = evaluate(operand, scope, deadline)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!value.is_truthy()),
                UnaryOp::Negate => Value::Number(-value.to_number()),
            })
        }

        Expr::Binary { op, left, right } => {
            let left = evaluate(left, scope, deadline)?;
            match op {
                // Short-circuit: the right side is only evaluated when needed.
                BinaryOp::And if !left.is_truthy() => Ok(left),
                BinaryOp::Or if left.is_truthy() => Ok(left),
                BinaryOp::And | BinaryOp::Or => evaluate(right, scope, deadline),
                _ => {
                    let right = evaluate(right, scope, deadline)?;
                    Ok(apply_binary(*op, &left, &right))
                }
            }
        }

        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if evaluate(test, scope, deadline)?.is_truthy() {
                evaluate(consequent, scope, deadline)
            } else {
                evaluate(alternate, scope, deadline)
            }
        }
    }
}

fn member(target: &Value, property: &str, object: &Expr) -> TemplateResult<Value> {
    match target {
        Value::Null => Err(TemplateError::execution(format!(
            "cannot read property '{property}' of null ({})",
            object.describe()
        ))),
        Value::Map(map) => Ok(map.get(property).cloned().unwrap_or_default()),
        Value::List(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
        Value::String(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        _ => Ok(Value::Null),
    }
}

fn index_value(target: &Value, key: &Value, object: &Expr) -> TemplateResult<Value> {
    match target {
        Value::Null => Err(TemplateError::execution(format!(
            "cannot read index '{}' of null ({})",
            key.render(),
            object.describe()
        ))),
        Value::Map(map) => Ok(map.get(&key.render()).cloned().unwrap_or_default()),
        Value::List(items) => Ok(as_index(key)
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or_default()),
        Value::String(s) => Ok(as_index(key)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        _ => Ok(Value::Null),
    }
}

fn as_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(_) | Value::Number(_))
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if is_numeric(left) && is_numeric(right) {
                Value::Number(left.to_number() + right.to_number())
            } else {
                Value::String(left.render() + &right.render())
            }
        }
        BinaryOp::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Remainder => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Equal => Value::Bool(left == right),
        BinaryOp::NotEqual => Value::Bool(left != right),
        BinaryOp::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LessEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GreaterEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        // Handled with short-circuiting in `evaluate`.
        BinaryOp::And | BinaryOp::Or => Value::Null,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
