//! Functions available to compiled templates.

use std::sync::Arc;

use minijinja::value::{Value, ValueKind};
use minijinja::{Environment, Error};

use super::compiler::method_field;
use crate::dotenv::EnvVars;

/// Register the template helpers on `env`.
pub(crate) fn register(env: &mut Environment<'_>, vars: Arc<EnvVars>) {
    env.add_function("escape_html", escape_html);
    env.add_function("pairs", pairs);
    env.add_function("count", count);
    env.add_function("method", |verb: String| Value::from_safe_string(method_field(&verb)));
    env.add_function("env", move |key: String, default: Option<Value>| {
        match vars.lookup(&key) {
            Some(value) => Value::from(value),
            None => default.unwrap_or_else(|| Value::from(())),
        }
    });
}

/// Entity-encode `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Target of `{{ expr }}`: the escaped string form of `value`.
///
/// Safe strings pass through. Undefined and none render as nothing, booleans as `1` or
/// nothing.
#[must_use]
pub fn escape_html(value: Value) -> Value {
    if value.is_safe() {
        return value;
    }
    let text = match value.kind() {
        ValueKind::Undefined | ValueKind::None => String::new(),
        ValueKind::Bool => {
            if value.is_true() {
                "1".to_string()
            } else {
                String::new()
            }
        }
        _ => escape_str(&value.to_string()),
    };
    Value::from(text)
}

/// `(key, value)` pairs of a map, or `(index, item)` pairs of a sequence.
fn pairs(value: Value) -> Result<Value, Error> {
    let out: Vec<Value> = match value.kind() {
        ValueKind::Undefined | ValueKind::None => Vec::new(),
        ValueKind::Map => value
            .try_iter()?
            .map(|key| -> Result<Value, Error> {
                let item = value.get_item(&key)?;
                Ok(Value::from(vec![key, item]))
            })
            .collect::<Result<_, Error>>()?,
        _ => value
            .try_iter()?
            .enumerate()
            .map(|(index, item)| Value::from(vec![Value::from(index), item]))
            .collect(),
    };
    Ok(Value::from(out))
}

fn count(value: Value) -> usize {
    value.len().unwrap_or(0)
}
