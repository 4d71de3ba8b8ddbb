//! JSON input to checkable values.

use crate::{DemoError, DemoResult};
use covenant_core::Value;
use serde_json::Value as Json;

/// Convert a JSON value. Integers that fit `i64` become `Int`, other numbers
/// `Float`. Objects are rejected.
pub fn from_json(json: &Json) -> DemoResult<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(from_json).collect::<DemoResult<_>>()?),
        Json::Object(_) => return Err(DemoError::UnsupportedJson { kind: "object" }),
    })
}
