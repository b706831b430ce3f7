//! Recursive structural matching of responses against expected-value templates

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected-value template for one response fragment.
///
/// Matching is one-directional containment: the template lists what must be
/// present, extra fields in the actual value never fail. Built from any
/// `serde_json::Value`; the `"*"` and `""` string markers become their own
/// variants so every case is handled exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Expected {
    /// Every listed key must exist in the actual object and recursively match
    Map(BTreeMap<String, Expected>),

    /// Order-independent keyed multiset, or first-element template
    Seq(Vec<Expected>),

    /// The `"*"` marker: any non-null value, non-empty if a string
    Any,

    /// The `""` marker: key presence was already checked, value does not matter
    Ignore,

    /// Exact equality
    Literal(Value),
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Expected::Map(
                map.into_iter().map(|(k, v)| (k, Expected::from(v))).collect(),
            ),
            Value::Array(items) => {
                Expected::Seq(items.into_iter().map(Expected::from).collect())
            }
            Value::String(s) if s == "*" => Expected::Any,
            Value::String(s) if s.is_empty() => Expected::Ignore,
            other => Expected::Literal(other),
        }
    }
}

impl From<Expected> for Value {
    fn from(expected: Expected) -> Self {
        match expected {
            Expected::Map(fields) => Value::Object(
                fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
            Expected::Seq(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            Expected::Any => Value::String("*".to_string()),
            Expected::Ignore => Value::String(String::new()),
            Expected::Literal(v) => v,
        }
    }
}

/// A single structural mismatch, located by a dotted/bracketed path
/// such as `projects[id=1].tasks[0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub path: String,
    pub reason: String,
}

impl Mismatch {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "<root>" } else { path };
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.path, self.reason)
    }
}

/// Check `actual` against `expected`, anchored at the root.
pub fn verify(expected: &Expected, actual: &Value) -> Result<(), Mismatch> {
    verify_at(expected, actual, "")
}

/// Entry point for response bodies: accept the template anywhere in `actual`.
///
/// Tries a match anchored at the root first, then searches the actual value's
/// subtrees for one the template accepts. Only the anchor moves; the rules
/// inside a candidate subtree stay strict. When nothing matches, the
/// root-level mismatch is the one reported.
pub fn contains(expected: &Expected, actual: &Value) -> Result<(), Mismatch> {
    match verify(expected, actual) {
        Ok(()) => Ok(()),
        Err(root_mismatch) => {
            let found = match actual {
                Value::Object(map) => map.values().any(|v| subtree_matches(expected, v)),
                Value::Array(items) => items.iter().any(|v| subtree_matches(expected, v)),
                _ => false,
            };
            if found {
                Ok(())
            } else {
                Err(root_mismatch)
            }
        }
    }
}

fn subtree_matches(expected: &Expected, actual: &Value) -> bool {
    if verify(expected, actual).is_ok() {
        return true;
    }
    match actual {
        Value::Object(map) => map.values().any(|v| subtree_matches(expected, v)),
        Value::Array(items) => items.iter().any(|v| subtree_matches(expected, v)),
        _ => false,
    }
}

fn verify_at(expected: &Expected, actual: &Value, path: &str) -> Result<(), Mismatch> {
    match expected {
        Expected::Map(fields) => {
            let Value::Object(actual_map) = actual else {
                return Err(Mismatch::new(
                    path,
                    format!("expected an object, got {}", type_name(actual)),
                ));
            };
            for (key, expected_value) in fields {
                let child = join(path, key);
                let Some(actual_value) = actual_map.get(key) else {
                    return Err(Mismatch::new(&child, format!("missing key '{key}'")));
                };
                verify_at(expected_value, actual_value, &child)?;
            }
            Ok(())
        }
        Expected::Seq(items) => {
            let Value::Array(actual_items) = actual else {
                return Err(Mismatch::new(
                    path,
                    format!("expected an array, got {}", type_name(actual)),
                ));
            };
            match items.first() {
                Some(Expected::Map(first)) if first.contains_key("id") => {
                    verify_keyed_list(items, actual_items, path)
                }
                Some(template) => {
                    for (i, actual_item) in actual_items.iter().enumerate() {
                        verify_at(template, actual_item, &format!("{path}[{i}]"))?;
                    }
                    Ok(())
                }
                // An empty expected list only asserts the value is a list
                None => Ok(()),
            }
        }
        Expected::Any => match actual {
            Value::Null => Err(Mismatch::new(path, "expected a non-null value")),
            Value::String(s) if s.is_empty() => {
                Err(Mismatch::new(path, "expected a non-empty string"))
            }
            _ => Ok(()),
        },
        Expected::Ignore => Ok(()),
        Expected::Literal(value) => {
            if actual == value {
                Ok(())
            } else {
                Err(Mismatch::new(path, format!("expected {value}, got {actual}")))
            }
        }
    }
}

/// Unordered keyed comparison: lengths must agree exactly, every actual
/// element must pair with the expected entry sharing its id, and every
/// expected id must be found. Duplicate expected ids collapse onto the last
/// entry; the duplicate-relationship bug fixtures depend on that.
fn verify_keyed_list(expected: &[Expected], actual: &[Value], path: &str) -> Result<(), Mismatch> {
    if expected.len() != actual.len() {
        return Err(Mismatch::new(
            path,
            format!(
                "list length mismatch: expected {}, got {}",
                expected.len(),
                actual.len()
            ),
        ));
    }

    let mut expected_by_id: BTreeMap<String, &BTreeMap<String, Expected>> = BTreeMap::new();
    for item in expected {
        if let Expected::Map(fields) = item {
            if let Some(id) = fields.get("id") {
                expected_by_id.insert(expected_id_key(id), fields);
            }
        }
    }

    let mut found: BTreeSet<String> = BTreeSet::new();
    for (i, actual_item) in actual.iter().enumerate() {
        let Value::Object(actual_map) = actual_item else {
            return Err(Mismatch::new(
                &format!("{path}[{i}]"),
                format!("expected an object, got {}", type_name(actual_item)),
            ));
        };
        let Some(actual_id) = actual_map.get("id") else {
            return Err(Mismatch::new(&format!("{path}[{i}]"), "missing 'id' field"));
        };
        let key = id_key(actual_id);
        let Some(counterpart) = expected_by_id.get(&key) else {
            return Err(Mismatch::new(
                &format!("{path}[{i}]"),
                format!("unexpected object with id '{key}'"),
            ));
        };

        let item_path = format!("{path}[id={key}]");
        for (field, expected_value) in counterpart.iter() {
            let child = join(&item_path, field);
            let Some(actual_value) = actual_map.get(field) else {
                return Err(Mismatch::new(&child, format!("missing key '{field}'")));
            };
            verify_at(expected_value, actual_value, &child)?;
        }
        found.insert(key);
    }

    let missing: Vec<&String> = expected_by_id
        .keys()
        .filter(|k| !found.contains(*k))
        .collect();
    if !missing.is_empty() {
        return Err(Mismatch::new(
            path,
            format!("missing expected objects with ids {missing:?}"),
        ));
    }
    Ok(())
}

fn id_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn expected_id_key(expected: &Expected) -> String {
    match expected {
        Expected::Any => "*".to_string(),
        Expected::Ignore => String::new(),
        Expected::Literal(v) => id_key(v),
        other => Value::from(other.clone()).to_string(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
