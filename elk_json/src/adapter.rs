//! Thin layer over `serde_json::Value` used by the importer and exporter.
//!
//! Accessors never fail for a merely absent field; only the id helpers
//! report malformed input.

use compact_str::CompactString;
use elk_traits::{ElkError, ElkResult};
use elk_value::KVector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

pub type JsonObject = Map<String, Value>;

/// Identifier of a node, port, edge or section in the JSON form.
///
/// Ids are strings or integers in the input and keep their kind so they are
/// written back the way they were read.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Int(i64),
    Str(CompactString),
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementId::Str(s) => write!(f, "{s}"),
            ElementId::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        ElementId::Str(CompactString::from(s))
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        ElementId::Str(CompactString::from(s))
    }
}

impl From<i64> for ElementId {
    fn from(i: i64) -> Self {
        ElementId::Int(i)
    }
}

impl ElementId {
    pub fn to_json(&self) -> Value {
        match self {
            ElementId::Str(s) => Value::String(s.to_string()),
            ElementId::Int(i) => Value::from(*i),
        }
    }
}

/// The required `id` of an element.
pub fn get_id(obj: &JsonObject) -> ElkResult<ElementId> {
    match obj.get("id") {
        Some(id) => as_id(id),
        None => Err("Every element must have an id.".into()),
    }
}

/// Interprets a JSON value as an id: strings as is, numbers without a
/// fractional part as integers.
pub fn as_id(value: &Value) -> ElkResult<ElementId> {
    match value {
        Value::String(s) => Ok(ElementId::from(s.as_str())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(ElementId::Int(i));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(ElementId::Int(f as i64))
                }
                _ => Err(id_error(value)),
            }
        }
        _ => Err(id_error(value)),
    }
}

fn id_error(value: &Value) -> ElkError {
    ElkError::from(format!("Id must be a string or an integer: '{value}'."))
}

/// The id rendered as a string, if it is a valid id. Integral numbers
/// render the way they are registered, `7.0` as `7`.
pub fn id_or_none(obj: &JsonObject) -> Option<String> {
    obj.get("id")
        .and_then(|v| as_id(v).ok())
        .map(|id| id.to_string())
}

/// Any JSON primitive rendered as a string. Objects, arrays and null have
/// no string value.
pub fn string_val(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn opt_string(obj: &JsonObject, key: &str) -> Option<String> {
    obj.get(key).and_then(string_val)
}

/// Numbers, and strings holding a number.
pub fn opt_double(obj: &JsonObject, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn opt_array<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

pub fn opt_object<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    obj.get(key).and_then(Value::as_object)
}

pub fn has(obj: &JsonObject, key: &str) -> bool {
    obj.contains_key(key)
}

pub fn keys(obj: &JsonObject) -> impl Iterator<Item = &String> {
    obj.keys()
}

pub fn new_object() -> JsonObject {
    Map::new()
}

pub fn new_array() -> Vec<Value> {
    Vec::new()
}

/// Non finite numbers have no JSON form and are written as null.
pub fn add_number(obj: &mut JsonObject, key: &str, n: f64) {
    obj.insert(key.to_string(), Value::from(n));
}

pub fn add_string(obj: &mut JsonObject, key: &str, s: &str) {
    obj.insert(key.to_string(), Value::String(s.to_string()));
}

pub fn add_value(obj: &mut JsonObject, key: &str, value: Value) {
    obj.insert(key.to_string(), value);
}

/// `{"x": .., "y": ..}`
pub fn point(v: &KVector) -> Value {
    let mut obj = new_object();
    add_number(&mut obj, "x", v.x);
    add_number(&mut obj, "y", v.y);
    Value::Object(obj)
}

pub fn point_array<'a>(points: impl IntoIterator<Item = &'a KVector>) -> Value {
    Value::Array(points.into_iter().map(point).collect())
}

/// Reads a point, absent coordinates stay 0.
pub fn read_point(obj: &JsonObject) -> KVector {
    KVector::new(
        opt_double(obj, "x").unwrap_or(0.0),
        opt_double(obj, "y").unwrap_or(0.0),
    )
}

/// The objects of an array with their positions; other entries are skipped.
pub fn objects_of<'a>(
    obj: &'a JsonObject,
    key: &str,
) -> impl Iterator<Item = (usize, &'a JsonObject)> + 'a {
    opt_array(obj, key)
        .into_iter()
        .flatten()
        .enumerate()
        .filter_map(|(i, v)| v.as_object().map(|o| (i, o)))
}

/// Pointer to entry `index` of the array `key` below `parent`.
pub fn child_pointer(parent: &str, key: &str, index: usize) -> String {
    format!("{parent}/{key}/{index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> JsonObject {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ids() {
        assert_eq!(get_id(&obj(json!({"id": "n1"}))).unwrap(), ElementId::from("n1"));
        assert_eq!(get_id(&obj(json!({"id": 7}))).unwrap(), ElementId::Int(7));
        assert_eq!(get_id(&obj(json!({"id": 7.0}))).unwrap(), ElementId::Int(7));
        assert_eq!(
            get_id(&obj(json!({}))).unwrap_err().message(),
            "Every element must have an id."
        );
        assert_eq!(
            get_id(&obj(json!({"id": 1.5}))).unwrap_err().message(),
            "Id must be a string or an integer: '1.5'."
        );
        assert!(as_id(&json!(true)).is_err());
        assert!(as_id(&json!(["a"])).is_err());
    }

    #[test]
    fn test_id_json_forms() {
        assert_eq!(ElementId::Int(3).to_json(), json!(3));
        assert_eq!(ElementId::from("a").to_json(), json!("a"));
        assert_eq!(ElementId::Int(3).to_string(), "3");
        assert_eq!(id_or_none(&obj(json!({"id": 3}))), Some("3".to_string()));
        assert_eq!(id_or_none(&obj(json!({"id": 7.0}))), Some("7".to_string()));
        assert_eq!(id_or_none(&obj(json!({"id": true}))), None);
        assert_eq!(id_or_none(&obj(json!({"text": "x"}))), None);
    }

    #[test]
    fn test_optional_accessors() {
        let o = obj(json!({"x": 1.5, "w": "20", "b": true, "o": {}, "a": [1, {"k": 1}], "n": null}));
        assert_eq!(opt_double(&o, "x"), Some(1.5));
        assert_eq!(opt_double(&o, "w"), Some(20.0));
        assert_eq!(opt_double(&o, "b"), None);
        assert_eq!(opt_double(&o, "missing"), None);
        assert_eq!(opt_string(&o, "b"), Some("true".to_string()));
        assert_eq!(opt_string(&o, "o"), None);
        assert_eq!(opt_string(&o, "n"), None);
        assert!(opt_object(&o, "o").is_some());
        assert!(opt_object(&o, "a").is_none());
        assert_eq!(objects_of(&o, "a").map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
        assert_eq!(objects_of(&o, "missing").count(), 0);
        assert!(has(&o, "n"));
        assert_eq!(keys(&o).count(), 6);
    }

    #[test]
    fn test_writers() {
        let mut o = new_object();
        add_number(&mut o, "x", 2.0);
        add_number(&mut o, "y", f64::NAN);
        add_string(&mut o, "id", "n0");
        add_value(&mut o, "pts", point_array(&[KVector::new(1.0, 2.0)]));
        assert_eq!(
            Value::Object(o),
            json!({"x": 2.0, "y": null, "id": "n0", "pts": [{"x": 1.0, "y": 2.0}]})
        );
        assert_eq!(read_point(&obj(json!({"y": 4.0}))), KVector::new(0.0, 4.0));
        assert_eq!(child_pointer("/children/0", "edges", 2), "/children/0/edges/2");
    }
}
