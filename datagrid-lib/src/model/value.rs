//! Value enum for dynamic cell and filter operand values

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde::Serialize;

/// A dynamic value that can hold any grid cell or filter operand.
///
/// This enum represents everything a [`Row`](super::Row) field or a filter
/// operand can carry. Query and session values arrive as JSON, so the
/// untagged representation keeps dates and decimals as strings on the way
/// back in; typed variants are produced by sources building rows in code.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Value;
///
/// let name = Value::from("Contoso");
/// let count = Value::from(42i64);
/// let active = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(String),
    /// Date and time with timezone.
    DateTime(DateTime<Utc>),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// List of values, used by select filters and multi-valued operands.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Decimal(_) => "decimal",
            Value::List(_) => "list",
        }
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the list items if this is a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Wraps this value into a single-element list unless it already is one.
    pub fn into_list(self) -> Value {
        match self {
            Value::List(items) => Value::List(items),
            other => Value::List(vec![other]),
        }
    }

    /// Numeric view of this value, if one exists.
    ///
    /// Strings are parsed so that query-supplied operands compare against
    /// typed cells.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(d) => d.to_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Compares two values with the loose coercion filtering needs.
    ///
    /// Numbers (including numeric strings) compare numerically, datetimes
    /// chronologically, everything else by its string rendering. `Null`
    /// orders before any other value and lists are not ordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::List(_), _) | (_, Value::List(_)) => None,
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => Some(a.render().cmp(&b.render())),
            },
        }
    }

    /// Renders this value the way it appears in a cell or query string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::Decimal(d) => d.to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_numeric_strings() {
        let a = Value::from("10");
        let b = Value::from(9i64);
        assert_eq!(a.compare(&b), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_strings() {
        let a = Value::from("alpha");
        let b = Value::from("beta");
        assert_eq!(a.compare(&b), Some(Ordering::Less));
    }

    #[test]
    fn test_null_orders_first() {
        assert_eq!(Value::Null.compare(&Value::from(0i64)), Some(Ordering::Less));
    }

    #[test]
    fn test_into_list_wraps_scalars_only() {
        assert_eq!(
            Value::from("x").into_list(),
            Value::List(vec![Value::from("x")])
        );
        let list = Value::List(vec![Value::from("x")]);
        assert_eq!(list.clone().into_list(), list);
    }

    #[test]
    fn test_render_bool_as_digit() {
        assert_eq!(Value::from(true).render(), "1");
        assert_eq!(Value::from(false).render(), "0");
    }
}
