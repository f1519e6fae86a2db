//! Row and row collection types

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// A single materialized grid record.
///
/// Rows hold field values as a `HashMap<String, Value>`, keyed by column id.
/// After materialization the grid stamps each row with the primary column id
/// so the row's identity value can be read back.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
///
/// let row = Row::new()
///     .set("id", 7i64)
///     .set("name", "Contoso");
///
/// assert_eq!(row.field("id").as_int(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// The field values, keyed by column id.
    fields: HashMap<String, Value>,

    /// The id of the column holding this row's identity value.
    primary_field: Option<String>,
}

impl Row {
    /// Creates a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row from an iterator of `(column id, value)` pairs.
    pub fn from_fields<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            primary_field: None,
        }
    }

    /// Sets a field value, consuming and returning the row.
    pub fn set(mut self, column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(column_id.into(), value.into());
        self
    }

    /// Returns the value stored under the given column id, `Null` if absent.
    pub fn field(&self, column_id: &str) -> &Value {
        self.fields.get(column_id).unwrap_or(&Value::Null)
    }

    /// Returns `true` if the row carries a value for the given column id.
    pub fn has_field(&self, column_id: &str) -> bool {
        self.fields.contains_key(column_id)
    }

    /// Sets the id of the primary column.
    pub fn set_primary_field(&mut self, column_id: impl Into<String>) {
        self.primary_field = Some(column_id.into());
    }

    /// Returns the primary column id, if stamped.
    pub fn primary_field(&self) -> Option<&str> {
        self.primary_field.as_deref()
    }

    /// Returns this row's identity value, `Null` until stamped.
    pub fn primary_field_value(&self) -> &Value {
        match &self.primary_field {
            Some(id) => self.field(id),
            None => &Value::Null,
        }
    }
}

/// An ordered collection of [`Row`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rows {
    rows: Vec<Row>,
}

impl Rows {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the collection holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Iterates mutably over the rows in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }
}

impl From<Vec<Row>> for Rows {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Row> for Rows {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
