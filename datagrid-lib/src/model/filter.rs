//! Filter operator and filter data types

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Comparison operators a column filter can apply.
///
/// Serialized in lowercase, matching the values query strings and session
/// buckets carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equality.
    Eq,
    /// Not equal.
    Neq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Between, bounds excluded.
    Btw,
    /// Between, bounds included.
    Btwe,
    /// Contains substring.
    Like,
    /// Does not contain substring.
    Nlike,
    /// Ends with (left side wildcarded).
    Llike,
    /// Starts with (right side wildcarded).
    Rlike,
    /// Exact string match.
    Slike,
    /// Exact string mismatch.
    Nslike,
    /// Value is null.
    IsNull,
    /// Value is not null.
    IsNotNull,
}

impl Operator {
    /// Returns the lowercase wire name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Btw => "btw",
            Operator::Btwe => "btwe",
            Operator::Like => "like",
            Operator::Nlike => "nlike",
            Operator::Llike => "llike",
            Operator::Rlike => "rlike",
            Operator::Slike => "slike",
            Operator::Nslike => "nslike",
            Operator::IsNull => "isnull",
            Operator::IsNotNull => "isnotnull",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An applied filter: operator plus one or two operands.
///
/// Immutable once constructed; built by the grid from submitted
/// [`FilterData`] and the column's default operator.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Filter;
/// use datagrid_lib::model::Operator;
///
/// let filter = Filter::new(Operator::Like, "con");
/// assert_eq!(filter.operator(), Operator::Like);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    operator: Operator,
    from: Option<Value>,
    to: Option<Value>,
}

impl Filter {
    /// Creates a single-operand filter.
    pub fn new(operator: Operator, from: impl Into<Value>) -> Self {
        Self {
            operator,
            from: Some(from.into()),
            to: None,
        }
    }

    /// Creates a two-operand filter for range operators.
    pub fn range(operator: Operator, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self {
            operator,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// Creates an operand-less filter for null-test operators.
    pub fn bare(operator: Operator) -> Self {
        Self {
            operator,
            from: None,
            to: None,
        }
    }

    /// Returns the operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the lower/only operand.
    pub fn from(&self) -> Option<&Value> {
        self.from.as_ref()
    }

    /// Returns the upper operand.
    pub fn to(&self) -> Option<&Value> {
        self.to.as_ref()
    }
}

/// The mutable filter shape submitted for one column.
///
/// Requests, defaults, permanent filters, and tweaks all carry this shape;
/// it is what the session bucket stores per column. An omitted operator
/// falls back to the column's default operator when the filter is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterData {
    /// The operator, when explicitly submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,

    /// The lower/only operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,

    /// The upper operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
}

impl FilterData {
    /// Creates filter data carrying only a `from` operand.
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self {
            operator: None,
            from: Some(value.into()),
            to: None,
        }
    }

    /// Creates filter data carrying a range of operands.
    pub fn between(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self {
            operator: None,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// Sets the operator, consuming and returning the data.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Returns `true` when neither operand nor operator is present.
    pub fn is_empty(&self) -> bool {
        self.operator.is_none() && self.from.is_none() && self.to.is_none()
    }

    /// Normalizes submitted shapes into canonical filter data.
    ///
    /// Booleans become `1`/`0`. When the target column carries a select
    /// filter, scalar operands are wrapped into single-element lists.
    pub fn normalized(mut self, select_column: bool) -> Self {
        self.from = self.from.map(|v| Self::normalize_operand(v, select_column));
        self.to = self.to.map(|v| Self::normalize_operand(v, select_column));
        self
    }

    fn normalize_operand(value: Value, select_column: bool) -> Value {
        let value = match value {
            Value::Bool(b) => Value::Int(if b { 1 } else { 0 }),
            other => other,
        };
        if select_column { value.into_list() } else { value }
    }

    /// Builds the applied [`Filter`], falling back to the given operator.
    pub fn into_filter(self, default_operator: Operator) -> Filter {
        Filter {
            operator: self.operator.unwrap_or(default_operator),
            from: self.from,
            to: self.to,
        }
    }
}

impl From<Value> for FilterData {
    fn from(value: Value) -> Self {
        FilterData::from_value(value)
    }
}

impl From<&str> for FilterData {
    fn from(value: &str) -> Self {
        FilterData::from_value(value)
    }
}

impl From<bool> for FilterData {
    fn from(value: bool) -> Self {
        FilterData::from_value(value)
    }
}
