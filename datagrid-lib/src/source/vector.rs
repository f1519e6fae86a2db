//! In-memory source over a vector of rows

use std::cmp::Ordering;

use super::DataJunction;
use super::Source;
use crate::column::ColumnType;
use crate::column::Columns;
use crate::column::Direction;
use crate::error::SourceError;
use crate::model::Filter;
use crate::model::Operator;
use crate::model::Row;
use crate::model::Rows;
use crate::model::Value;

/// A [`Source`] over rows already held in memory.
///
/// Applies the active column filters, order, and pagination itself, which
/// makes it the natural source for small data sets and for exercising a grid
/// without a backing store.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
/// use datagrid_lib::source::Source;
/// use datagrid_lib::source::VectorSource;
///
/// let source = VectorSource::new(
///     "people",
///     vec![
///         Row::new().set("id", 1i64).set("name", "Ada"),
///         Row::new().set("id", 2i64).set("name", "Brian"),
///     ],
/// );
/// assert_eq!(source.hash(), "vector_people");
/// ```
#[derive(Debug, Clone)]
pub struct VectorSource {
    id: String,
    rows: Vec<Row>,
    key_column: String,
    last_total: Option<u64>,
}

impl VectorSource {
    /// Creates a source over the given rows, keyed by an `id` field.
    pub fn new(id: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            id: id.into(),
            rows,
            key_column: "id".to_string(),
            last_total: None,
        }
    }

    /// Sets the field deletions match identities against.
    pub fn with_key_column(mut self, column_id: impl Into<String>) -> Self {
        self.key_column = column_id.into();
        self
    }

    fn active_filters(columns: &Columns) -> Vec<(String, Filter)> {
        columns
            .iter()
            .filter_map(|c| {
                c.data()
                    .cloned()
                    .map(|data| (c.id().to_string(), data.into_filter(c.default_operator())))
            })
            .collect()
    }

    fn matches(row: &Row, column_id: &str, filter: &Filter) -> bool {
        let value = row.field(column_id);
        let operator = filter.operator();
        match operator {
            Operator::IsNull => return value.is_null(),
            Operator::IsNotNull => return !value.is_null(),
            _ => {}
        }
        let Some(from) = filter.from() else {
            return true;
        };
        match operator {
            Operator::Btw | Operator::Btwe => {
                let Some(to) = filter.to() else { return false };
                let lower = value.compare(from);
                let upper = value.compare(to);
                match operator {
                    Operator::Btw => {
                        lower == Some(Ordering::Greater) && upper == Some(Ordering::Less)
                    }
                    _ => {
                        lower != Some(Ordering::Less) && upper != Some(Ordering::Greater)
                    }
                }
            }
            _ => Self::matches_scalar(value, operator, from),
        }
    }

    /// List operands mean membership: any item matching passes.
    fn matches_scalar(value: &Value, operator: Operator, operand: &Value) -> bool {
        if let Value::List(items) = operand {
            return items
                .iter()
                .any(|item| Self::matches_scalar(value, operator, item));
        }
        match operator {
            Operator::Eq => value.compare(operand) == Some(Ordering::Equal),
            Operator::Neq => value.compare(operand) != Some(Ordering::Equal),
            Operator::Lt => value.compare(operand) == Some(Ordering::Less),
            Operator::Lte => value.compare(operand) != Some(Ordering::Greater),
            Operator::Gt => value.compare(operand) == Some(Ordering::Greater),
            Operator::Gte => value.compare(operand) != Some(Ordering::Less),
            Operator::Like => value.render().contains(&operand.render()),
            Operator::Nlike => !value.render().contains(&operand.render()),
            Operator::Llike => value.render().ends_with(&operand.render()),
            Operator::Rlike => value.render().starts_with(&operand.render()),
            Operator::Slike => value.render() == operand.render(),
            Operator::Nslike => value.render() != operand.render(),
            Operator::Btw | Operator::Btwe | Operator::IsNull | Operator::IsNotNull => false,
        }
    }

    fn order_spec(columns: &Columns) -> Option<(String, Direction)> {
        columns
            .iter()
            .find_map(|c| c.order().map(|d| (c.id().to_string(), d)))
    }
}

impl Source for VectorSource {
    fn hash(&self) -> String {
        format!("vector_{}", self.id)
    }

    fn is_data_loaded(&self) -> bool {
        true
    }

    fn execute(
        &mut self,
        columns: &Columns,
        page: usize,
        limit: usize,
        max_results: Option<u64>,
        junction: DataJunction,
    ) -> Result<Rows, SourceError> {
        let filters = Self::active_filters(columns);
        let mut matched: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| match junction {
                _ if filters.is_empty() => true,
                DataJunction::Conjunction => {
                    filters.iter().all(|(id, f)| Self::matches(row, id, f))
                }
                DataJunction::Disjunction => {
                    filters.iter().any(|(id, f)| Self::matches(row, id, f))
                }
            })
            .cloned()
            .collect();

        if let Some((column_id, direction)) = Self::order_spec(columns) {
            matched.sort_by(|a, b| {
                let ordering = a
                    .field(&column_id)
                    .compare(b.field(&column_id))
                    .unwrap_or(Ordering::Equal);
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(max) = max_results {
            matched.truncate(max as usize);
        }
        self.last_total = Some(matched.len() as u64);

        let rows = if limit == 0 {
            matched
        } else {
            let offset = page.checked_mul(limit).unwrap_or(usize::MAX);
            matched.into_iter().skip(offset).take(limit).collect()
        };
        Ok(rows.into())
    }

    fn execute_from_data(
        &mut self,
        columns: &Columns,
        page: usize,
        limit: usize,
        max_results: Option<u64>,
    ) -> Result<Rows, SourceError> {
        self.execute(columns, page, limit, max_results, DataJunction::default())
    }

    fn total_count(&self) -> Result<u64, SourceError> {
        self.last_total
            .ok_or_else(|| SourceError::Execution(format!("{} has not been executed", self.hash())))
    }

    fn populate_select_filters(&self, columns: &mut Columns) {
        let select_ids: Vec<String> = columns
            .iter()
            .filter(|c| c.column_type() == ColumnType::Select)
            .map(|c| c.id().to_string())
            .collect();
        for id in select_ids {
            let mut values: Vec<Value> = Vec::new();
            for row in &self.rows {
                let value = row.field(&id);
                if !value.is_null() && !values.contains(value) {
                    values.push(value.clone());
                }
            }
            if let Some(column) = columns.get_mut(&id) {
                column.set_select_values(values);
            }
        }
    }

    fn delete(&mut self, ids: &[Value]) -> Result<(), SourceError> {
        let key = self.key_column.clone();
        self.rows.retain(|row| !ids.contains(row.field(&key)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::model::FilterData;

    fn people() -> Vec<Row> {
        vec![
            Row::new().set("id", 1i64).set("name", "Ada").set("age", 36i64),
            Row::new().set("id", 2i64).set("name", "Brian").set("age", 70i64),
            Row::new().set("id", 3i64).set("name", "Barbara").set("age", 61i64),
        ]
    }

    fn columns() -> Columns {
        let mut columns = Columns::new();
        columns.push(Column::new("id", "Id").primary(true)).unwrap();
        columns.push(Column::new("name", "Name")).unwrap();
        columns.push(Column::new("age", "Age")).unwrap();
        columns
    }

    #[test]
    fn test_filter_like() {
        let mut source = VectorSource::new("t", people());
        let mut cols = columns();
        cols.get_mut("name").unwrap().set_data(FilterData::from_value("Bar"));
        let rows = source.execute_from_data(&cols, 0, 0, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.iter().next().unwrap().field("name").as_str(), Some("Barbara"));
        assert_eq!(source.total_count().unwrap(), 1);
    }

    #[test]
    fn test_page_far_past_end_yields_no_rows() {
        let mut source = VectorSource::new("t", people());
        let rows = source.execute_from_data(&columns(), usize::MAX, 25, None).unwrap();
        assert_eq!(rows.len(), 0);
        assert_eq!(source.total_count().unwrap(), 3);
    }

    #[test]
    fn test_filter_range() {
        let mut source = VectorSource::new("t", people());
        let mut cols = columns();
        cols.get_mut("age").unwrap().set_data(
            FilterData::between(40i64, 70i64).with_operator(Operator::Btwe),
        );
        let rows = source.execute_from_data(&cols, 0, 0, None).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_disjunction() {
        let mut source = VectorSource::new("t", people());
        let mut cols = columns();
        cols.get_mut("name").unwrap().set_data(FilterData::from_value("Ada"));
        cols.get_mut("age").unwrap().set_data(
            FilterData::from_value(70i64).with_operator(Operator::Eq),
        );
        let rows = source
            .execute(&cols, 0, 0, None, DataJunction::Disjunction)
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_order_desc() {
        let mut source = VectorSource::new("t", people());
        let mut cols = columns();
        cols.get_mut("age").unwrap().set_order(Direction::Desc);
        let rows = source.execute_from_data(&cols, 0, 0, None).unwrap();
        let ages: Vec<_> = rows.iter().map(|r| r.field("age").as_int().unwrap()).collect();
        assert_eq!(ages, [70, 61, 36]);
    }

    #[test]
    fn test_pagination() {
        let mut source = VectorSource::new("t", people());
        let cols = columns();
        let rows = source.execute_from_data(&cols, 1, 2, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(source.total_count().unwrap(), 3);
    }

    #[test]
    fn test_max_results_caps_total() {
        let mut source = VectorSource::new("t", people());
        let cols = columns();
        let rows = source.execute_from_data(&cols, 0, 0, Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.total_count().unwrap(), 2);
    }

    #[test]
    fn test_select_membership() {
        let mut source = VectorSource::new("t", people());
        let mut cols = columns();
        cols.get_mut("name").unwrap().set_data(FilterData::from_value(Value::List(vec![
            Value::from("Ada"),
            Value::from("Brian"),
        ])));
        let rows = source.execute_from_data(&cols, 0, 0, None).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_total_before_execute_errors() {
        let source = VectorSource::new("t", people());
        assert!(source.total_count().is_err());
    }

    #[test]
    fn test_populate_select_filters() {
        let source = VectorSource::new("t", people());
        let mut cols = columns();
        cols.push(Column::new("dup", "Dup").with_type(ColumnType::Select)).unwrap();
        source.populate_select_filters(&mut cols);
        assert!(cols.get("dup").unwrap().select_values().is_empty());

        let source = VectorSource::new(
            "t2",
            vec![
                Row::new().set("tag", "x"),
                Row::new().set("tag", "y"),
                Row::new().set("tag", "x"),
            ],
        );
        let mut cols = Columns::new();
        cols.push(Column::new("tag", "Tag").with_type(ColumnType::Select)).unwrap();
        source.populate_select_filters(&mut cols);
        assert_eq!(
            cols.get("tag").unwrap().select_values(),
            &[Value::from("x"), Value::from("y")]
        );
    }
}
