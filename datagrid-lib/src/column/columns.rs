//! Ordered column collection

use indexmap::IndexMap;

use super::Column;
use crate::error::ConfigError;

/// An ordered, unique-by-id collection of [`Column`]s.
///
/// Supports positional insertion (position 0 appends, positions ≥ 1 insert
/// 1-based), reordering, extension prototypes per column type, and a content
/// hash fed into the grid hash.
///
/// # Example
///
/// ```
/// use datagrid_lib::column::Column;
/// use datagrid_lib::column::Columns;
///
/// let mut columns = Columns::new();
/// columns.push(Column::new("id", "Id").primary(true)).unwrap();
/// columns.push(Column::new("name", "Name")).unwrap();
///
/// assert_eq!(columns.hash(), "idname");
/// assert_eq!(columns.primary().unwrap().id(), "id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Columns {
    columns: Vec<Column>,
    extensions: IndexMap<String, Column>,
}

impl Columns {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    pub fn push(&mut self, column: Column) -> Result<(), ConfigError> {
        self.insert(column, 0)
    }

    /// Inserts a column at the given position.
    ///
    /// Position 0 appends; positions ≥ 1 insert 1-based, clamped to the end.
    pub fn insert(&mut self, column: Column, position: usize) -> Result<(), ConfigError> {
        if self.has(column.id()) {
            return Err(ConfigError::DuplicateColumn(column.id().to_string()));
        }
        if position == 0 {
            self.columns.push(column);
        } else {
            let index = (position - 1).min(self.columns.len());
            self.columns.insert(index, column);
        }
        Ok(())
    }

    /// Returns the column with the given id.
    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == id)
    }

    /// Returns the column with the given id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id() == id)
    }

    /// Returns the column with the given id, or an error naming it.
    pub fn require(&self, id: &str) -> Result<&Column, ConfigError> {
        self.get(id)
            .ok_or_else(|| ConfigError::ColumnNotFound(id.to_string()))
    }

    /// Returns `true` when a column with the given id is present.
    pub fn has(&self, id: &str) -> bool {
        self.columns.iter().any(|c| c.id() == id)
    }

    /// Returns the position of the column with the given id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == id)
    }

    /// Returns the primary column.
    pub fn primary(&self) -> Result<&Column, ConfigError> {
        self.columns
            .iter()
            .find(|c| c.is_primary())
            .ok_or(ConfigError::PrimaryColumnMissing)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the collection holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over the columns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Iterates mutably over the columns in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Column> {
        self.columns.iter_mut()
    }

    /// Iterates over the visible columns in order.
    pub fn iter_visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_visible())
    }

    /// Reorders the collection by the given id list.
    ///
    /// Listed columns come first in the given order; unlisted columns keep
    /// their relative order after them, or are dropped when `keep_others` is
    /// false. Unknown ids are ignored.
    pub fn set_order(&mut self, ids: &[&str], keep_others: bool) {
        let mut reordered = Vec::with_capacity(self.columns.len());
        for id in ids {
            if let Some(index) = self.columns.iter().position(|c| c.id() == *id) {
                reordered.push(self.columns.remove(index));
            }
        }
        if keep_others {
            reordered.append(&mut self.columns);
        }
        self.columns = reordered;
    }

    /// Returns the content hash: member ids concatenated in order.
    pub fn hash(&self) -> String {
        self.columns.iter().map(Column::id).collect()
    }

    /// Registers a prototype column for a type name.
    pub fn add_extension(&mut self, type_name: impl Into<String>, extension: Column) {
        self.extensions.insert(type_name.into(), extension);
    }

    /// Returns the prototype column registered for a type name.
    pub fn extension_for_type(&self, type_name: &str) -> Option<&Column> {
        self.extensions.get(type_name)
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Columns {
        let mut columns = Columns::new();
        columns.push(Column::new("a", "A")).unwrap();
        columns.push(Column::new("b", "B")).unwrap();
        columns.push(Column::new("c", "C")).unwrap();
        columns
    }

    #[test]
    fn test_insert_positions() {
        let mut columns = sample();
        columns.insert(Column::new("x", "X"), 1).unwrap();
        let ids: Vec<_> = columns.iter().map(Column::id).collect();
        assert_eq!(ids, ["x", "a", "b", "c"]);

        columns.insert(Column::new("y", "Y"), 0).unwrap();
        let ids: Vec<_> = columns.iter().map(Column::id).collect();
        assert_eq!(ids, ["x", "a", "b", "c", "y"]);
    }

    #[test]
    fn test_insert_position_clamped() {
        let mut columns = sample();
        columns.insert(Column::new("z", "Z"), 99).unwrap();
        let ids: Vec<_> = columns.iter().map(Column::id).collect();
        assert_eq!(ids, ["a", "b", "c", "z"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut columns = sample();
        let err = columns.push(Column::new("a", "A2")).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn test_set_order_keep_others() {
        let mut columns = sample();
        columns.set_order(&["c", "a"], true);
        let ids: Vec<_> = columns.iter().map(Column::id).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn test_set_order_drop_others() {
        let mut columns = sample();
        columns.set_order(&["b"], false);
        let ids: Vec<_> = columns.iter().map(Column::id).collect();
        assert_eq!(ids, ["b"]);
    }

    #[test]
    fn test_hash_follows_order() {
        let mut columns = sample();
        assert_eq!(columns.hash(), "abc");
        columns.set_order(&["c", "b", "a"], true);
        assert_eq!(columns.hash(), "cba");
    }

    #[test]
    fn test_extension_prototype_lookup() {
        let mut columns = sample();
        columns.add_extension("actions", Column::new("proto", "Ops").sortable(false));
        let prototype = columns.extension_for_type("actions").unwrap();
        assert_eq!(prototype.title(), "Ops");
        assert!(!prototype.is_sortable());
        assert!(columns.extension_for_type("massaction").is_none());
    }

    #[test]
    fn test_primary_missing() {
        let columns = sample();
        assert_eq!(
            columns.primary().unwrap_err(),
            ConfigError::PrimaryColumnMissing
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let mut columns = sample();
        let snapshot = columns.clone();
        columns.get_mut("a").unwrap().set_visible(false);
        assert!(snapshot.get("a").unwrap().is_visible());
    }
}
