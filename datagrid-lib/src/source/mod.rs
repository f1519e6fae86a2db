//! Data source contract and the in-memory source

mod vector;

pub use vector::*;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Columns;
use crate::error::SourceError;
use crate::model::Rows;
use crate::model::Value;

/// How multiple active column filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataJunction {
    /// All filters must match.
    #[default]
    Conjunction,
    /// Any filter may match.
    Disjunction,
}

/// Supplies rows to a grid.
///
/// A source either executes queries lazily (`execute`) or operates over data
/// it already holds (`execute_from_data`); the grid picks the branch via
/// [`is_data_loaded`](Source::is_data_loaded). Totals and select-filter
/// population follow the same split. The default `*_from_data` methods
/// delegate to the lazy variants so simple sources implement one side only.
pub trait Source {
    /// Returns a stable identifier mixed into the grid hash.
    fn hash(&self) -> String;

    /// Returns `true` when the source operates over pre-loaded data.
    fn is_data_loaded(&self) -> bool {
        false
    }

    /// Called once when the source is attached to a grid.
    fn initialise(&mut self) {}

    /// Lets the source register or adjust columns when attached.
    fn configure_columns(&self, columns: &mut Columns) {
        let _ = columns;
    }

    /// Applies a group-by clause, for sources that support one.
    fn group_by(&mut self, fields: &[String]) {
        let _ = fields;
    }

    /// Executes the query for one page of rows.
    fn execute(
        &mut self,
        columns: &Columns,
        page: usize,
        limit: usize,
        max_results: Option<u64>,
        junction: DataJunction,
    ) -> Result<Rows, SourceError>;

    /// Produces one page of rows from pre-loaded data.
    fn execute_from_data(
        &mut self,
        columns: &Columns,
        page: usize,
        limit: usize,
        max_results: Option<u64>,
    ) -> Result<Rows, SourceError> {
        self.execute(columns, page, limit, max_results, DataJunction::default())
    }

    /// Returns the total number of rows matching the current filters.
    fn total_count(&self) -> Result<u64, SourceError>;

    /// Returns the total for the pre-loaded branch.
    fn total_count_from_data(&self) -> Result<u64, SourceError> {
        self.total_count()
    }

    /// Fills select-typed columns' option lists.
    fn populate_select_filters(&self, columns: &mut Columns) {
        let _ = columns;
    }

    /// Fills select-typed columns' option lists for the pre-loaded branch.
    fn populate_select_filters_from_data(&self, columns: &mut Columns) {
        self.populate_select_filters(columns);
    }

    /// Deletes the rows with the given identity values.
    fn delete(&mut self, ids: &[Value]) -> Result<(), SourceError> {
        let _ = ids;
        Ok(())
    }
}
