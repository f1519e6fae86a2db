//! Static grid configuration

use indexmap::IndexMap;

use crate::source::Source;

/// Static configuration applied once by [`Grid::initialize`](crate::Grid::initialize).
///
/// # Example
///
/// ```
/// use datagrid_lib::GridConfig;
///
/// let config = GridConfig::new()
///     .with_route("item_list")
///     .with_sort_by("name")
///     .with_order("DESC")
///     .with_max_per_page(25)
///     .with_persistence(true);
/// ```
#[derive(Default)]
pub struct GridConfig {
    pub(crate) persistence: Option<bool>,
    pub(crate) route: Option<String>,
    pub(crate) route_parameters: IndexMap<String, String>,
    pub(crate) filterable: Option<bool>,
    pub(crate) sortable: Option<bool>,
    pub(crate) source: Option<Box<dyn Source>>,
    pub(crate) group_by: Option<Vec<String>>,
    pub(crate) sort_by: Option<String>,
    pub(crate) order: Option<String>,
    pub(crate) max_per_page: Option<u64>,
    pub(crate) max_results: Option<u64>,
    pub(crate) page: Option<i64>,
}

impl GridConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the persistence flag.
    pub fn with_persistence(mut self, persistence: bool) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Sets the route name used to resolve the grid URL.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Adds a route parameter.
    pub fn with_route_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.route_parameters.insert(name.into(), value.into());
        self
    }

    /// Sets whether the grid is filterable at all.
    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = Some(filterable);
        self
    }

    /// Sets whether the grid is sortable at all.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    /// Attaches a source.
    pub fn with_source(mut self, source: Box<dyn Source>) -> Self {
        self.source = Some(source);
        self
    }

    /// Groups by a single field.
    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(vec![field.into()]);
        self
    }

    /// Groups by several fields.
    pub fn with_group_by_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the default sort column.
    pub fn with_sort_by(mut self, column_id: impl Into<String>) -> Self {
        self.sort_by = Some(column_id.into());
        self
    }

    /// Sets the default sort direction, lowercased when applied.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets a single per-page limit.
    pub fn with_max_per_page(mut self, limit: u64) -> Self {
        self.max_per_page = Some(limit);
        self
    }

    /// Caps the number of rows considered.
    pub fn with_max_results(mut self, max_results: u64) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Sets the 0-based default page.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }
}

impl std::fmt::Debug for GridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("persistence", &self.persistence)
            .field("route", &self.route)
            .field("route_parameters", &self.route_parameters)
            .field("filterable", &self.filterable)
            .field("sortable", &self.sortable)
            .field("source", &self.source.is_some())
            .field("group_by", &self.group_by)
            .field("sort_by", &self.sort_by)
            .field("order", &self.order)
            .field("max_per_page", &self.max_per_page)
            .field("max_results", &self.max_results)
            .field("page", &self.page)
            .finish()
    }
}
