//! Tweak presets

use indexmap::IndexMap;

use crate::model::FilterData;

/// A named, storable bundle of grid settings applied as one action.
///
/// # Example
///
/// ```
/// use datagrid_lib::Tweak;
/// use datagrid_lib::model::FilterData;
///
/// let tweak = Tweak::new()
///     .with_filter("state", FilterData::from_value("open"))
///     .with_order("updated|desc")
///     .with_page(0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tweak {
    /// Per-column filter data to merge into the session.
    pub filters: IndexMap<String, FilterData>,
    /// Order to merge, as `"<columnId>|<asc|desc>"`.
    pub order: Option<String>,
    /// Page to merge.
    pub page: Option<i64>,
    /// Limit to merge.
    pub limit: Option<u64>,
    /// Export index to dispatch.
    pub export: Option<usize>,
    /// Mass action index to dispatch.
    pub mass_action: Option<usize>,
    /// Clears the grid's session bucket instead of merging anything.
    pub reset: bool,
}

impl Tweak {
    /// Creates an empty tweak.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter for a column.
    pub fn with_filter(mut self, column_id: impl Into<String>, data: FilterData) -> Self {
        self.filters.insert(column_id.into(), data);
        self
    }

    /// Sets the order to merge.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets the page to merge.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the limit to merge.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Dispatches an export when the tweak is activated.
    pub fn with_export(mut self, index: usize) -> Self {
        self.export = Some(index);
        self
    }

    /// Dispatches a mass action when the tweak is activated.
    pub fn with_mass_action(mut self, index: usize) -> Self {
        self.mass_action = Some(index);
        self
    }

    /// Turns this tweak into a session reset.
    pub fn resetting(mut self) -> Self {
        self.reset = true;
        self
    }
}

/// A registered tweak: display metadata plus its settings.
///
/// The `url` field is filled when the entry is read back from the grid,
/// pointing at the request that activates the tweak.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweakEntry {
    /// Display title.
    pub title: String,
    /// The explicit id the tweak was registered with, if any.
    pub id: Option<String>,
    /// Display group, if any.
    pub group: Option<String>,
    /// The settings bundle.
    pub settings: Tweak,
    /// Activation URL, computed from the grid's route url.
    pub url: String,
}
