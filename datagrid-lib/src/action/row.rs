//! Row action descriptor

use indexmap::IndexMap;

/// An action rendered per row, targeting a route with the row's identity.
///
/// # Example
///
/// ```
/// use datagrid_lib::action::RowAction;
///
/// let action = RowAction::new("Edit", "item_edit")
///     .on_column("info")
///     .confirm(true);
///
/// assert_eq!(action.column(), Some("info"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RowAction {
    title: String,
    route: String,
    column: Option<String>,
    confirm: bool,
    role: Option<String>,
    route_parameters: IndexMap<String, String>,
}

impl RowAction {
    /// Creates a row action pointing at the given route.
    pub fn new(title: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            route: route.into(),
            column: None,
            confirm: false,
            role: None,
            route_parameters: IndexMap::new(),
        }
    }

    /// Targets a specific column instead of the default actions column.
    pub fn on_column(mut self, column_id: impl Into<String>) -> Self {
        self.column = Some(column_id.into());
        self
    }

    /// Requires a confirmation prompt before following the action.
    pub fn confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    /// Requires a role to see this action.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
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

    /// Returns the action title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the target route name.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the target column id, if one was set.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns `true` when the action asks for confirmation.
    pub fn needs_confirm(&self) -> bool {
        self.confirm
    }

    /// Returns the required role, if any.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns the route parameters.
    pub fn route_parameters(&self) -> &IndexMap<String, String> {
        &self.route_parameters
    }
}
