//! Column definition type

use serde::Deserialize;
use serde::Serialize;

use crate::action::RowAction;
use crate::model::FilterData;
use crate::model::Operator;
use crate::model::Value;

/// The rendering/filtering family of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Plain text.
    Text,
    /// Numeric values.
    Number,
    /// Boolean values.
    Boolean,
    /// Calendar dates.
    Date,
    /// Dates with time.
    DateTime,
    /// Select filter over an option list.
    Select,
    /// Row action buttons, no data.
    Actions,
    /// Mass action selection checkboxes, no data.
    MassAction,
}

impl ColumnType {
    /// Returns the lowercase name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Select => "select",
            ColumnType::Actions => "actions",
            ColumnType::MassAction => "massaction",
        }
    }
}

/// A sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl Direction {
    /// Parses a direction from its lowercase-insensitive name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    /// Returns the lowercase name of this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single grid column definition.
///
/// Columns are built with the chainable constructors and mutated by the grid
/// while a request is reconciled (order, filter data, visibility).
///
/// # Example
///
/// ```
/// use datagrid_lib::column::Column;
/// use datagrid_lib::column::ColumnType;
///
/// let column = Column::new("name", "Name")
///     .with_type(ColumnType::Text)
///     .primary(false);
///
/// assert!(column.is_sortable());
/// assert!(column.is_filterable());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    id: String,
    title: String,
    column_type: ColumnType,
    sortable: bool,
    filterable: bool,
    visible: bool,
    primary: bool,
    role: Option<String>,
    size: Option<u32>,
    default_operator: Operator,
    order: Option<Direction>,
    data: Option<FilterData>,
    select_values: Vec<Value>,
    row_actions: Vec<RowAction>,
}

impl Column {
    /// Creates a text column with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_type: ColumnType::Text,
            sortable: true,
            filterable: true,
            visible: true,
            primary: false,
            role: None,
            size: None,
            default_operator: Operator::Like,
            order: None,
            data: None,
            select_values: Vec::new(),
            row_actions: Vec::new(),
        }
    }

    /// Creates an actions column carrying the given row actions.
    pub fn actions(id: impl Into<String>, title: impl Into<String>, actions: Vec<RowAction>) -> Self {
        let mut column = Self::new(id, title)
            .with_type(ColumnType::Actions)
            .sortable(false)
            .filterable(false);
        column.row_actions = actions;
        column
    }

    /// Creates the mass action selection column.
    pub fn mass_action_selector(id: impl Into<String>) -> Self {
        Self::new(id, "")
            .with_type(ColumnType::MassAction)
            .sortable(false)
            .filterable(false)
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Replaces the column id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the column type.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Sets whether the column can be sorted.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets whether the column can be filtered.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets whether the column is rendered.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Flags this column as the row identity column.
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Requires a role to see this column.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the rendered width hint.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the operator used when submitted filter data carries none.
    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = operator;
        self
    }

    /// Sets the select filter option values.
    pub fn with_select_values(mut self, values: Vec<Value>) -> Self {
        self.select_values = values;
        self
    }

    // =========================================================================
    // Accessors and runtime mutation
    // =========================================================================

    /// Returns the column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the column title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the column type.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns `true` when the column can be sorted.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns `true` when the column can be filtered.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Returns `true` when the column is rendered.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` when this is the row identity column.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Returns the required role, if any.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns the rendered width hint, if any.
    pub fn size(&self) -> Option<u32> {
        self.size
    }

    /// Returns the fallback operator for submitted filter data.
    pub fn default_operator(&self) -> Operator {
        self.default_operator
    }

    /// Returns the active sort direction, if any.
    pub fn order(&self) -> Option<Direction> {
        self.order
    }

    /// Sets the active sort direction.
    pub fn set_order(&mut self, direction: Direction) {
        self.order = Some(direction);
    }

    /// Returns the submitted filter data, if any.
    pub fn data(&self) -> Option<&FilterData> {
        self.data.as_ref()
    }

    /// Stores submitted filter data; empty data clears it.
    pub fn set_data(&mut self, data: FilterData) {
        if data.is_empty() {
            self.data = None;
        } else {
            self.data = Some(data);
        }
    }

    /// Returns `true` when non-empty filter data is stored.
    pub fn is_filtered(&self) -> bool {
        self.data.is_some()
    }

    /// Overrides sortability at runtime.
    pub fn set_sortable(&mut self, sortable: bool) {
        self.sortable = sortable;
    }

    /// Overrides filterability at runtime.
    pub fn set_filterable(&mut self, filterable: bool) {
        self.filterable = filterable;
    }

    /// Overrides visibility at runtime.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Returns the select filter option values.
    pub fn select_values(&self) -> &[Value] {
        &self.select_values
    }

    /// Replaces the select filter option values.
    pub fn set_select_values(&mut self, values: Vec<Value>) {
        self.select_values = values;
    }

    /// Returns the row actions attached to this column.
    pub fn row_actions(&self) -> &[RowAction] {
        &self.row_actions
    }

    /// Attaches row actions to this column.
    pub fn set_row_actions(&mut self, actions: Vec<RowAction>) {
        self.row_actions = actions;
    }
}
