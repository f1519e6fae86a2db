//! Mass action descriptor

use std::sync::Arc;

use indexmap::IndexMap;

use crate::grid::Grid;
use crate::http::Response;
use crate::model::Value;

/// The callback invoked when a mass action is dispatched.
///
/// Inline callbacks run in-process with the selected row identities and the
/// grid. Controller callbacks name a `controller:action` pair forwarded as a
/// sub-request by the dispatcher collaborator.
#[derive(Clone)]
pub enum MassActionCallback {
    /// In-process closure over `(selected ids, grid)`.
    Inline(Arc<dyn Fn(&[Value], &Grid) -> Option<Response> + Send + Sync>),
    /// A `controller:action` reference dispatched as a sub-request.
    Controller(String),
}

impl std::fmt::Debug for MassActionCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MassActionCallback::Inline(_) => f.write_str("Inline(..)"),
            MassActionCallback::Controller(target) => {
                f.debug_tuple("Controller").field(target).finish()
            }
        }
    }
}

/// An operation applied to a selected set of rows.
///
/// # Example
///
/// ```
/// use datagrid_lib::action::MassAction;
///
/// let action = MassAction::new("Delete")
///     .with_callback_fn(|ids, _grid| {
///         let _ = ids;
///         None
///     });
///
/// assert_eq!(action.title(), "Delete");
/// ```
#[derive(Debug, Clone)]
pub struct MassAction {
    title: String,
    callback: Option<MassActionCallback>,
    confirm: bool,
    role: Option<String>,
    parameters: IndexMap<String, serde_json::Value>,
}

impl MassAction {
    /// Creates a mass action with no callback attached yet.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            callback: None,
            confirm: false,
            role: None,
            parameters: IndexMap::new(),
        }
    }

    /// Attaches a callback.
    pub fn with_callback(mut self, callback: MassActionCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Attaches an inline closure callback.
    pub fn with_callback_fn<F>(self, callback: F) -> Self
    where
        F: Fn(&[Value], &Grid) -> Option<Response> + Send + Sync + 'static,
    {
        self.with_callback(MassActionCallback::Inline(Arc::new(callback)))
    }

    /// Attaches a `controller:action` callback.
    pub fn with_controller(self, target: impl Into<String>) -> Self {
        self.with_callback(MassActionCallback::Controller(target.into()))
    }

    /// Requires a confirmation prompt before dispatch.
    pub fn confirm(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    /// Requires a role to see and run this action.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Adds a parameter forwarded to the callback.
    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Returns the action title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the callback, if one is attached.
    pub fn callback(&self) -> Option<&MassActionCallback> {
        self.callback.as_ref()
    }

    /// Returns `true` when the action asks for confirmation.
    pub fn needs_confirm(&self) -> bool {
        self.confirm
    }

    /// Returns the required role, if any.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns the parameters forwarded to the callback.
    pub fn parameters(&self) -> &IndexMap<String, serde_json::Value> {
        &self.parameters
    }
}
