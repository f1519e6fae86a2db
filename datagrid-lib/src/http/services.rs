//! Routing, authorization, and sub-request collaborators

use std::sync::Arc;

use indexmap::IndexMap;

use super::Response;
use super::SessionStorage;

/// Generates URLs from route names.
pub trait Router {
    /// Returns the URL for a route name and its parameters.
    fn generate(&self, route: &str, parameters: &IndexMap<String, String>) -> String;
}

/// Answers role checks for role-gated columns, actions, and exports.
pub trait Authorizer {
    /// Returns `true` when the current caller holds the given role.
    fn is_granted(&self, role: &str) -> bool;
}

/// Forwards `controller:action` mass action callbacks as sub-requests.
pub trait SubRequestDispatcher {
    /// Dispatches the controller action with the given parameters.
    fn forward(&self, controller: &str, parameters: IndexMap<String, serde_json::Value>)
    -> Response;
}

/// The collaborator handles a grid is constructed with.
#[derive(Clone)]
pub struct GridServices {
    /// URL generation.
    pub router: Arc<dyn Router + Send + Sync>,
    /// Role checks.
    pub authorizer: Arc<dyn Authorizer + Send + Sync>,
    /// Session buckets.
    pub session: Arc<dyn SessionStorage + Send + Sync>,
    /// Sub-request dispatch for controller mass action callbacks.
    pub dispatcher: Option<Arc<dyn SubRequestDispatcher + Send + Sync>>,
}

impl GridServices {
    /// Bundles the required collaborators, with no dispatcher.
    pub fn new(
        router: Arc<dyn Router + Send + Sync>,
        authorizer: Arc<dyn Authorizer + Send + Sync>,
        session: Arc<dyn SessionStorage + Send + Sync>,
    ) -> Self {
        Self {
            router,
            authorizer,
            session,
            dispatcher: None,
        }
    }

    /// Adds a sub-request dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn SubRequestDispatcher + Send + Sync>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }
}

impl std::fmt::Debug for GridServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridServices")
            .field("dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}
