//! Export descriptor trait

use crate::grid::Grid;
use crate::http::Response;

/// An export strategy registered on a grid.
///
/// When a request names an export, the grid forces page 0 / limit 0 so the
/// export sees all matching rows, calls [`compute_data`](Export::compute_data)
/// once, and captures [`response`](Export::response) as the request outcome.
/// Encoding is entirely the implementor's concern.
pub trait Export {
    /// Returns the export title.
    fn title(&self) -> &str;

    /// Returns the role required to see this export, if any.
    fn role(&self) -> Option<&str> {
        None
    }

    /// Computes the export payload from the grid's reconciled state.
    fn compute_data(&mut self, grid: &Grid);

    /// Returns the HTTP response carrying the computed payload.
    fn response(&self) -> Response;
}
