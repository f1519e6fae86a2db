//! Server-side data grid engine.
//!
//! A [`Grid`] reconciles tabular state (columns, filters, sort, pagination,
//! presets) against one HTTP request plus session-persisted state, drives a
//! [`source::Source`] to materialize the matching page of rows, and dispatches
//! row-set operations (mass actions, exports) registered on it. Framework
//! concerns (routing, sessions, authorization, sub-requests) stay behind the
//! traits in [`http`].
//!
//! # Example
//!
//! ```no_run
//! use datagrid_lib::Grid;
//! use datagrid_lib::column::Column;
//! use datagrid_lib::http::GridServices;
//! use datagrid_lib::http::HttpRequest;
//! use datagrid_lib::model::Row;
//! use datagrid_lib::source::VectorSource;
//! # fn services() -> GridServices { unimplemented!() }
//! # fn request() -> Box<dyn HttpRequest> { unimplemented!() }
//!
//! let mut grid = Grid::new(services(), "books");
//! grid.add_column(Column::new("id", "Id").primary(true));
//! grid.add_column(Column::new("title", "Title"));
//! grid.set_source(Box::new(VectorSource::new(
//!     "books",
//!     vec![Row::new().set("id", 1i64).set("title", "Dune")],
//! )))?;
//! grid.set_limits(vec![10u64, 50])?;
//!
//! grid.handle_request(&*request())?;
//! for row in grid.rows()?.iter() {
//!     println!("{}", row.field("title").render());
//! }
//! # Ok::<(), datagrid_lib::error::Error>(())
//! ```

pub mod action;
pub mod column;
pub mod error;
pub mod http;
pub mod model;
pub mod source;

mod config;
mod grid;
mod tweak;

pub use config::*;
pub use grid::*;
pub use tweak::*;
