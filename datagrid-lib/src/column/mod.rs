//! Column definitions and the ordered column collection

#[allow(clippy::module_inception)]
mod column;
mod columns;

pub use column::*;
pub use columns::*;
