//! Value, row, and filter models

mod filter;
mod row;
mod value;

pub use filter::*;
pub use row::*;
pub use value::*;
