//! Row action, mass action, and export descriptors

mod export;
mod mass;
mod row;

pub use export::*;
pub use mass::*;
pub use row::*;
