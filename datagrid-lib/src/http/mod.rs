//! HTTP collaborator traits and the query parameter namespace

pub mod params;

mod request;
mod response;
mod services;
mod session;

pub use request::*;
pub use response::*;
pub use services::*;
pub use session::*;
