//! Covenant Demo
//!
//! The bundled predicate catalog and the pieces behind the `covenant`
//! command-line tool.

mod catalog;
mod convert;
mod error;
mod settings;

pub use catalog::{Catalog, MOVE, NONEMPTY_STRING, POINT, POSITIVE_INTEGER};
pub use convert::from_json;
pub use error::{DemoError, DemoResult};
pub use settings::Settings;
