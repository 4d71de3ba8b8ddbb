//! Covenant Core Types
//!
//! This crate provides the foundational types used throughout Covenant:
//! - Value types (the Value enum checked by predicates, and its TypeTag)
//! - Instance storage for declared classes, and the Layout seam that validates it
//! - The common ContractError type

mod entity;
mod error;
mod value;

pub use entity::*;
pub use error::*;
pub use value::*;
