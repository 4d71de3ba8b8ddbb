//! Covenant Registry
//!
//! Named predicates and the shared table that resolves them.
//!
//! - `PredicateDef` / `Rule` - a predicate's identity, parents and own test
//! - `Registry` - name lookup, last definition wins by default
//! - `PredicateBuilder` - defining and composing predicates
//! - `linearize` - the deterministic check order of composed predicates
//! - built-in predicates (`Integer`, `Positive`, `Nonempty`, ...)

mod builder;
mod builtins;
mod config;
mod linearize;
mod registry;
mod types;

pub use builder::PredicateBuilder;
pub use builtins::{BASE, FLOAT, INTEGER, NEGATIVE, NONEMPTY, POSITIVE, STRING, TYPED};
pub use config::{Redefinition, RegistryConfig};
pub use linearize::linearize;
pub use registry::Registry;
pub use types::*;
