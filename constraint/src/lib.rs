//! Covenant Constraint
//!
//! Compose predicates and run their check chains.
//!
//! Responsibilities:
//! - Combine one or more predicates into a single composite with a
//!   deterministic, deduplicated check order
//! - Check values front-to-back, stopping at the first violation
//! - Produce per-link reports for diagnostics

mod composite;
mod report;

pub use composite::CompositePredicate;
pub use report::{CheckReport, LinkOutcome};
