//! Configuration for predicate registries.

use serde::{Deserialize, Serialize};

/// What happens when a predicate name is defined a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Redefinition {
    /// The newest definition replaces the earlier one (last definition wins).
    #[default]
    Replace,
    /// Redefinition fails with `DuplicatePredicate`.
    Reject,
}

/// Configuration for a `Registry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Redefinition policy.
    pub redefinition: Redefinition,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that refuses to redefine names.
    pub fn strict() -> Self {
        Self {
            redefinition: Redefinition::Reject,
        }
    }

    pub fn with_redefinition(mut self, redefinition: Redefinition) -> Self {
        self.redefinition = redefinition;
        self
    }
}
