//! The Registry - shared predicate lookup.

use crate::builtins;
use crate::{PredicateBuilder, PredicateDef, PredicateId, Redefinition, RegistryConfig, Rule};
use covenant_core::{ContractError, ContractResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static GLOBAL: Registry = Registry::with_builtins();
}

#[derive(Debug)]
struct RegistryState {
    config: RegistryConfig,
    /// Next predicate ID to allocate.
    next_id: u32,
    /// Current definition for each name.
    predicates: HashMap<String, Rc<PredicateDef>>,
}

/// The Registry maps predicate names to their current definition.
///
/// It is a cheap handle: clones share the same table. Definitions are added
/// as predicates are defined (normally at startup) and read afterwards when
/// classes are declared and guarded calls are made. Nothing is ever removed;
/// redefining a name replaces the entry unless the config rejects it.
///
/// The handle is single-threaded. Each `Registry::new()` starts fresh, so
/// tests can use their own instead of the shared `Registry::global()`.
#[derive(Debug, Clone)]
pub struct Registry {
    state: Rc<RefCell<RegistryState>>,
}

impl Registry {
    /// Create a registry holding only the base predicate.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with the given config, holding only the base predicate.
    pub fn with_config(config: RegistryConfig) -> Self {
        let registry = Self {
            state: Rc::new(RefCell::new(RegistryState {
                config,
                next_id: 0,
                predicates: HashMap::new(),
            })),
        };
        builtins::install_base(&registry);
        registry
    }

    /// Create a registry holding every built-in predicate.
    pub fn with_builtins() -> Self {
        Self::new().with_builtin_predicates()
    }

    /// Seed the built-in predicates. Seeding replaces any existing
    /// definitions of the built-in names, whatever the redefinition policy.
    pub fn with_builtin_predicates(self) -> Self {
        builtins::install(&self);
        self
    }

    /// The per-thread default registry, seeded with the built-ins.
    pub fn global() -> Self {
        GLOBAL.with(Registry::clone)
    }

    /// Returns true if both handles share the same table.
    pub fn same(&self, other: &Registry) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub fn config(&self) -> RegistryConfig {
        self.state.borrow().config.clone()
    }

    // ==================== Definition ====================

    /// Start defining a predicate. It is registered when the builder's
    /// `done()` succeeds.
    pub fn define(&self, name: impl Into<String>) -> PredicateBuilder<'_> {
        PredicateBuilder::new(self, name.into())
    }

    /// Define a predicate that composes existing ones and has no rule of its own.
    pub fn compose(
        &self,
        name: impl Into<String>,
        parents: &[&str],
    ) -> ContractResult<Rc<PredicateDef>> {
        parents
            .iter()
            .fold(self.define(name), |builder, parent| builder.extends(*parent))
            .done()
    }

    /// Build and linearize a definition without registering it.
    pub fn detached(
        &self,
        name: impl Into<String>,
        parents: Vec<Rc<PredicateDef>>,
        rule: Rule,
    ) -> ContractResult<Rc<PredicateDef>> {
        let id = self.allocate_id();
        PredicateDef::new(id, name, parents, rule).map(Rc::new)
    }

    /// Register a definition under its name, honoring the redefinition policy.
    pub fn insert(&self, def: Rc<PredicateDef>) -> ContractResult<()> {
        let mut state = self.state.borrow_mut();
        let exists = state.predicates.contains_key(&def.name);
        if exists && state.config.redefinition == Redefinition::Reject {
            return Err(ContractError::duplicate_predicate(&def.name));
        }

        if exists {
            tracing::debug!(
                predicate = %def.name,
                id = %def.id,
                "redefined predicate, last definition wins"
            );
        } else {
            tracing::debug!(
                predicate = %def.name,
                id = %def.id,
                chain = ?def.linearization_names(),
                "defined predicate"
            );
        }
        state.predicates.insert(def.name.clone(), def);
        Ok(())
    }

    /// Register a definition unconditionally.
    pub(crate) fn seed(&self, def: Rc<PredicateDef>) {
        self.state
            .borrow_mut()
            .predicates
            .insert(def.name.clone(), def);
    }

    pub(crate) fn allocate_id(&self) -> PredicateId {
        let mut state = self.state.borrow_mut();
        let id = PredicateId::new(state.next_id);
        state.next_id += 1;
        id
    }

    // ==================== Lookups ====================

    /// Get the current definition of a predicate.
    pub fn get(&self, name: &str) -> ContractResult<Rc<PredicateDef>> {
        self.lookup(name)
            .ok_or_else(|| ContractError::unknown_predicate(name))
    }

    /// Get the current definition of a predicate, if any.
    pub fn lookup(&self, name: &str) -> Option<Rc<PredicateDef>> {
        self.state.borrow().predicates.get(name).cloned()
    }

    /// Check if a predicate name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.state.borrow().predicates.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.borrow().predicates.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered predicates.
    pub fn len(&self) -> usize {
        self.state.borrow().predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().predicates.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BASE, INTEGER};
    use covenant_core::{TypeTag, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_registry_holds_only_base() {
        let registry = Registry::new();
        assert_eq!(registry.names(), vec![BASE.to_string()]);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_unknown_predicate() {
        let registry = Registry::new();
        assert_eq!(
            registry.get("Nope").unwrap_err(),
            ContractError::unknown_predicate("Nope")
        );
    }

    #[test]
    fn test_redefinition_last_definition_wins() {
        // GIVEN
        let registry = Registry::with_builtins();
        let first = registry.get(INTEGER).unwrap();

        // WHEN
        let second = registry
            .define(INTEGER)
            .rule(Rule::Typed(TypeTag::Float))
            .done()
            .unwrap();

        // THEN
        let current = registry.get(INTEGER).unwrap();
        assert_eq!(current.id, second.id);
        assert_ne!(current.id, first.id);
        assert!(current.own_check(&Value::Float(1.0)).is_ok());
    }

    #[test]
    fn test_strict_registry_rejects_redefinition() {
        // GIVEN
        let registry = Registry::with_config(RegistryConfig::strict()).with_builtin_predicates();

        // WHEN
        let result = registry.compose(INTEGER, &[]);

        // THEN
        assert_eq!(
            result.unwrap_err(),
            ContractError::duplicate_predicate(INTEGER)
        );
    }

    #[test]
    fn test_detached_is_not_registered() {
        let registry = Registry::new();
        let base = registry.get(BASE).unwrap();
        let local = registry.detached("Local", vec![base], Rule::Accept).unwrap();
        assert_eq!(local.linearization_names(), vec!["Local", BASE]);
        assert!(!registry.contains("Local"));
    }

    #[test]
    fn test_clones_share_state() {
        let registry = Registry::new();
        let handle = registry.clone();
        handle.compose("Shared", &[]).unwrap();
        assert!(registry.contains("Shared"));
        assert!(registry.same(&handle));
        assert!(!registry.same(&Registry::new()));
    }

    #[test]
    fn test_global_registry_is_shared_per_thread() {
        let global = Registry::global();
        assert!(global.same(&Registry::global()));
        assert!(global.contains(INTEGER));
    }
}
