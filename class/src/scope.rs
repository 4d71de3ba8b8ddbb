//! Class-local predicate scope.

use covenant_constraint::CompositePredicate;
use covenant_core::{ContractError, ContractResult};
use covenant_registry::{PredicateDef, Registry, Rule, BASE};
use std::collections::HashMap;
use std::rc::Rc;

/// Predicate names visible while a class is declared.
///
/// Local definitions shadow registry names for lookups made through this
/// scope and are never inserted into the registry, so other classes and
/// standalone functions do not see them.
#[derive(Debug, Clone)]
pub struct PredicateScope {
    registry: Registry,
    /// Class-local definitions by name.
    locals: Rc<HashMap<String, Rc<PredicateDef>>>,
}

impl PredicateScope {
    /// Create a scope with no local definitions.
    pub fn new(registry: &Registry) -> Self {
        Self {
            registry: registry.clone(),
            locals: Rc::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Define a local predicate. Parents resolve through this scope, so a
    /// local may extend an earlier local; with no parents it extends the base.
    pub fn define_local(
        &mut self,
        name: impl Into<String>,
        parents: &[&str],
        rule: Rule,
    ) -> ContractResult<Rc<PredicateDef>> {
        let name = name.into();
        let mut resolved = Vec::with_capacity(parents.len().max(1));
        for parent in parents {
            resolved.push(self.get(parent)?);
        }
        if resolved.is_empty() {
            resolved.push(self.registry.get(BASE)?);
        }

        let def = self.registry.detached(name.clone(), resolved, rule)?;
        tracing::debug!(predicate = %name, id = %def.id, "defined class-local predicate");
        Rc::make_mut(&mut self.locals).insert(name, Rc::clone(&def));
        Ok(def)
    }

    /// Look up a name, locals first.
    pub fn lookup(&self, name: &str) -> Option<Rc<PredicateDef>> {
        self.locals
            .get(name)
            .cloned()
            .or_else(|| self.registry.lookup(name))
    }

    /// Look up a name, failing with `UnknownPredicate`.
    pub fn get(&self, name: &str) -> ContractResult<Rc<PredicateDef>> {
        self.lookup(name)
            .ok_or_else(|| ContractError::unknown_predicate(name))
    }

    /// The check chain for a name as currently visible.
    pub fn composite(&self, name: &str) -> ContractResult<CompositePredicate> {
        self.get(name).map(|def| CompositePredicate::of(&def))
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    /// Get local names, sorted.
    pub fn local_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.locals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_core::Value;
    use covenant_registry::{INTEGER, POSITIVE};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_shadows_registry() {
        // GIVEN
        let registry = Registry::with_builtins();
        let mut scope = PredicateScope::new(&registry);

        // WHEN
        scope
            .define_local(INTEGER, &[POSITIVE], Rule::Accept)
            .unwrap();

        // THEN
        assert!(scope.is_local(INTEGER));
        assert!(scope.composite(INTEGER).unwrap().is_satisfied_by(&Value::Float(2.5)));
        assert!(!registry
            .get(INTEGER)
            .map(|def| CompositePredicate::of(&def))
            .unwrap()
            .is_satisfied_by(&Value::Float(2.5)));
    }

    #[test]
    fn test_locals_never_reach_registry() {
        let registry = Registry::with_builtins();
        let mut scope = PredicateScope::new(&registry);
        let rule = Rule::Range {
            min: None,
            max: Some(Value::Int(9)),
        };
        scope.define_local("Small", &[INTEGER], rule).unwrap();

        assert_eq!(scope.local_names(), vec!["Small"]);
        assert!(scope.lookup("Small").is_some());
        assert!(!registry.contains("Small"));
        assert!(PredicateScope::new(&registry).lookup("Small").is_none());
    }

    #[test]
    fn test_local_may_extend_earlier_local() {
        // GIVEN
        let registry = Registry::with_builtins();
        let mut scope = PredicateScope::new(&registry);
        let rule = Rule::Range {
            min: Some(Value::Int(0)),
            max: Some(Value::Int(9)),
        };
        scope.define_local("Digit", &[INTEGER], rule).unwrap();

        // WHEN
        let odd_rule = Rule::custom(|v| match v.as_int() {
            Some(i) if i % 2 == 1 => Ok(()),
            _ => Err("Must be odd".into()),
        });
        let odd = scope.define_local("OddDigit", &["Digit"], odd_rule).unwrap();

        // THEN
        assert_eq!(
            odd.linearization_names(),
            vec!["OddDigit", "Digit", "Integer", "Typed", "Contract"]
        );
    }

    #[test]
    fn test_unknown_name() {
        let scope = PredicateScope::new(&Registry::new());
        assert_eq!(
            scope.get("Missing").unwrap_err(),
            ContractError::unknown_predicate("Missing")
        );
    }
}
