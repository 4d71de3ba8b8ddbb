//! PredicateBuilder for defining predicates in a Registry.

use crate::{PredicateDef, Registry, Rule, BASE};
use covenant_core::{ContractError, ContractResult, TypeTag, Value};
use std::rc::Rc;

/// Builder for a predicate definition.
///
/// Parents are resolved by name when `done()` is called; a predicate declared
/// without parents extends the base predicate.
pub struct PredicateBuilder<'a> {
    registry: &'a Registry,
    name: String,
    parent_names: Vec<String>,
    rule: Rule,
    /// Deferred error from a builder step, reported by `done()`.
    error: Option<ContractError>,
}

impl<'a> PredicateBuilder<'a> {
    pub(crate) fn new(registry: &'a Registry, name: String) -> Self {
        Self {
            registry,
            name,
            parent_names: Vec::new(),
            rule: Rule::Accept,
            error: None,
        }
    }

    /// Add a parent predicate by name. Parents check in the order they are added.
    pub fn extends(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_names.push(parent_name.into());
        self
    }

    /// Set the predicate's own rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    /// Own rule: value must have exactly this type.
    pub fn typed(self, tag: TypeTag) -> Self {
        self.rule(Rule::Typed(tag))
    }

    /// Own rule: inclusive bounds.
    pub fn range(self, min: Option<Value>, max: Option<Value>) -> Self {
        self.rule(Rule::Range { min, max })
    }

    /// Own rule: string value must match `pattern`.
    pub fn matches(mut self, pattern: &str) -> Self {
        match Rule::pattern(pattern) {
            Ok(rule) => self.rule = rule,
            Err(e) => self.error = Some(ContractError::invalid_pattern(&self.name, e.to_string())),
        }
        self
    }

    /// Own rule: an arbitrary test. `Err` carries the violation reason.
    pub fn check(self, check: impl Fn(&Value) -> Result<(), String> + 'static) -> Self {
        self.rule(Rule::custom(check))
    }

    /// Finish and register this predicate.
    pub fn done(self) -> ContractResult<Rc<PredicateDef>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut parents = Vec::with_capacity(self.parent_names.len().max(1));
        for parent_name in &self.parent_names {
            parents.push(self.registry.get(parent_name)?);
        }
        if parents.is_empty() && self.name != BASE {
            parents.push(self.registry.get(BASE)?);
        }

        let def = self.registry.detached(self.name, parents, self.rule)?;
        self.registry.insert(Rc::clone(&def))?;
        Ok(def)
    }
}
