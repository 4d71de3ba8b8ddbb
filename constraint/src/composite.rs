//! Composite predicates and their check chain.

use crate::report::{CheckReport, LinkOutcome};
use covenant_core::{ContractResult, Value};
use covenant_registry::{linearize, PredicateDef, Registry, BASE};
use std::fmt;
use std::rc::Rc;

/// An ordered, deduplicated chain of predicates checked as one.
///
/// Links run front-to-back. Each link runs only its own rule and then defers
/// to the next, so a value is accepted only when every link accepts it, and
/// the first rejecting link's error is what the caller sees.
#[derive(Clone)]
pub struct CompositePredicate {
    name: String,
    chain: Vec<Rc<PredicateDef>>,
}

impl CompositePredicate {
    /// The chain of a defined predicate.
    pub fn of(def: &Rc<PredicateDef>) -> Self {
        Self {
            name: def.name.clone(),
            chain: def.linearization(),
        }
    }

    /// The chain of the predicate currently registered under `name`.
    pub fn resolve(registry: &Registry, name: &str) -> ContractResult<Self> {
        registry.get(name).map(|def| Self::of(&def))
    }

    /// Compose registered predicates without registering the result.
    /// With no names the composite is the base predicate alone.
    pub fn compose(registry: &Registry, names: &[&str]) -> ContractResult<Self> {
        let mut parents = Vec::with_capacity(names.len());
        for name in names {
            parents.push(registry.get(name)?);
        }
        if parents.is_empty() {
            parents.push(registry.get(BASE)?);
        }
        Self::from_parents(names.join("+"), &parents)
    }

    /// Compose already-resolved definitions under a display name.
    pub fn from_parents(
        name: impl Into<String>,
        parents: &[Rc<PredicateDef>],
    ) -> ContractResult<Self> {
        let name = name.into();
        let chain = linearize(&name, parents)?;
        Ok(Self { name, chain })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The links in check order.
    pub fn chain(&self) -> &[Rc<PredicateDef>] {
        &self.chain
    }

    /// Link names in check order.
    pub fn chain_names(&self) -> Vec<&str> {
        self.chain.iter().map(|link| link.name.as_str()).collect()
    }

    /// Get the number of links.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Check if a link with this name is part of the chain.
    pub fn contains(&self, name: &str) -> bool {
        self.chain.iter().any(|link| link.name == name)
    }

    /// Run the chain on `value`, stopping at the first failing link.
    pub fn check(&self, value: &Value) -> ContractResult<()> {
        for link in &self.chain {
            tracing::trace!(composite = %self.name, link = %link.name, "checking link");
            link.own_check(value)?;
        }
        Ok(())
    }

    /// Check if `value` passes every link.
    pub fn is_satisfied_by(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    /// Run every link on `value` without stopping, recording each outcome.
    pub fn evaluate(&self, value: &Value) -> CheckReport {
        let mut report = CheckReport::new(&self.name, value.to_string());
        for link in &self.chain {
            report.push(match link.own_check(value) {
                Ok(()) => LinkOutcome::passed(&link.name),
                Err(err) => LinkOutcome::failed(&link.name, err),
            });
        }
        report
    }
}

impl fmt::Debug for CompositePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositePredicate")
            .field("name", &self.name)
            .field("chain", &self.chain_names())
            .finish()
    }
}

impl fmt::Display for CompositePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.chain_names().join(" -> "))
    }
}
