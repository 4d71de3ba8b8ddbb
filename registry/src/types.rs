//! Predicate definition types.

use crate::linearize::linearize;
use covenant_core::{ContractError, ContractResult, TypeTag, Value};
use regex_lite::Regex;
use std::fmt;
use std::rc::Rc;

/// Unique identifier for a predicate definition.
///
/// Redefining a name allocates a new id, so chains built against the earlier
/// definition keep checking the earlier rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateId(pub u32);

impl PredicateId {
    /// Create a new PredicateId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Closure signature for custom rules. `Err` carries the violation reason.
pub type CheckFn = dyn Fn(&Value) -> Result<(), String>;

/// The own rule of a predicate: the test it performs before deferring to the
/// rest of its chain.
#[derive(Clone)]
pub enum Rule {
    /// No test of its own.
    Accept,
    /// Value must have exactly this type.
    Typed(TypeTag),
    /// Value must be < 0.
    Negative,
    /// Value must be > 0.
    Positive,
    /// Value must have a length > 0.
    Nonempty,
    /// Inclusive bounds.
    Range { min: Option<Value>, max: Option<Value> },
    /// Inclusive bounds on the value's length.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// String value must match the pattern.
    Matches(Regex),
    /// Value must equal one of the listed values.
    OneOf(Vec<Value>),
    /// Arbitrary test.
    Custom(Rc<CheckFn>),
}

impl Rule {
    /// Wrap a closure as a rule.
    pub fn custom(check: impl Fn(&Value) -> Result<(), String> + 'static) -> Self {
        Rule::Custom(Rc::new(check))
    }

    /// Compile a pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self, regex_lite::Error> {
        Regex::new(pattern).map(Rule::Matches)
    }

    /// Run this rule on `value`, reporting failures under `predicate`.
    pub fn check(&self, predicate: &str, value: &Value) -> ContractResult<()> {
        match self {
            Rule::Accept => Ok(()),
            Rule::Typed(tag) => {
                if tag.matches(value) {
                    Ok(())
                } else {
                    Err(ContractError::violation(
                        predicate,
                        format!("Expected {}, got {}", tag, value.type_name()),
                    ))
                }
            }
            Rule::Negative => compare(predicate, value.lt(&Value::Int(0)), value, "Must be < 0"),
            Rule::Positive => compare(predicate, value.gt(&Value::Int(0)), value, "Must be > 0"),
            Rule::Nonempty => match value.length() {
                Some(0) => Err(ContractError::violation(predicate, "Must be nonempty")),
                Some(_) => Ok(()),
                None => Err(ContractError::inapplicable(predicate, "len", value.type_name())),
            },
            Rule::Range { min, max } => {
                if let Some(min) = min {
                    compare(predicate, value.gte(min), value, &format!("Must be >= {}", min))?;
                }
                if let Some(max) = max {
                    compare(predicate, value.lte(max), value, &format!("Must be <= {}", max))?;
                }
                Ok(())
            }
            Rule::Length { min, max } => {
                let len = value.length().ok_or_else(|| {
                    ContractError::inapplicable(predicate, "len", value.type_name())
                })?;
                if let Some(min) = min {
                    if len < *min {
                        return Err(ContractError::violation(
                            predicate,
                            format!("Length must be >= {}", min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(ContractError::violation(
                            predicate,
                            format!("Length must be <= {}", max),
                        ));
                    }
                }
                Ok(())
            }
            Rule::Matches(regex) => {
                let text = value.as_str().ok_or_else(|| {
                    ContractError::inapplicable(predicate, "pattern match", value.type_name())
                })?;
                if regex.is_match(text) {
                    Ok(())
                } else {
                    Err(ContractError::violation(
                        predicate,
                        format!("Must match pattern {}", regex.as_str()),
                    ))
                }
            }
            Rule::OneOf(allowed) => {
                if allowed.contains(value) {
                    Ok(())
                } else {
                    Err(ContractError::violation(
                        predicate,
                        format!("Must be one of {}", Value::List(allowed.clone())),
                    ))
                }
            }
            Rule::Custom(check) => {
                check(value).map_err(|reason| ContractError::violation(predicate, reason))
            }
        }
    }
}

/// Map a comparison outcome to a check result. `None` means the value cannot
/// be ordered against the bound at all.
fn compare(
    predicate: &str,
    outcome: Option<bool>,
    value: &Value,
    reason: &str,
) -> ContractResult<()> {
    match outcome {
        Some(true) => Ok(()),
        Some(false) => Err(ContractError::violation(predicate, reason)),
        None => Err(ContractError::inapplicable(
            predicate,
            "comparison",
            value.type_name(),
        )),
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Custom(_) => write!(f, "Custom(<fn>)"),
            Rule::Matches(regex) => write!(f, "Matches({:?})", regex.as_str()),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Accept => write!(f, "accept"),
            Rule::Typed(tag) => write!(f, "type {}", tag),
            Rule::Negative => write!(f, "< 0"),
            Rule::Positive => write!(f, "> 0"),
            Rule::Nonempty => write!(f, "nonempty"),
            Rule::Range { min, max } => write!(f, "range [{}..{}]", bound(min), bound(max)),
            Rule::Length { min, max } => write!(
                f,
                "length [{}..{}]",
                min.map(|m| m.to_string()).unwrap_or_default(),
                max.map(|m| m.to_string()).unwrap_or_default()
            ),
            Rule::Matches(regex) => write!(f, "matches /{}/", regex.as_str()),
            Rule::OneOf(values) => write!(f, "one of {}", Value::List(values.clone())),
            Rule::Custom(_) => write!(f, "custom"),
        }
    }
}

fn bound(value: &Option<Value>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// A named predicate definition.
pub struct PredicateDef {
    /// Unique identifier.
    pub id: PredicateId,
    /// Predicate name.
    pub name: String,
    /// Declared parents, in declaration order.
    pub parents: Vec<Rc<PredicateDef>>,
    /// The predicate's own test.
    pub rule: Rule,
    /// Linearized ancestors (every ancestor once, most specific first).
    ancestors: Vec<Rc<PredicateDef>>,
}

impl PredicateDef {
    /// Build a definition and linearize its parents.
    pub(crate) fn new(
        id: PredicateId,
        name: impl Into<String>,
        parents: Vec<Rc<PredicateDef>>,
        rule: Rule,
    ) -> ContractResult<Self> {
        let name = name.into();
        let ancestors = linearize(&name, &parents)?;
        Ok(Self {
            id,
            name,
            parents,
            rule,
            ancestors,
        })
    }

    /// Assemble a definition whose ancestors are already linearized.
    pub(crate) fn from_parts(
        id: PredicateId,
        name: impl Into<String>,
        parents: Vec<Rc<PredicateDef>>,
        rule: Rule,
        ancestors: Vec<Rc<PredicateDef>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            parents,
            rule,
            ancestors,
        }
    }

    /// Linearized ancestors, not including this predicate.
    pub fn ancestors(&self) -> &[Rc<PredicateDef>] {
        &self.ancestors
    }

    /// The full check chain: this predicate followed by its ancestors.
    pub fn linearization(self: &Rc<Self>) -> Vec<Rc<PredicateDef>> {
        std::iter::once(Rc::clone(self))
            .chain(self.ancestors.iter().cloned())
            .collect()
    }

    /// Names along the check chain.
    pub fn linearization_names(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.ancestors.iter().map(|a| a.name.as_str()))
            .collect()
    }

    /// Check whether an ancestor with this name appears in the chain.
    pub fn derives_from(&self, name: &str) -> bool {
        self.ancestors.iter().any(|a| a.name == name)
    }

    /// Run only this predicate's own rule.
    pub fn own_check(&self, value: &Value) -> ContractResult<()> {
        self.rule.check(&self.name, value)
    }
}

impl fmt::Debug for PredicateDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            )
            .field("rule", &self.rule)
            .finish()
    }
}

impl fmt::Display for PredicateDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
