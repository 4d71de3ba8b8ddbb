//! Parameter lists and argument binding.
//!
//! A `Signature` is the declared shape of a guarded callable: its ordered
//! parameters, each optionally annotated with a predicate name and optionally
//! carrying a default. `bind` maps the actual `Args` of a call onto it.

use covenant_core::{ContractError, ContractResult, Value};
use std::fmt;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// Predicate name the argument must satisfy.
    pub annotation: Option<String>,
    /// Value used when the argument is omitted. Parameters without one are required.
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn annotated(name: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: Some(predicate.into()),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// The declared signature of a guarded callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
    /// Recorded for completeness; return values are never checked.
    returns: Option<String>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    /// Add an unannotated parameter.
    pub fn param(self, name: impl Into<String>) -> Self {
        self.push(Param::new(name))
    }

    /// Add a parameter checked against `predicate`.
    pub fn annotated(self, name: impl Into<String>, predicate: impl Into<String>) -> Self {
        self.push(Param::annotated(name, predicate))
    }

    /// Add a fully specified parameter.
    pub fn push(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Record the return annotation.
    pub fn returns(mut self, predicate: impl Into<String>) -> Self {
        self.returns = Some(predicate.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn return_annotation(&self) -> Option<&str> {
        self.returns.as_deref()
    }

    /// Map call arguments onto parameters.
    ///
    /// Only explicitly passed arguments are bound; defaults are filled in
    /// separately by `fill_defaults`.
    pub fn bind(&self, args: Args) -> ContractResult<BoundArgs> {
        let Args { positional, named } = args;
        if positional.len() > self.params.len() {
            return Err(self.mismatch(format!(
                "takes {} positional arguments but {} were given",
                self.params.len(),
                positional.len()
            )));
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(positional) {
            *slot = Some(value);
        }
        for (name, value) in named {
            let Some(index) = self.params.iter().position(|p| p.name == name) else {
                return Err(self.mismatch(format!("got an unexpected keyword argument '{name}'")));
            };
            if slots[index].is_some() {
                return Err(self.mismatch(format!("got multiple values for argument '{name}'")));
            }
            slots[index] = Some(value);
        }

        let mut bound = BoundArgs::new(&self.name);
        for (param, slot) in self.params.iter().zip(slots) {
            match slot {
                Some(value) => bound.values.push((param.name.clone(), value)),
                None if param.is_required() => {
                    return Err(self.mismatch(format!(
                        "missing a required argument: '{}'",
                        param.name
                    )));
                }
                None => {}
            }
        }
        Ok(bound)
    }

    /// Add the default of every omitted optional parameter, keeping
    /// parameter order.
    pub fn fill_defaults(&self, bound: &mut BoundArgs) {
        let mut values = Vec::with_capacity(self.params.len());
        for param in &self.params {
            if let Some(value) = bound.take(&param.name) {
                values.push((param.name.clone(), value));
            } else if let Some(default) = &param.default {
                values.push((param.name.clone(), default.clone()));
            }
        }
        bound.values = values;
    }

    fn mismatch(&self, message: String) -> ContractError {
        ContractError::signature(&self.name, message)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param.name)?;
            if let Some(annotation) = &param.annotation {
                write!(f, ": {annotation}")?;
            }
            if let Some(default) = &param.default {
                write!(f, " = {default}")?;
            }
        }
        write!(f, ")")?;
        if let Some(returns) = &self.returns {
            write!(f, " -> {returns}")?;
        }
        Ok(())
    }
}

/// The actual arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: Vec::new(),
        }
    }
}

/// Passing bound arguments on to another guarded callable sends them all
/// by keyword.
impl From<BoundArgs> for Args {
    fn from(bound: BoundArgs) -> Self {
        Self {
            positional: Vec::new(),
            named: bound.values,
        }
    }
}

/// Arguments matched to parameter names, in parameter order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    function: String,
    values: Vec<(String, Value)>,
}

impl BoundArgs {
    fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
            values: Vec::new(),
        }
    }

    /// Name of the callable these arguments were bound for.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get an argument, failing with `SignatureError` if it is absent.
    pub fn require(&self, name: &str) -> ContractResult<&Value> {
        self.get(name).ok_or_else(|| {
            ContractError::signature(&self.function, format!("no argument bound to '{name}'"))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over `(name, value)` pairs in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.values.iter().position(|(n, _)| n == name)?;
        Some(self.values.remove(index).1)
    }
}
