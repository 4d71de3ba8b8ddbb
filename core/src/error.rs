//! Common error types for Covenant.

use thiserror::Error;

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors raised by predicate checks, registry lookups, call guards and
/// declared classes. None of them are recovered internally: the operation
/// that triggered one is aborted with no partial state left behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    /// A value failed a predicate's rule.
    #[error("Contract violated by {predicate}: {reason}{}", target_suffix(.target))]
    ContractViolation {
        predicate: String,
        reason: String,
        target: Option<String>,
    },

    /// A predicate's rule needs an operation the value does not support
    /// (ordering a string against zero, taking the length of an integer).
    #[error(
        "{predicate} cannot apply {operation} to a value of type {found}{}",
        target_suffix(.target)
    )]
    Inapplicable {
        predicate: String,
        operation: String,
        found: String,
        target: Option<String>,
    },

    #[error("Unknown predicate: {name}")]
    UnknownPredicate { name: String },

    #[error("Predicate already defined: {name}")]
    DuplicatePredicate { name: String },

    #[error("Cannot linearize predicate {predicate}: inconsistent parent order")]
    InconsistentHierarchy { predicate: String },

    #[error("Invalid pattern in predicate {predicate}: {message}")]
    InvalidPattern { predicate: String, message: String },

    #[error("Signature mismatch calling {function}: {message}")]
    SignatureError { function: String, message: String },

    #[error("{class} expects {expected} arguments, got {actual}")]
    ArityError {
        class: String,
        expected: usize,
        actual: usize,
    },

    #[error("Attribute not set: {field} on {class}")]
    AttributeMissing { class: String, field: String },

    #[error("Unknown field: {field} on {class}")]
    UnknownField { class: String, field: String },

    #[error("Unknown method: {method} on {class}")]
    UnknownMethod { class: String, method: String },
}

fn target_suffix(target: &Option<String>) -> String {
    match target {
        Some(name) => format!(" (for '{}')", name),
        None => String::new(),
    }
}

impl ContractError {
    pub fn violation(predicate: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            predicate: predicate.into(),
            reason: reason.into(),
            target: None,
        }
    }

    pub fn inapplicable(
        predicate: impl Into<String>,
        operation: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Inapplicable {
            predicate: predicate.into(),
            operation: operation.into(),
            found: found.into(),
            target: None,
        }
    }

    pub fn unknown_predicate(name: impl Into<String>) -> Self {
        Self::UnknownPredicate { name: name.into() }
    }

    pub fn duplicate_predicate(name: impl Into<String>) -> Self {
        Self::DuplicatePredicate { name: name.into() }
    }

    pub fn inconsistent_hierarchy(predicate: impl Into<String>) -> Self {
        Self::InconsistentHierarchy {
            predicate: predicate.into(),
        }
    }

    pub fn invalid_pattern(predicate: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            predicate: predicate.into(),
            message: message.into(),
        }
    }

    pub fn signature(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SignatureError {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn arity(class: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ArityError {
            class: class.into(),
            expected,
            actual,
        }
    }

    pub fn attribute_missing(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::AttributeMissing {
            class: class.into(),
            field: field.into(),
        }
    }

    pub fn unknown_field(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            class: class.into(),
            field: field.into(),
        }
    }

    pub fn unknown_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Attach the field or parameter name a check failure was raised for.
    /// Errors that are not check failures are returned unchanged.
    pub fn with_target(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::ContractViolation { target, .. } | Self::Inapplicable { target, .. } => {
                *target = Some(name.into());
            }
            _ => {}
        }
        self
    }

    /// Returns true if this is a `ContractViolation`.
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    /// The predicate whose rule rejected the value, for check failures.
    pub fn predicate(&self) -> Option<&str> {
        match self {
            Self::ContractViolation { predicate, .. } | Self::Inapplicable { predicate, .. } => {
                Some(predicate)
            }
            _ => None,
        }
    }

    /// The human-readable reason of a `ContractViolation`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::ContractViolation { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The field or parameter a check failure was raised for.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::ContractViolation { target, .. } | Self::Inapplicable { target, .. } => {
                target.as_deref()
            }
            _ => None,
        }
    }
}
