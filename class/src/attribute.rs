//! Managed attributes.

use covenant_constraint::CompositePredicate;
use covenant_core::{ContractError, ContractResult, Instance, Value};

/// The validated storage slot of one declared field.
///
/// Assignment checks first and stores only on success, so a rejected value
/// never replaces what the instance already holds.
#[derive(Debug, Clone)]
pub struct ManagedAttribute {
    field: String,
    predicate: CompositePredicate,
}

impl ManagedAttribute {
    pub fn new(field: impl Into<String>, predicate: CompositePredicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn predicate(&self) -> &CompositePredicate {
        &self.predicate
    }

    /// Check `value` and store it in the instance.
    pub fn assign(&self, instance: &Instance, value: Value) -> ContractResult<()> {
        if let Err(err) = self.predicate.check(&value) {
            tracing::debug!(
                class = instance.class_name(),
                field = %self.field,
                %value,
                error = %err,
                "assignment rejected"
            );
            return Err(err.with_target(&self.field));
        }
        instance.store_slot(&self.field, value);
        Ok(())
    }

    /// The stored value.
    pub fn read(&self, instance: &Instance) -> ContractResult<Value> {
        instance
            .slot(&self.field)
            .ok_or_else(|| ContractError::attribute_missing(instance.class_name(), &self.field))
    }

    pub fn is_set(&self, instance: &Instance) -> bool {
        instance.has_slot(&self.field)
    }
}
