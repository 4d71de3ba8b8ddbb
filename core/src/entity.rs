//! Instance storage for declared classes.
//!
//! An instance owns one slot per assigned field. Which fields exist, in what
//! order, and which predicates guard them is decided by its `Layout`, shared by
//! every instance of the same declared class.

use crate::{ContractResult, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Type alias for slot storage, keyed by field name.
pub type Attributes = HashMap<String, Value>;

/// Shared handle to an instance.
pub type InstanceRef = Rc<Instance>;

/// The validated shape of a declared class.
///
/// Reads and writes that go through `Instance::get`/`Instance::set` are routed
/// here so the class can run its field predicates before touching storage.
pub trait Layout: fmt::Debug {
    /// Name of the declared class.
    fn class_name(&self) -> &str;

    /// Declared field names, in declaration order.
    fn field_names(&self) -> Vec<&str>;

    /// Validate `value` for `field` and store it in `instance`.
    fn assign(&self, instance: &Instance, field: &str, value: Value) -> ContractResult<()>;

    /// Read the stored value of `field` from `instance`.
    fn read(&self, instance: &Instance, field: &str) -> ContractResult<Value>;
}

/// An instance of a declared class.
pub struct Instance {
    layout: Rc<dyn Layout>,
    slots: RefCell<Attributes>,
}

impl Instance {
    /// Create an instance with no field assigned.
    pub fn new(layout: Rc<dyn Layout>) -> InstanceRef {
        Rc::new(Self {
            layout,
            slots: RefCell::new(Attributes::new()),
        })
    }

    /// Name of the class this is an instance of.
    pub fn class_name(&self) -> &str {
        self.layout.class_name()
    }

    /// The layout shared by all instances of this class.
    pub fn layout(&self) -> &Rc<dyn Layout> {
        &self.layout
    }

    /// Read a field through the class layout.
    pub fn get(&self, field: &str) -> ContractResult<Value> {
        self.layout.read(self, field)
    }

    /// Assign a field through the class layout (validated).
    pub fn set(&self, field: &str, value: impl Into<Value>) -> ContractResult<()> {
        self.layout.assign(self, field, value.into())
    }

    /// Raw slot read. Returns None if the field was never stored.
    pub fn slot(&self, field: &str) -> Option<Value> {
        self.slots.borrow().get(field).cloned()
    }

    /// Returns true if the field has a stored value.
    pub fn has_slot(&self, field: &str) -> bool {
        self.slots.borrow().contains_key(field)
    }

    /// Raw, unchecked slot write. Layouts call this once a value has passed
    /// the field's predicates.
    pub fn store_slot(&self, field: impl Into<String>, value: Value) {
        self.slots.borrow_mut().insert(field.into(), value);
    }

    /// Render as `ClassName(value1,value2,...)` in declared field order.
    /// Fails with `AttributeMissing` if any field was never assigned.
    pub fn render(&self) -> ContractResult<String> {
        let mut parts = Vec::new();
        for field in self.layout.field_names() {
            parts.push(self.get(field)?.render()?);
        }
        Ok(format!("{}({})", self.class_name(), parts.join(",")))
    }

    /// Names of the declared fields that have no stored value yet.
    pub fn missing_fields(&self) -> Vec<String> {
        self.layout
            .field_names()
            .into_iter()
            .filter(|field| !self.has_slot(field))
            .map(|field| field.to_string())
            .collect()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class_name())
            .field("slots", &self.slots.borrow())
            .finish()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class_name() == other.class_name() && *self.slots.borrow() == *other.slots.borrow()
    }
}

/// Lenient rendering: unassigned fields show as `<unset>`.
/// Use `Instance::render` where a missing field must be an error.
impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class_name())?;
        for (i, field) in self.layout.field_names().into_iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match self.slot(field) {
                Some(value) => write!(f, "{}", value)?,
                None => write!(f, "<unset>")?,
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContractError;
    use pretty_assertions::assert_eq;

    /// Accepts any value for its declared fields.
    #[derive(Debug)]
    struct OpenLayout {
        fields: Vec<String>,
    }

    impl Layout for OpenLayout {
        fn class_name(&self) -> &str {
            "Pair"
        }

        fn field_names(&self) -> Vec<&str> {
            self.fields.iter().map(|s| s.as_str()).collect()
        }

        fn assign(&self, instance: &Instance, field: &str, value: Value) -> ContractResult<()> {
            if !self.fields.iter().any(|f| f == field) {
                return Err(ContractError::unknown_field("Pair", field));
            }
            instance.store_slot(field, value);
            Ok(())
        }

        fn read(&self, instance: &Instance, field: &str) -> ContractResult<Value> {
            instance
                .slot(field)
                .ok_or_else(|| ContractError::attribute_missing("Pair", field))
        }
    }

    fn pair() -> InstanceRef {
        Instance::new(Rc::new(OpenLayout {
            fields: vec!["a".into(), "b".into()],
        }))
    }

    #[test]
    fn test_render_in_field_order() {
        // GIVEN
        let instance = pair();
        instance.set("b", "two").unwrap();
        instance.set("a", 1).unwrap();

        // WHEN
        let rendered = instance.render().unwrap();

        // THEN
        assert_eq!(rendered, "Pair(1,\"two\")");
    }

    #[test]
    fn test_render_fails_on_missing_field() {
        // GIVEN
        let instance = pair();
        instance.set("a", 1).unwrap();

        // WHEN
        let err = instance.render().unwrap_err();

        // THEN
        assert_eq!(err, ContractError::attribute_missing("Pair", "b"));
        assert_eq!(instance.to_string(), "Pair(1,<unset>)");
        assert_eq!(instance.missing_fields(), vec!["b".to_string()]);
    }

    #[test]
    fn test_render_fails_on_missing_nested_field() {
        // GIVEN
        let inner = pair();
        inner.set("a", 1).unwrap();
        let outer = pair();
        outer.set("a", Value::Instance(inner)).unwrap();
        outer.set("b", vec![Value::Int(2)]).unwrap();

        // WHEN
        let err = outer.render().unwrap_err();

        // THEN
        assert_eq!(err, ContractError::attribute_missing("Pair", "b"));
        assert_eq!(outer.to_string(), "Pair(Pair(1,<unset>),[2])");
    }

    #[test]
    fn test_render_recurses_into_lists() {
        let inner = pair();
        inner.set("a", 1).unwrap();
        let outer = pair();
        outer.set("a", 0).unwrap();
        outer.set("b", vec![Value::Instance(inner.clone())]).unwrap();
        assert!(outer.render().is_err());

        inner.set("b", true).unwrap();
        assert_eq!(outer.render().unwrap(), "Pair(0,[Pair(1,true)])");
    }

    #[test]
    fn test_instances_compare_by_slots() {
        let left = pair();
        let right = pair();
        left.set("a", 1).unwrap();
        right.set("a", 1).unwrap();
        assert_eq!(Value::Instance(left.clone()), Value::Instance(right.clone()));

        right.set("b", 2).unwrap();
        assert_ne!(Value::Instance(left), Value::Instance(right));
    }

    #[test]
    fn test_instance_type_tag_is_class_name() {
        let value = Value::Instance(pair());
        assert_eq!(value.type_name(), "Pair");
        assert!(crate::TypeTag::instance("Pair").matches(&value));
    }
}
