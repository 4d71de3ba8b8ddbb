//! Value types for Covenant predicates.
//!
//! Values are the dynamic data that predicates check: attribute assignments,
//! constructor arguments and call arguments all arrive as a `Value`.
//! Covenant supports scalar types (Null, Bool, Int, Float, String), lists,
//! and references to instances of declared classes.

use crate::{ContractResult, InstanceRef};
use std::cmp::Ordering;
use std::fmt;

/// A value that can be checked by a predicate or stored in a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// List of values.
    List(Vec<Value>),
    /// Reference to an instance of a declared class.
    Instance(InstanceRef),
}

/// The runtime type a `Typed` predicate accepts.
///
/// A `Bool` counts as an `int` (true is 1, false is 0). Nothing else
/// widens: an `Int` is not a `float`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    /// Instances of the declared class with this name.
    Instance(String),
}

impl TypeTag {
    /// Tag for instances of the named class.
    pub fn instance(class_name: impl Into<String>) -> Self {
        TypeTag::Instance(class_name.into())
    }

    /// Returns true if `value` is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeTag::Null, Value::Null) => true,
            (TypeTag::Bool, Value::Bool(_)) => true,
            (TypeTag::Int, Value::Int(_) | Value::Bool(_)) => true,
            (TypeTag::Float, Value::Float(_)) => true,
            (TypeTag::Str, Value::String(_)) => true,
            (TypeTag::List, Value::List(_)) => true,
            (TypeTag::Instance(name), Value::Instance(instance)) => instance.class_name() == name,
            _ => false,
        }
    }

    /// The display name used in violation messages.
    pub fn name(&self) -> &str {
        match self {
            TypeTag::Null => "null",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::List => "list",
            TypeTag::Instance(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is an integer or float value.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns true if this is an instance reference.
    pub fn is_instance(&self) -> bool {
        matches!(self, Value::Instance(_))
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer view: Int values, and Bool as 0 or 1.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Get as float if this is a Float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list slice if this is a List value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the instance reference if this is an Instance value.
    pub fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// The exact type of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::Str,
            Value::List(_) => TypeTag::List,
            Value::Instance(instance) => TypeTag::instance(instance.class_name()),
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> String {
        self.type_tag().to_string()
    }

    /// Number of elements for sized values (characters of a string, items of a list).
    /// Returns None for values without a length.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Compare two values. Numbers compare across Int/Float (a Bool compares
    /// as 0 or 1), strings compare lexicographically. Returns None when the
    /// pair is not comparable at all, and `Some(None)` when it is comparable
    /// but unordered (NaN).
    pub fn compare(&self, other: &Value) -> Option<Option<Ordering>> {
        match (self, other) {
            (Value::Bool(_), _) | (_, Value::Bool(_)) => {
                let lhs = self.to_i64().map(Value::Int).unwrap_or_else(|| self.clone());
                let rhs = other.to_i64().map(Value::Int).unwrap_or_else(|| other.clone());
                lhs.compare(&rhs)
            }
            (Value::Int(a), Value::Int(b)) => Some(Some(a.cmp(b))),
            (Value::Float(a), Value::Float(b)) => Some(a.partial_cmp(b)),
            (Value::Int(a), Value::Float(b)) => Some((*a as f64).partial_cmp(b)),
            (Value::Float(a), Value::Int(b)) => Some(a.partial_cmp(&(*b as f64))),
            (Value::String(a), Value::String(b)) => Some(Some(a.cmp(b))),
            _ => None,
        }
    }

    /// `self > other`, or None if the values are not comparable.
    pub fn gt(&self, other: &Value) -> Option<bool> {
        self.compare(other)
            .map(|ord| matches!(ord, Some(Ordering::Greater)))
    }

    /// `self < other`, or None if the values are not comparable.
    pub fn lt(&self, other: &Value) -> Option<bool> {
        self.compare(other).map(|ord| matches!(ord, Some(Ordering::Less)))
    }

    /// `self >= other`, or None if the values are not comparable.
    pub fn gte(&self, other: &Value) -> Option<bool> {
        self.compare(other)
            .map(|ord| matches!(ord, Some(Ordering::Greater | Ordering::Equal)))
    }

    /// `self <= other`, or None if the values are not comparable.
    pub fn lte(&self, other: &Value) -> Option<bool> {
        self.compare(other)
            .map(|ord| matches!(ord, Some(Ordering::Less | Ordering::Equal)))
    }

    /// Strict rendering. Like `Display`, except an instance anywhere inside
    /// the value fails with `AttributeMissing` if a field was never assigned.
    pub fn render(&self) -> ContractResult<String> {
        match self {
            Value::Instance(instance) => instance.render(),
            Value::List(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    parts.push(item.render()?);
                }
                Ok(format!("[{}]", parts.join(", ")))
            }
            _ => Ok(self.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part: 5.0 renders as "5.0", not "5".
            Value::Float(fl) => write!(f, "{:?}", fl),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Instance(instance) => write!(f, "{}", instance),
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<InstanceRef> for Value {
    fn from(instance: InstanceRef) -> Self {
        Value::Instance(instance)
    }
}
