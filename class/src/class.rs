//! Declared classes.
//!
//! `ClassBuilder` collects a class declaration: class-local predicates,
//! fields paired with predicate names, and methods with their signatures.
//! `build()` turns it into a `DeclaredClass` in two passes. The method pass
//! wraps every method in a `CallGuard`, then the field pass gives every field
//! a `ManagedAttribute`. Both resolve predicate names through the class's
//! `PredicateScope`.

use crate::attribute::ManagedAttribute;
use crate::config::GuardConfig;
use crate::guard::{Annotations, CallGuard};
use crate::scope::PredicateScope;
use crate::signature::{Args, BoundArgs, Signature};
use covenant_core::{
    ContractError, ContractResult, Instance, InstanceRef, Layout, TypeTag, Value,
};
use covenant_registry::{PredicateDef, Registry, Rule};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Body of a guarded method. The receiver is passed separately from the
/// checked arguments.
pub type MethodBody = dyn Fn(&Object, &BoundArgs) -> ContractResult<Value>;

/// A method whose annotated arguments are checked before its body runs.
#[derive(Clone)]
pub struct GuardedMethod {
    guard: CallGuard,
    body: Rc<MethodBody>,
}

impl GuardedMethod {
    pub fn new(guard: CallGuard, body: Rc<MethodBody>) -> Self {
        Self { guard, body }
    }

    pub fn name(&self) -> &str {
        self.guard.signature().name()
    }

    pub fn guard(&self) -> &CallGuard {
        &self.guard
    }

    /// Check the arguments, then run the body on `receiver`.
    pub fn call(&self, receiver: &Object, args: Args) -> ContractResult<Value> {
        let bound = self.guard.admit(args)?;
        (self.body)(receiver, &bound)
    }
}

impl fmt::Debug for GuardedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedMethod")
            .field("signature", &self.guard.signature().to_string())
            .finish()
    }
}

struct LocalDecl {
    name: String,
    parents: Vec<String>,
    rule: Rule,
}

/// Builder for a declared class.
///
/// ```ignore
/// let point = ClassBuilder::new(&registry, "Point")
///     .field("x", "Integer")
///     .field("y", "Integer")
///     .build()?;
/// ```
pub struct ClassBuilder {
    registry: Registry,
    name: String,
    locals: Vec<LocalDecl>,
    /// `(field, predicate)` in declaration order.
    fields: Vec<(String, String)>,
    methods: Vec<(Signature, Rc<MethodBody>)>,
    globals: Annotations,
    config: GuardConfig,
}

impl ClassBuilder {
    pub fn new(registry: &Registry, name: impl Into<String>) -> Self {
        Self {
            registry: registry.clone(),
            name: name.into(),
            locals: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            globals: Annotations::new(),
            config: GuardConfig::default(),
        }
    }

    /// Define a predicate visible only inside this class.
    pub fn local_predicate(
        mut self,
        name: impl Into<String>,
        parents: &[&str],
        rule: Rule,
    ) -> Self {
        self.locals.push(LocalDecl {
            name: name.into(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            rule,
        });
        self
    }

    /// Declare a field checked against `predicate`. Redeclaring a field
    /// replaces its predicate and keeps its position.
    pub fn field(mut self, name: impl Into<String>, predicate: impl Into<String>) -> Self {
        let name = name.into();
        let predicate = predicate.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(entry) => entry.1 = predicate,
            None => self.fields.push((name, predicate)),
        }
        self
    }

    /// Declare a method. A later method with the same name replaces it.
    pub fn method(
        mut self,
        signature: Signature,
        body: impl Fn(&Object, &BoundArgs) -> ContractResult<Value> + 'static,
    ) -> Self {
        self.methods
            .retain(|(existing, _)| existing.name() != signature.name());
        self.methods.push((signature, Rc::new(body)));
        self
    }

    /// Annotations applied to method parameters that declare none.
    pub fn globals(mut self, globals: Annotations) -> Self {
        self.globals = globals;
        self
    }

    /// Guard configuration for every method.
    pub fn config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the class.
    pub fn build(self) -> ContractResult<Rc<DeclaredClass>> {
        let mut scope = PredicateScope::new(&self.registry);
        for local in self.locals {
            let parents: Vec<&str> = local.parents.iter().map(String::as_str).collect();
            scope.define_local(local.name, &parents, local.rule)?;
        }

        let mut methods = HashMap::with_capacity(self.methods.len());
        for (signature, body) in self.methods {
            let name = signature.name().to_string();
            let guard = CallGuard::with_globals(
                scope.clone(),
                signature,
                &self.globals,
                self.config.clone(),
            )?;
            methods.insert(name, GuardedMethod::new(guard, body));
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for (field, predicate) in self.fields {
            let chain = scope.composite(&predicate)?;
            // A field declared under a method's name shadows the method.
            if methods.remove(&field).is_some() {
                tracing::debug!(class = %self.name, %field, "field replaces method");
            }
            fields.push(ManagedAttribute::new(field, chain));
        }

        tracing::debug!(
            class = %self.name,
            fields = ?fields.iter().map(ManagedAttribute::field).collect::<Vec<_>>(),
            methods = methods.len(),
            "declared class"
        );

        Ok(Rc::new(DeclaredClass {
            name: self.name,
            fields,
            methods,
            scope,
        }))
    }
}

/// A class built by `ClassBuilder`.
#[derive(Debug)]
pub struct DeclaredClass {
    name: String,
    fields: Vec<ManagedAttribute>,
    methods: HashMap<String, GuardedMethod>,
    scope: PredicateScope,
}

impl DeclaredClass {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Managed attributes in declaration order.
    pub fn fields(&self) -> &[ManagedAttribute] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ManagedAttribute> {
        self.fields.iter().find(|attribute| attribute.field() == name)
    }

    pub fn method(&self, name: &str) -> Option<&GuardedMethod> {
        self.methods.get(name)
    }

    /// Get method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The predicate names visible to this class.
    pub fn scope(&self) -> &PredicateScope {
        &self.scope
    }

    /// Create an instance from one value per field, in declaration order.
    /// Each value is checked by its field as it is assigned.
    pub fn instantiate(self: &Rc<Self>, values: Vec<Value>) -> ContractResult<Object> {
        if values.len() != self.fields.len() {
            return Err(ContractError::arity(&self.name, self.fields.len(), values.len()));
        }

        let layout: Rc<dyn Layout> = Rc::clone(self) as Rc<dyn Layout>;
        let instance = Instance::new(layout);
        for (attribute, value) in self.fields.iter().zip(values) {
            attribute.assign(&instance, value)?;
        }
        Ok(Object {
            class: Rc::clone(self),
            instance,
        })
    }

    /// Wrap an existing instance of this class.
    pub fn object(self: &Rc<Self>, instance: InstanceRef) -> Option<Object> {
        (instance.class_name() == self.name).then(|| Object {
            class: Rc::clone(self),
            instance,
        })
    }

    /// Define a predicate named after this class that accepts its instances,
    /// so signatures elsewhere can annotate parameters with the class name.
    pub fn instance_predicate(&self, registry: &Registry) -> ContractResult<Rc<PredicateDef>> {
        registry
            .define(&self.name)
            .typed(TypeTag::instance(&self.name))
            .done()
    }

    fn attribute(&self, field: &str) -> ContractResult<&ManagedAttribute> {
        self.field(field)
            .ok_or_else(|| ContractError::unknown_field(&self.name, field))
    }
}

impl Layout for DeclaredClass {
    fn class_name(&self) -> &str {
        &self.name
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(ManagedAttribute::field).collect()
    }

    fn assign(&self, instance: &Instance, field: &str, value: Value) -> ContractResult<()> {
        self.attribute(field)?.assign(instance, value)
    }

    fn read(&self, instance: &Instance, field: &str) -> ContractResult<Value> {
        self.attribute(field)?.read(instance)
    }
}

/// Handle to an instance of a declared class.
#[derive(Debug, Clone)]
pub struct Object {
    class: Rc<DeclaredClass>,
    instance: InstanceRef,
}

impl Object {
    pub fn class(&self) -> &Rc<DeclaredClass> {
        &self.class
    }

    pub fn instance(&self) -> &InstanceRef {
        &self.instance
    }

    /// Read a field.
    pub fn get(&self, field: &str) -> ContractResult<Value> {
        self.instance.get(field)
    }

    /// Assign a field. A rejected value leaves the field unchanged.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> ContractResult<()> {
        self.instance.set(field, value)
    }

    /// Call a guarded method.
    pub fn call(&self, method: &str, args: Args) -> ContractResult<Value> {
        let guarded = self
            .class
            .method(method)
            .ok_or_else(|| ContractError::unknown_method(self.class.name(), method))?;
        guarded.call(self, args)
    }

    /// `ClassName(v1,v2,...)`, failing if a field was never assigned.
    pub fn render(&self) -> ContractResult<String> {
        self.instance.render()
    }

    pub fn to_value(&self) -> Value {
        Value::Instance(Rc::clone(&self.instance))
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instance)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Instance(object.instance)
    }
}

impl From<&Object> for Value {
    fn from(object: &Object) -> Self {
        object.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use covenant_registry::{INTEGER, POSITIVE};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn point(registry: &Registry) -> Rc<DeclaredClass> {
        ClassBuilder::new(registry, "Point")
            .field("x", INTEGER)
            .field("y", INTEGER)
            .method(Signature::new("shift").annotated("dx", INTEGER), |this, args| {
                let x = this.get("x")?.to_i64().unwrap_or(0);
                let dx = args.require("dx")?.to_i64().unwrap_or(0);
                let sum = x
                    .checked_add(dx)
                    .ok_or_else(|| ContractError::violation(INTEGER, "Sum overflows"))?;
                this.set("x", sum)?;
                Ok(Value::Null)
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_instantiate_and_render() {
        // GIVEN
        let point = point(&Registry::with_builtins());

        // WHEN
        let p = point.instantiate(vec![1.into(), 2.into()]).unwrap();

        // THEN
        assert_eq!(p.render().unwrap(), "Point(1,2)");
        assert_eq!(p.to_string(), "Point(1,2)");
        assert_eq!(p.get("y").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_instantiate_wrong_arity() {
        let point = point(&Registry::with_builtins());
        assert_eq!(
            point.instantiate(vec![1.into()]).unwrap_err(),
            ContractError::arity("Point", 2, 1)
        );
    }

    #[test]
    fn test_instantiate_rejects_bad_field() {
        let point = point(&Registry::with_builtins());
        let err = point.instantiate(vec![1.into(), "a".into()]).unwrap_err();
        assert!(err.is_violation());
        assert_eq!(err.predicate(), Some("Integer"));
        assert_eq!(err.target(), Some("y"));
    }

    #[test]
    fn test_set_is_atomic() {
        // GIVEN
        let point = point(&Registry::with_builtins());
        let p = point.instantiate(vec![1.into(), 2.into()]).unwrap();

        // WHEN
        let result = p.set("x", 1.5);

        // THEN
        assert!(result.is_err());
        assert_eq!(p.get("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_unknown_field_and_method() {
        let point = point(&Registry::with_builtins());
        let p = point.instantiate(vec![1.into(), 2.into()]).unwrap();
        assert_eq!(
            p.set("z", 0).unwrap_err(),
            ContractError::unknown_field("Point", "z")
        );
        assert_eq!(
            p.call("scale", args![2]).unwrap_err(),
            ContractError::unknown_method("Point", "scale")
        );
    }

    #[test]
    fn test_method_call_is_guarded() {
        // GIVEN
        let point = point(&Registry::with_builtins());
        let p = point.instantiate(vec![1.into(), 2.into()]).unwrap();

        // WHEN
        p.call("shift", args![3]).unwrap();
        let rejected = p.call("shift", args!["x"]);

        // THEN
        assert!(rejected.unwrap_err().is_violation());
        assert_eq!(p.render().unwrap(), "Point(4,2)");
    }

    #[test]
    fn test_method_overflow_leaves_field_unchanged() {
        // GIVEN
        let point = point(&Registry::with_builtins());
        let p = point.instantiate(vec![1.into(), 2.into()]).unwrap();

        // WHEN
        let err = p.call("shift", args![i64::MAX]).unwrap_err();

        // THEN
        assert_eq!(err, ContractError::violation(INTEGER, "Sum overflows"));
        assert_eq!(p.render().unwrap(), "Point(1,2)");
    }

    #[test]
    fn test_unknown_field_predicate() {
        let result = ClassBuilder::new(&Registry::with_builtins(), "Broken")
            .field("x", "Missing")
            .build();
        assert_eq!(result.unwrap_err(), ContractError::unknown_predicate("Missing"));
    }

    #[test]
    fn test_method_pass_runs_before_field_pass() {
        let result = ClassBuilder::new(&Registry::with_builtins(), "Broken")
            .config(GuardConfig::eager())
            .field("x", "MissingField")
            .method(Signature::new("m").annotated("a", "MissingParam"), |_, _| Ok(Value::Null))
            .build();
        assert_eq!(
            result.unwrap_err(),
            ContractError::unknown_predicate("MissingParam")
        );
    }

    #[test]
    fn test_redeclared_field_keeps_position() {
        let class = ClassBuilder::new(&Registry::with_builtins(), "Pair")
            .field("a", INTEGER)
            .field("b", INTEGER)
            .field("a", POSITIVE)
            .build()
            .unwrap();
        assert_eq!(class.field_names(), vec!["a", "b"]);
        assert_eq!(class.field("a").unwrap().predicate().name(), POSITIVE);
    }

    #[test]
    fn test_local_predicates_stay_in_class() {
        // GIVEN
        let registry = Registry::with_builtins();

        let single_digit = Rule::Range {
            min: Some(Value::Int(0)),
            max: Some(Value::Int(9)),
        };

        // WHEN
        let class = ClassBuilder::new(&registry, "Digit")
            .local_predicate("SingleDigit", &[INTEGER], single_digit)
            .field("value", "SingleDigit")
            .build()
            .unwrap();

        // THEN
        assert!(class.instantiate(vec![7.into()]).is_ok());
        assert!(class.instantiate(vec![12.into()]).is_err());
        assert!(!registry.contains("SingleDigit"));
        assert_eq!(class.scope().local_names(), vec!["SingleDigit"]);
    }

    #[test]
    fn test_field_shadows_method() {
        let class = ClassBuilder::new(&Registry::with_builtins(), "Shadow")
            .method(Signature::new("x"), |_, _| Ok(Value::Null))
            .field("x", INTEGER)
            .build()
            .unwrap();
        assert!(class.method("x").is_none());
        assert!(class.method_names().is_empty());
    }

    #[test]
    fn test_instance_predicate() {
        // GIVEN
        let registry = Registry::with_builtins();
        let point = point(&registry);
        let p = point.instantiate(vec![1.into(), 2.into()]).unwrap();

        // WHEN
        let def = point.instance_predicate(&registry).unwrap();

        // THEN
        assert!(def.own_check(&p.to_value()).is_ok());
        assert_eq!(
            def.own_check(&Value::Int(1)).unwrap_err(),
            ContractError::violation("Point", "Expected Point, got int")
        );
    }

    #[test]
    fn test_render_missing_field() {
        // GIVEN
        let point = point(&Registry::with_builtins());
        let layout: Rc<dyn Layout> = Rc::clone(&point) as Rc<dyn Layout>;
        let instance = Instance::new(layout);
        instance.set("x", 1).unwrap();

        // WHEN
        let object = point.object(instance).unwrap();

        // THEN
        assert_eq!(
            object.render().unwrap_err(),
            ContractError::attribute_missing("Point", "y")
        );
        assert_eq!(object.to_string(), "Point(1,<unset>)");
    }

    #[test]
    fn test_render_missing_field_of_nested_instance() {
        // GIVEN
        let registry = Registry::with_builtins();
        let point = point(&registry);
        point.instance_predicate(&registry).unwrap();
        let segment = ClassBuilder::new(&registry, "Segment")
            .field("start", "Point")
            .field("end", "Point")
            .build()
            .unwrap();
        let start = point.instantiate(vec![0.into(), 0.into()]).unwrap();
        let end = Instance::new(Rc::clone(&point) as Rc<dyn Layout>);
        end.set("x", 3).unwrap();

        // WHEN
        let s = segment
            .instantiate(vec![start.into(), Value::Instance(end)])
            .unwrap();

        // THEN
        assert_eq!(
            s.render().unwrap_err(),
            ContractError::attribute_missing("Point", "y")
        );
        assert_eq!(s.to_string(), "Segment(Point(0,0),Point(3,<unset>))");
    }

    #[test]
    fn test_method_body_skipped_on_rejection() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let class = ClassBuilder::new(&Registry::with_builtins(), "Counter")
            .method(Signature::new("bump").annotated("by", POSITIVE), move |_, _| {
                counter.set(counter.get() + 1);
                Ok(Value::Null)
            })
            .build()
            .unwrap();
        let counter = class.instantiate(vec![]).unwrap();

        assert!(counter.call("bump", args![-1]).is_err());
        assert!(counter.call("bump", args![1]).is_ok());
        assert_eq!(runs.get(), 1);
    }
}
