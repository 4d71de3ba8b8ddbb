//! The bundled predicate catalog.
//!
//! | Name              | Kind      | Shape                                 |
//! |-------------------|-----------|---------------------------------------|
//! | `PositiveInteger` | predicate | Positive + Integer                    |
//! | `NonemptyString`  | predicate | Nonempty + String                     |
//! | `Point`           | class     | `x: Integer`, `y: Integer`            |
//! | `Point.shift`     | method    | `(dx: Integer = 0, dy: Integer = 0)`  |
//! | `move`            | function  | `(p: Point, dx: Integer) -> Point`    |

use crate::{from_json, DemoResult, Settings};
use covenant_class::{
    args, Args, BoundArgs, CallGuard, ClassBuilder, DeclaredClass, GuardedFunction, Object,
    Param, PredicateScope, Signature,
};
use covenant_constraint::{CheckReport, CompositePredicate};
use covenant_core::{ContractError, ContractResult, Value};
use covenant_registry::{Registry, INTEGER, NONEMPTY, POSITIVE, STRING};
use std::rc::Rc;

pub const POSITIVE_INTEGER: &str = "PositiveInteger";
pub const NONEMPTY_STRING: &str = "NonemptyString";
pub const POINT: &str = "Point";
pub const MOVE: &str = "move";

/// A registry populated with the bundled predicates, the `Point` class and
/// the guarded `move` function.
pub struct Catalog {
    registry: Registry,
    point: Rc<DeclaredClass>,
    mv: GuardedFunction,
}

impl Catalog {
    pub fn new(settings: &Settings) -> DemoResult<Self> {
        let registry = Registry::with_config(settings.registry.clone()).with_builtin_predicates();
        registry.compose(POSITIVE_INTEGER, &[POSITIVE, INTEGER])?;
        registry.compose(NONEMPTY_STRING, &[NONEMPTY, STRING])?;

        let point = ClassBuilder::new(&registry, POINT)
            .config(settings.guard.clone())
            .field("x", INTEGER)
            .field("y", INTEGER)
            .method(
                Signature::new("shift")
                    .push(Param::annotated("dx", INTEGER).with_default(0))
                    .push(Param::annotated("dy", INTEGER).with_default(0)),
                shift,
            )
            .build()?;
        point.instance_predicate(&registry)?;

        let signature = Signature::new(MOVE)
            .annotated("p", POINT)
            .annotated("dx", INTEGER)
            .returns(POINT);
        let scope = PredicateScope::new(&registry);
        let guard = CallGuard::new(scope, signature, settings.guard.clone())?;
        let class = Rc::clone(&point);
        let mv = GuardedFunction::with_guard(guard, move |args| {
            let p = as_point(&class, args.require("p")?)?;
            p.call("shift", Args::new().arg(args.require("dx")?.clone()))?;
            Ok(p.into())
        });

        Ok(Self { registry, point, mv })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn point(&self) -> &Rc<DeclaredClass> {
        &self.point
    }

    pub fn move_fn(&self) -> &GuardedFunction {
        &self.mv
    }

    /// One line per registered predicate: its name and check chain.
    pub fn listing(&self) -> DemoResult<Vec<String>> {
        let mut lines = Vec::new();
        for name in self.registry.names() {
            let def = self.registry.get(&name)?;
            lines.push(format!("{}: {}", name, def.linearization_names().join(" -> ")));
        }
        Ok(lines)
    }

    /// Evaluate every link of `predicate` against a JSON literal.
    pub fn check(&self, predicate: &str, json: &str) -> DemoResult<CheckReport> {
        let value = from_json(&serde_json::from_str(json)?)?;
        let composite = CompositePredicate::resolve(&self.registry, predicate)?;
        Ok(composite.evaluate(&value))
    }

    /// Run the bundled scenario, returning the transcript.
    pub fn demo(&self) -> DemoResult<Vec<String>> {
        let mut transcript = Vec::new();
        let p = self.point.instantiate(vec![1.into(), 2.into()])?;
        transcript.push(format!("p = {}", p.render()?));

        let rejected = [
            (POINT.to_string() + "(1)", self.point.instantiate(vec![1.into()]).map(|_| ())),
            (
                POINT.to_string() + "(1, \"a\")",
                self.point.instantiate(vec![1.into(), "a".into()]).map(|_| ()),
            ),
            (
                "move(p, dx=\"x\")".to_string(),
                self.mv.call(args![&p; dx = "x"]).map(|_| ()),
            ),
            ("p.x = -1.5".to_string(), p.set("x", -1.5)),
        ];
        for (label, result) in rejected {
            match result {
                Ok(()) => transcript.push(format!("{label}: accepted")),
                Err(err) => transcript.push(format!("{label}: {err}")),
            }
        }

        let moved = self.mv.call(args![&p, 3])?;
        transcript.push(format!("move(p, 3) = {moved}"));
        p.call("shift", args![; dy = 5])?;
        transcript.push(format!("p.shift(dy=5) -> {}", p.render()?));
        Ok(transcript)
    }
}

fn shift(this: &Object, args: &BoundArgs) -> ContractResult<Value> {
    let mut moved = Vec::with_capacity(2);
    for (field, param) in [("x", "dx"), ("y", "dy")] {
        let current = this.get(field)?.to_i64().unwrap_or(0);
        let delta = args.require(param)?.to_i64().unwrap_or(0);
        let sum = current.checked_add(delta).ok_or_else(|| {
            ContractError::violation(INTEGER, format!("{current} + {delta} overflows"))
                .with_target(field)
        })?;
        moved.push((field, sum));
    }
    // Both sums are computed before either field changes.
    for (field, value) in moved {
        this.set(field, value)?;
    }
    Ok(Value::Null)
}

fn as_point(class: &Rc<DeclaredClass>, value: &Value) -> ContractResult<Object> {
    value
        .as_instance()
        .and_then(|instance| class.object(Rc::clone(instance)))
        .ok_or_else(|| {
            let reason = format!("Expected Point, got {}", value.type_name());
            ContractError::violation(POINT, reason)
        })
}
