//! Call guards.
//!
//! A `CallGuard` binds a call's arguments to a `Signature` and checks every
//! annotated argument before anything else happens. `GuardedFunction` pairs
//! a guard with a body that only runs once the guard admits the call.

use crate::config::{GuardConfig, Resolution};
use crate::scope::PredicateScope;
use crate::signature::{Args, BoundArgs, Signature};
use covenant_constraint::CompositePredicate;
use covenant_core::{ContractResult, Value};
use covenant_registry::Registry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Parameter name to predicate name.
pub type Annotations = HashMap<String, String>;

/// Argument checks for one callable.
#[derive(Debug, Clone)]
pub struct CallGuard {
    signature: Signature,
    /// Effective annotation of each annotated parameter.
    annotations: Annotations,
    scope: PredicateScope,
    config: GuardConfig,
    /// Check chains resolved at wrap time, for `Resolution::OnWrap`.
    resolved: Option<HashMap<String, CompositePredicate>>,
}

impl CallGuard {
    /// Guard `signature` using only its own annotations.
    pub fn new(
        scope: PredicateScope,
        signature: Signature,
        config: GuardConfig,
    ) -> ContractResult<Self> {
        Self::with_globals(scope, signature, &Annotations::new(), config)
    }

    /// Guard `signature`, falling back to `globals` for parameters that carry
    /// no annotation of their own.
    pub fn with_globals(
        scope: PredicateScope,
        signature: Signature,
        globals: &Annotations,
        config: GuardConfig,
    ) -> ContractResult<Self> {
        let mut annotations = Annotations::new();
        for param in signature.params() {
            let annotation = param.annotation.as_ref().or_else(|| globals.get(&param.name));
            if let Some(predicate) = annotation {
                annotations.insert(param.name.clone(), predicate.clone());
            }
        }

        let resolved = match config.resolution {
            Resolution::OnCall => None,
            Resolution::OnWrap => {
                let mut chains = HashMap::new();
                for param in signature.params() {
                    if let Some(predicate) = annotations.get(&param.name) {
                        chains.insert(param.name.clone(), scope.composite(predicate)?);
                    }
                }
                Some(chains)
            }
        };

        Ok(Self {
            signature,
            annotations,
            scope,
            config,
            resolved,
        })
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The predicate a parameter is checked against, if any.
    pub fn annotation(&self, param: &str) -> Option<&str> {
        self.annotations.get(param).map(String::as_str)
    }

    /// Bind and check a call's arguments.
    ///
    /// Explicitly passed arguments are checked in parameter order and the
    /// first failure is returned. Defaults of omitted parameters are added
    /// afterwards, unchecked.
    pub fn admit(&self, args: Args) -> ContractResult<BoundArgs> {
        let mut bound = self.signature.bind(args)?;
        for (name, value) in bound.iter() {
            if let Err(err) = self.check_param(name, value) {
                tracing::debug!(
                    function = self.signature.name(),
                    param = name,
                    %value,
                    error = %err,
                    "call rejected"
                );
                return Err(err.with_target(name));
            }
        }
        self.signature.fill_defaults(&mut bound);
        Ok(bound)
    }

    fn check_param(&self, name: &str, value: &Value) -> ContractResult<()> {
        let Some(predicate) = self.annotations.get(name) else {
            return Ok(());
        };
        match self.resolved.as_ref().and_then(|chains| chains.get(name)) {
            Some(chain) => chain.check(value),
            None => self.scope.composite(predicate)?.check(value),
        }
    }
}

/// Body of a guarded standalone function.
pub type FnBody = dyn Fn(&BoundArgs) -> ContractResult<Value>;

/// A standalone function whose annotated arguments are checked before its
/// body runs.
#[derive(Clone)]
pub struct GuardedFunction {
    guard: CallGuard,
    body: Rc<FnBody>,
}

impl GuardedFunction {
    /// Guard `body` with the annotations of `signature`, resolved through
    /// `registry` at each call.
    pub fn new(
        registry: &Registry,
        signature: Signature,
        body: impl Fn(&BoundArgs) -> ContractResult<Value> + 'static,
    ) -> ContractResult<Self> {
        let guard = CallGuard::new(
            PredicateScope::new(registry),
            signature,
            GuardConfig::default(),
        )?;
        Ok(Self::with_guard(guard, body))
    }

    pub fn with_guard(
        guard: CallGuard,
        body: impl Fn(&BoundArgs) -> ContractResult<Value> + 'static,
    ) -> Self {
        Self {
            guard,
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        self.guard.signature().name()
    }

    pub fn guard(&self) -> &CallGuard {
        &self.guard
    }

    /// Check the arguments, then run the body. A rejected call never
    /// reaches the body.
    pub fn call(&self, args: Args) -> ContractResult<Value> {
        let bound = self.guard.admit(args)?;
        (self.body)(&bound)
    }
}

impl fmt::Debug for GuardedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedFunction")
            .field("signature", &self.guard.signature().to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::signature::Param;
    use covenant_core::ContractError;
    use covenant_registry::{Rule, INTEGER, POSITIVE};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn registry() -> Registry {
        let registry = Registry::with_builtins();
        registry
            .compose("PositiveInteger", &[POSITIVE, INTEGER])
            .unwrap();
        registry
    }

    /// `repeat(times: PositiveInteger, text)`, counting body runs.
    fn repeat(registry: &Registry, config: GuardConfig) -> (GuardedFunction, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let signature = Signature::new("repeat")
            .annotated("times", "PositiveInteger")
            .param("text");
        let guard = CallGuard::new(PredicateScope::new(registry), signature, config).unwrap();
        let function = GuardedFunction::with_guard(guard, move |args| {
            counter.set(counter.get() + 1);
            let times = args.require("times")?.as_int().unwrap_or(0);
            let text = args.require("text")?.as_str().unwrap_or_default().to_string();
            Ok(Value::from(text.repeat(times as usize)))
        });
        (function, runs)
    }

    #[test]
    fn test_admitted_call_runs_body() {
        // GIVEN
        let (repeat, runs) = repeat(&registry(), GuardConfig::default());

        // WHEN
        let result = repeat.call(args![2, "ab"]).unwrap();

        // THEN
        assert_eq!(result, Value::from("abab"));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_rejected_call_never_runs_body() {
        // GIVEN
        let (repeat, runs) = repeat(&registry(), GuardConfig::default());

        // WHEN
        let err = repeat.call(args![0, "ab"]).unwrap_err();

        // THEN
        assert_eq!(
            err,
            ContractError::violation("Positive", "Must be > 0").with_target("times")
        );
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_unannotated_parameter_passes_through() {
        let (repeat, _) = repeat(&registry(), GuardConfig::default());
        assert!(repeat.call(args![1; text = Value::Null]).is_ok());
    }

    #[test]
    fn test_signature_error_before_checks() {
        let (repeat, runs) = repeat(&registry(), GuardConfig::default());
        let err = repeat.call(args![-1]).unwrap_err();
        assert!(matches!(err, ContractError::SignatureError { .. }));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_on_call_sees_redefinition() {
        // GIVEN
        let registry = registry();
        let (repeat, _) = repeat(&registry, GuardConfig::default());

        // WHEN
        registry
            .compose("PositiveInteger", &[POSITIVE])
            .unwrap();

        // THEN
        assert!(repeat.call(args![2.5, "x"]).is_ok());
    }

    #[test]
    fn test_on_wrap_keeps_original_chain() {
        // GIVEN
        let registry = registry();
        let (repeat, _) = repeat(&registry, GuardConfig::eager());

        // WHEN
        registry
            .compose("PositiveInteger", &[POSITIVE])
            .unwrap();

        // THEN
        let err = repeat.call(args![2.5, "x"]).unwrap_err();
        assert_eq!(err.predicate(), Some("Integer"));
    }

    #[test]
    fn test_unknown_annotation() {
        // GIVEN
        let registry = Registry::with_builtins();
        let signature = Signature::new("f").annotated("a", "Missing");

        // WHEN
        let lazy = GuardedFunction::new(&registry, signature.clone(), |_| Ok(Value::Null)).unwrap();
        let eager = CallGuard::new(PredicateScope::new(&registry), signature, GuardConfig::eager());

        // THEN
        assert_eq!(
            lazy.call(args![1]).unwrap_err(),
            ContractError::unknown_predicate("Missing")
        );
        assert_eq!(eager.unwrap_err(), ContractError::unknown_predicate("Missing"));
    }

    #[test]
    fn test_global_annotations_fill_in() {
        // GIVEN
        let registry = registry();
        let signature = Signature::new("pair")
            .param("a")
            .annotated("b", INTEGER);
        let globals: Annotations = [
            ("a".to_string(), "PositiveInteger".to_string()),
            ("b".to_string(), "PositiveInteger".to_string()),
        ]
        .into_iter()
        .collect();

        // WHEN
        let guard = CallGuard::with_globals(
            PredicateScope::new(&registry),
            signature,
            &globals,
            GuardConfig::default(),
        )
        .unwrap();

        // THEN
        assert_eq!(guard.annotation("a"), Some("PositiveInteger"));
        assert_eq!(guard.annotation("b"), Some(INTEGER));
        assert!(guard.admit(args![-1, 1]).is_err());
        assert!(guard.admit(args![1, -1]).is_ok());
    }

    #[test]
    fn test_defaults_are_not_checked() {
        let registry = registry();
        let signature =
            Signature::new("f").push(Param::annotated("n", "PositiveInteger").with_default(-1));
        let function =
            GuardedFunction::new(&registry, signature, |args| Ok(args.require("n")?.clone()))
                .unwrap();

        assert_eq!(function.call(args![]).unwrap(), Value::Int(-1));
        assert!(function.call(args![-1]).is_err());
    }

    #[test]
    fn test_checks_run_in_parameter_order() {
        // GIVEN
        let registry = registry();
        let signature = Signature::new("f")
            .annotated("a", "PositiveInteger")
            .annotated("b", "PositiveInteger");
        let function = GuardedFunction::new(&registry, signature, |_| Ok(Value::Null)).unwrap();

        // WHEN
        let err = function.call(args![; b = -2, a = "x"]).unwrap_err();

        // THEN
        assert_eq!(err.target(), Some("a"));
    }

    #[test]
    fn test_rewrapping_only_repeats_checks() {
        // GIVEN
        let registry = registry();
        let (inner, runs) = repeat(&registry, GuardConfig::default());
        let signature = inner.guard().signature().clone();
        let outer = GuardedFunction::new(&registry, signature, move |args| {
            inner.call(args.clone().into())
        })
        .unwrap();

        // THEN
        assert_eq!(outer.call(args![1, "z"]).unwrap(), Value::from("z"));
        assert!(outer.call(args![0, "z"]).is_err());
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_local_rule_in_scope() {
        let registry = Registry::with_builtins();
        let mut scope = PredicateScope::new(&registry);
        let even = Rule::custom(|v| match v.as_int() {
            Some(i) if i % 2 == 0 => Ok(()),
            _ => Err("Must be even".into()),
        });
        scope.define_local("Even", &[INTEGER], even).unwrap();
        let signature = Signature::new("half").annotated("n", "Even");
        let guard = CallGuard::new(scope, signature, GuardConfig::default()).unwrap();

        assert!(guard.admit(args![4]).is_ok());
        assert_eq!(
            guard.admit(args![3]).unwrap_err().reason(),
            Some("Must be even")
        );
    }
}
