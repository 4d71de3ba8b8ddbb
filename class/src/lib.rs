//! Covenant Class
//!
//! Declared classes whose fields and method arguments are checked against
//! named predicates.
//!
//! # Module Structure
//!
//! - `scope` - class-local predicate names layered over a registry
//! - `attribute` - ManagedAttribute, the validated storage slot of one field
//! - `signature` - parameter lists and argument binding
//! - `guard` - CallGuard and guarded standalone functions
//! - `class` - ClassBuilder, DeclaredClass, Object and guarded methods
//! - `config` - guard configuration

mod attribute;
mod class;
mod config;
mod guard;
mod scope;
mod signature;

pub use attribute::ManagedAttribute;
pub use class::{ClassBuilder, DeclaredClass, GuardedMethod, MethodBody, Object};
pub use config::{GuardConfig, Resolution};
pub use guard::{Annotations, CallGuard, FnBody, GuardedFunction};
pub use scope::PredicateScope;
pub use signature::{Args, BoundArgs, Param, Signature};

/// Build an `Args` from positional values, optionally followed by
/// `; name = value` keyword arguments.
///
/// ```ignore
/// let args = args![1, 2];
/// let args = args![p; dx = 3];
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),* ; $($key:ident = $named:expr),+ $(,)?) => {{
        let args = $crate::Args::new();
        $( let args = args.arg($value); )*
        $( let args = args.kwarg(stringify!($key), $named); )+
        args
    }};
    ($($value:expr),+ $(,)?) => {{
        let args = $crate::Args::new();
        $( let args = args.arg($value); )+
        args
    }};
}
