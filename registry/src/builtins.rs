//! Built-in predicates.
//!
//! | Name       | Parents  | Own rule        |
//! |------------|----------|-----------------|
//! | `Contract` | -        | accepts all     |
//! | `Typed`    | Contract | accepts all     |
//! | `Integer`  | Typed    | type is `int`   |
//! | `String`   | Typed    | type is `str`   |
//! | `Float`    | Typed    | type is `float` |
//! | `Negative` | Contract | `< 0`           |
//! | `Positive` | Contract | `> 0`           |
//! | `Nonempty` | Contract | length `> 0`    |
//!
//! `Typed` fixes no type itself; it is the shared root of the type
//! predicates, so composing two of them forms a diamond through it.

use crate::{PredicateDef, Registry, Rule};
use covenant_core::TypeTag;
use std::rc::Rc;

pub const BASE: &str = "Contract";
pub const TYPED: &str = "Typed";
pub const INTEGER: &str = "Integer";
pub const STRING: &str = "String";
pub const FLOAT: &str = "Float";
pub const NEGATIVE: &str = "Negative";
pub const POSITIVE: &str = "Positive";
pub const NONEMPTY: &str = "Nonempty";

/// Seed the base predicate every other predicate derives from.
pub(crate) fn install_base(registry: &Registry) -> Rc<PredicateDef> {
    seed(registry, BASE, None, Rule::Accept)
}

/// Seed every built-in predicate.
pub(crate) fn install(registry: &Registry) {
    let base = install_base(registry);
    let typed = seed(registry, TYPED, Some(&base), Rule::Accept);

    seed(registry, INTEGER, Some(&typed), Rule::Typed(TypeTag::Int));
    seed(registry, STRING, Some(&typed), Rule::Typed(TypeTag::Str));
    seed(registry, FLOAT, Some(&typed), Rule::Typed(TypeTag::Float));
    seed(registry, NEGATIVE, Some(&base), Rule::Negative);
    seed(registry, POSITIVE, Some(&base), Rule::Positive);
    seed(registry, NONEMPTY, Some(&base), Rule::Nonempty);
}

/// Single-parent chains always linearize, so seeding cannot fail.
fn seed(
    registry: &Registry,
    name: &str,
    parent: Option<&Rc<PredicateDef>>,
    rule: Rule,
) -> Rc<PredicateDef> {
    let parents: Vec<Rc<PredicateDef>> = parent.into_iter().cloned().collect();
    let ancestors = parent.map(|p| p.linearization()).unwrap_or_default();
    let def = Rc::new(PredicateDef::from_parts(
        registry.allocate_id(),
        name,
        parents,
        rule,
        ancestors,
    ));
    registry.seed(Rc::clone(&def));
    def
}
