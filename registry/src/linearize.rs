//! C3 linearization of predicate parents.
//!
//! The chain of a predicate lists every ancestor exactly once. Each predicate
//! appears before all of its own ancestors, and parents keep their declared
//! left-to-right order. Any chain containing a given predicate sees its
//! ancestors in the same relative order.

use crate::PredicateDef;
use covenant_core::{ContractError, ContractResult};
use std::rc::Rc;

/// Merge the chains of `parents` into the ancestor list of a new predicate
/// named `name` (the predicate itself is not included).
///
/// Fails with `InconsistentHierarchy` when no order satisfies every parent
/// chain, e.g. when one parent is listed before a predicate that derives
/// from it.
pub fn linearize(
    name: &str,
    parents: &[Rc<PredicateDef>],
) -> ContractResult<Vec<Rc<PredicateDef>>> {
    let mut sequences: Vec<Vec<Rc<PredicateDef>>> =
        parents.iter().map(|parent| parent.linearization()).collect();
    sequences.push(parents.to_vec());

    let mut result = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        // A head is eligible only if it appears in no sequence's tail.
        let next = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|candidate| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|other| other.id == candidate.id))
            })
            .cloned()
            .ok_or_else(|| ContractError::inconsistent_hierarchy(name))?;

        for seq in &mut sequences {
            if seq[0].id == next.id {
                seq.remove(0);
            }
        }
        result.push(next);
    }
}
