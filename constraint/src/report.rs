//! Per-link check reports.

use covenant_core::{ContractError, ContractResult};
use std::fmt;

/// The outcome of one link of a check chain.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    /// The predicate whose own rule ran.
    pub predicate: String,
    /// `Err` holds the violation (or inapplicability) the rule reported.
    pub result: Result<(), ContractError>,
}

impl LinkOutcome {
    pub fn passed(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            result: Ok(()),
        }
    }

    pub fn failed(predicate: impl Into<String>, error: ContractError) -> Self {
        Self {
            predicate: predicate.into(),
            result: Err(error),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every link's outcome for one value, in chain order.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Name of the composite that was evaluated.
    pub composite: String,
    /// Canonical rendering of the checked value.
    pub value: String,
    outcomes: Vec<LinkOutcome>,
}

impl CheckReport {
    /// Create an empty report.
    pub fn new(composite: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            composite: composite.into(),
            value: value.into(),
            outcomes: Vec::new(),
        }
    }

    /// Add a link outcome.
    pub fn push(&mut self, outcome: LinkOutcome) {
        self.outcomes.push(outcome);
    }

    /// Check if every link passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(LinkOutcome::is_passed)
    }

    /// The failure a short-circuiting check would surface.
    pub fn first_failure(&self) -> Option<&ContractError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }

    /// Get failed links.
    pub fn failures(&self) -> impl Iterator<Item = &LinkOutcome> {
        self.outcomes.iter().filter(|o| !o.is_passed())
    }

    /// Get all outcomes.
    pub fn outcomes(&self) -> &[LinkOutcome] {
        &self.outcomes
    }

    /// Get the number of links evaluated.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Collapse into the result a short-circuiting check returns.
    pub fn into_result(self) -> ContractResult<()> {
        match self.outcomes.into_iter().find_map(|o| o.result.err()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} <- {}", self.composite, self.value)?;
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(()) => writeln!(f, "  ok    {}", outcome.predicate)?,
                Err(err) => writeln!(f, "  fail  {}: {}", outcome.predicate, err)?,
            }
        }
        Ok(())
    }
}

impl IntoIterator for CheckReport {
    type Item = LinkOutcome;
    type IntoIter = std::vec::IntoIter<LinkOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a CheckReport {
    type Item = &'a LinkOutcome;
    type IntoIter = std::slice::Iter<'a, LinkOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
