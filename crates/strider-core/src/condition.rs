//! Conjunctive conditions over fluents.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::state::State;
use crate::types::Fluent;

/// A conjunction of signed literals.
///
/// Satisfied iff every positive fluent holds and every negative fluent does
/// not. The empty condition is always satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Fluents that must hold.
    #[serde(default)]
    pub positive: BTreeSet<Fluent>,

    /// Fluents that must not hold.
    #[serde(default)]
    pub negative: BTreeSet<Fluent>,
}

impl Condition {
    /// Create a condition from positive and negative literals.
    pub fn new(
        positive: impl IntoIterator<Item = Fluent>,
        negative: impl IntoIterator<Item = Fluent>,
    ) -> Self {
        Self {
            positive: positive.into_iter().collect(),
            negative: negative.into_iter().collect(),
        }
    }

    /// A condition made of positive literals only.
    pub fn all_of(positive: impl IntoIterator<Item = Fluent>) -> Self {
        Self::new(positive, [])
    }

    /// The always-true condition.
    pub fn always() -> Self {
        Self::default()
    }

    /// Returns true if the condition has no literals.
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Check the condition against a state.
    pub fn is_satisfied_by(&self, state: &State) -> bool {
        self.positive.iter().all(|f| state.contains(*f))
            && self.negative.iter().all(|f| !state.contains(*f))
    }

    /// Number of literals the state violates.
    pub fn unsatisfied_count(&self, state: &State) -> usize {
        let missing = self.positive.iter().filter(|f| !state.contains(**f)).count();
        let present = self.negative.iter().filter(|f| state.contains(**f)).count();
        missing + present
    }

    /// Iterate over every fluent mentioned by the condition.
    pub fn fluents(&self) -> impl Iterator<Item = Fluent> + '_ {
        self.positive.iter().chain(self.negative.iter()).copied()
    }
}
