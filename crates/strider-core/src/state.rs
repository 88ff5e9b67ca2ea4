//! Immutable world states.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::action::Effect;
use crate::condition::Condition;
use crate::types::Fluent;

/// A snapshot of the world: the set of fluents that are true.
///
/// Absent fluents are false (closed world). A `State` is never mutated once
/// built; transitions derive a new value and clones share storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct State {
    fluents: Arc<BTreeSet<Fluent>>,
}

impl State {
    /// Create a state from the fluents that hold in it.
    pub fn new(fluents: impl IntoIterator<Item = Fluent>) -> Self {
        Self {
            fluents: Arc::new(fluents.into_iter().collect()),
        }
    }

    /// The state in which nothing holds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether a fluent holds.
    pub fn contains(&self, fluent: Fluent) -> bool {
        self.fluents.contains(&fluent)
    }

    /// Number of true fluents.
    pub fn len(&self) -> usize {
        self.fluents.len()
    }

    /// Returns true if no fluent holds.
    pub fn is_empty(&self) -> bool {
        self.fluents.is_empty()
    }

    /// Iterate over the true fluents in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Fluent> + '_ {
        self.fluents.iter().copied()
    }

    /// Check whether this state satisfies a condition.
    pub fn satisfies(&self, condition: &Condition) -> bool {
        condition.is_satisfied_by(self)
    }

    /// Derive the successor `(self \ delete) ∪ add`.
    ///
    /// A fluent both deleted and added ends up true.
    pub fn apply(&self, effect: &Effect) -> State {
        if effect.is_empty() {
            return self.clone();
        }

        let mut fluents: BTreeSet<Fluent> = self
            .fluents
            .iter()
            .copied()
            .filter(|f| !effect.delete.contains(f))
            .collect();
        fluents.extend(effect.add.iter().copied());

        State {
            fluents: Arc::new(fluents),
        }
    }

    /// Rough heap footprint of this state, used for memory statistics.
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<BTreeSet<Fluent>>() + self.fluents.len() * std::mem::size_of::<Fluent>() * 2
    }
}

impl FromIterator<Fluent> for State {
    fn from_iter<I: IntoIterator<Item = Fluent>>(iter: I) -> Self {
        State::new(iter)
    }
}
