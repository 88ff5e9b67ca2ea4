//! Ground actions with conditional effects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{Result, StriderError};
use crate::state::State;
use crate::types::Fluent;

/// A set of literals to make true (`add`) and false (`delete`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Effect {
    /// Fluents made true.
    #[serde(default)]
    pub add: BTreeSet<Fluent>,

    /// Fluents made false.
    #[serde(default)]
    pub delete: BTreeSet<Fluent>,
}

impl Effect {
    /// Create an effect from add and delete lists.
    pub fn new(
        add: impl IntoIterator<Item = Fluent>,
        delete: impl IntoIterator<Item = Fluent>,
    ) -> Self {
        Self {
            add: add.into_iter().collect(),
            delete: delete.into_iter().collect(),
        }
    }

    /// Returns true if the effect changes nothing.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty()
    }

    /// Fold another effect into this one.
    pub fn merge(&mut self, other: &Effect) {
        self.add.extend(other.add.iter().copied());
        self.delete.extend(other.delete.iter().copied());
    }
}

/// An effect guarded by a trigger evaluated in the pre-action state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionalEffect {
    /// Trigger; empty for unconditional effects.
    #[serde(default)]
    pub condition: Condition,

    /// Literals applied when the trigger holds.
    pub effect: Effect,
}

impl ConditionalEffect {
    /// An effect that always fires.
    pub fn unconditional(effect: Effect) -> Self {
        Self {
            condition: Condition::always(),
            effect,
        }
    }

    /// An effect that fires only when `condition` holds.
    pub fn when(condition: Condition, effect: Effect) -> Self {
        Self { condition, effect }
    }
}

/// A fully instantiated operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Name of the action, e.g. `(pick-up a)`.
    pub name: String,

    /// Condition that must hold for the action to be applicable.
    #[serde(default)]
    pub precondition: Condition,

    /// Effects, in declaration order.
    #[serde(default)]
    pub effects: Vec<ConditionalEffect>,

    /// Cost of applying the action.
    #[serde(default = "default_cost")]
    pub cost: f64,
}

fn default_cost() -> f64 {
    1.0
}

impl Action {
    /// Create an action with no precondition, no effects and unit cost.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precondition: Condition::always(),
            effects: Vec::new(),
            cost: default_cost(),
        }
    }

    /// Set the precondition.
    pub fn with_precondition(mut self, precondition: Condition) -> Self {
        self.precondition = precondition;
        self
    }

    /// Append a conditional effect.
    pub fn with_effect(mut self, effect: ConditionalEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Check if the precondition holds in `state`.
    pub fn is_applicable(&self, state: &State) -> bool {
        state.satisfies(&self.precondition)
    }

    /// Collect the literals of every effect whose trigger holds in `state`.
    pub fn triggered_effect(&self, state: &State) -> Effect {
        let mut combined = Effect::default();
        for conditional in &self.effects {
            if state.satisfies(&conditional.condition) {
                combined.merge(&conditional.effect);
            }
        }
        combined
    }

    /// Apply the action to `state`, producing the successor state.
    ///
    /// Triggers are all evaluated against `state` and the collected literals
    /// are applied in a single derivation, so no effect observes another.
    pub fn apply_effects(&self, state: &State) -> Result<State> {
        if !self.is_applicable(state) {
            return Err(StriderError::InvalidTransition {
                action: self.name.clone(),
                reason: "precondition not satisfied".to_string(),
            });
        }
        Ok(state.apply(&self.triggered_effect(state)))
    }
}
