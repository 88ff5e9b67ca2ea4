//! Grounded planning problems and their name-based descriptions.
//!
//! A [`Problem`] is the read-only input of the search: the fluent name table,
//! the initial state, the goal and the ground actions. It is usually built
//! from a [`ProblemDescription`], which refers to fluents by name and can be
//! read from JSON or assembled with a [`ProblemBuilder`].

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::action::{Action, ConditionalEffect, Effect};
use crate::condition::Condition;
use crate::error::{Result, StriderError};
use crate::state::State;
use crate::types::{ActionId, Fluent, Requirement};

/// A fully grounded planning problem.
#[derive(Debug, Clone)]
pub struct Problem {
    name: String,
    fluents: Vec<String>,
    initial_state: State,
    goal: Condition,
    actions: Vec<Action>,
    requirements: BTreeSet<Requirement>,
}

impl Problem {
    /// Assemble a problem from already interned parts.
    ///
    /// Fails with `InvalidProblem` when a state, goal or action mentions a
    /// fluent outside the name table, when two actions share a name, or
    /// when a cost is negative or not finite.
    pub fn new(
        name: impl Into<String>,
        fluents: Vec<String>,
        initial_state: State,
        goal: Condition,
        actions: Vec<Action>,
    ) -> Result<Self> {
        let problem = Self {
            name: name.into(),
            fluents,
            initial_state,
            goal,
            actions,
            requirements: BTreeSet::new(),
        };
        problem.check_consistency()?;
        Ok(problem)
    }

    fn check_consistency(&self) -> Result<()> {
        let known = self.fluents.len();
        let out_of_range = |fluent: Fluent| fluent.index() >= known;

        if let Some(fluent) = self.initial_state.iter().find(|&f| out_of_range(f)) {
            return Err(StriderError::invalid_problem(format!(
                "initial state mentions undeclared fluent {}",
                fluent.index()
            )));
        }
        if let Some(fluent) = self.goal.fluents().find(|&f| out_of_range(f)) {
            return Err(StriderError::invalid_problem(format!(
                "goal mentions undeclared fluent {}",
                fluent.index()
            )));
        }

        let mut names = HashSet::with_capacity(self.actions.len());
        for action in &self.actions {
            if !names.insert(action.name.as_str()) {
                return Err(StriderError::invalid_problem(format!(
                    "duplicate action name {}",
                    action.name
                )));
            }
            if !action.cost.is_finite() || action.cost < 0.0 {
                return Err(StriderError::invalid_problem(format!(
                    "action {} has invalid cost {}",
                    action.name, action.cost
                )));
            }
            let mentioned = action.precondition.fluents().chain(action.effects.iter().flat_map(|e| {
                e.condition
                    .fluents()
                    .chain(e.effect.add.iter().copied())
                    .chain(e.effect.delete.iter().copied())
            }));
            for fluent in mentioned {
                if out_of_range(fluent) {
                    return Err(StriderError::invalid_problem(format!(
                        "action {} mentions undeclared fluent {}",
                        action.name,
                        fluent.index()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Declare the requirements of the problem.
    pub fn with_requirements(mut self, requirements: impl IntoIterator<Item = Requirement>) -> Self {
        self.requirements = requirements.into_iter().collect();
        self
    }

    /// Start building a problem by fluent names.
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::new()
    }

    /// Parse and ground a JSON problem description.
    pub fn from_json(json: &str) -> Result<Problem> {
        let description: ProblemDescription = serde_json::from_str(json)?;
        description.ground()
    }

    /// Name of the problem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of interned fluents.
    pub fn fluent_count(&self) -> usize {
        self.fluents.len()
    }

    /// Name of a fluent.
    pub fn fluent_name(&self, fluent: Fluent) -> Option<&str> {
        self.fluents.get(fluent.index()).map(String::as_str)
    }

    /// Look up a fluent by name.
    pub fn fluent(&self, name: &str) -> Option<Fluent> {
        self.fluents
            .iter()
            .position(|f| f == name)
            .map(|i| Fluent(i as u32))
    }

    /// The initial state.
    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// The goal condition.
    pub fn goal(&self) -> &Condition {
        &self.goal
    }

    /// All ground actions.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Get an action by handle.
    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.index()]
    }

    /// Look up an action by name.
    pub fn find_action(&self, name: &str) -> Option<ActionId> {
        self.actions.iter().position(|a| a.name == name).map(ActionId)
    }

    /// Declared requirements.
    pub fn requirements(&self) -> &BTreeSet<Requirement> {
        &self.requirements
    }

    /// Fail with `UnsupportedProblem` on the first unsupported requirement.
    pub fn check_supported(&self) -> Result<()> {
        match self.requirements.iter().find(|r| !r.is_supported()) {
            Some(requirement) => Err(StriderError::UnsupportedProblem {
                requirement: requirement.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns true if `state` satisfies the goal.
    pub fn is_goal(&self, state: &State) -> bool {
        state.satisfies(&self.goal)
    }

    /// Handles of the actions applicable in `state`, in declaration order.
    pub fn applicable_actions<'a>(&'a self, state: &'a State) -> impl Iterator<Item = ActionId> + 'a {
        self.actions
            .iter()
            .enumerate()
            .filter(move |(_, action)| action.is_applicable(state))
            .map(|(i, _)| ActionId(i))
    }

    /// Names of the fluents true in `state`.
    pub fn describe_state(&self, state: &State) -> Vec<&str> {
        state.iter().filter_map(|f| self.fluent_name(f)).collect()
    }
}

/// Literals referring to fluents by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionDescription {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

impl ConditionDescription {
    /// Describe a condition from positive and negative names.
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            positive: positive.into_iter().map(Into::into).collect(),
            negative: negative.into_iter().map(Into::into).collect(),
        }
    }
}

/// A conditional effect referring to fluents by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectDescription {
    #[serde(default)]
    pub condition: ConditionDescription,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub delete: Vec<String>,
}

/// A ground action referring to fluents by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescription {
    pub name: String,
    #[serde(default)]
    pub precondition: ConditionDescription,
    #[serde(default)]
    pub effects: Vec<EffectDescription>,
    #[serde(default = "default_cost")]
    pub cost: f64,
}

fn default_cost() -> f64 {
    1.0
}

impl ActionDescription {
    /// Create an action description with unit cost.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precondition: ConditionDescription::default(),
            effects: Vec::new(),
            cost: default_cost(),
        }
    }

    /// Set the precondition.
    pub fn precondition<P, N>(mut self, positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        self.precondition = ConditionDescription::new(positive, negative);
        self
    }

    /// Add an unconditional effect.
    pub fn effect<A, D>(self, add: A, delete: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        self.when(ConditionDescription::default(), add, delete)
    }

    /// Add an effect guarded by `condition`.
    pub fn when<A, D>(mut self, condition: ConditionDescription, add: A, delete: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        self.effects.push(EffectDescription {
            condition,
            add: add.into_iter().map(Into::into).collect(),
            delete: delete.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Set the cost.
    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

/// Name-based, serializable form of a problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Declared fluents; names used elsewhere are interned on first sight.
    #[serde(default)]
    pub fluents: Vec<String>,
    #[serde(default)]
    pub init: Vec<String>,
    #[serde(default)]
    pub goal: ConditionDescription,
    #[serde(default)]
    pub actions: Vec<ActionDescription>,
}

impl ProblemDescription {
    /// Intern fluent names and build the grounded problem.
    pub fn ground(&self) -> Result<Problem> {
        if let Some(requirement) = self.requirements.iter().find(|r| !r.is_supported()) {
            return Err(StriderError::UnsupportedProblem {
                requirement: requirement.to_string(),
            });
        }

        let mut interner = Interner::default();
        for name in &self.fluents {
            interner.intern(name);
        }

        let initial_state: State = self.init.iter().map(|n| interner.intern(n)).collect();
        let goal = interner.condition(&self.goal);

        let mut actions = Vec::with_capacity(self.actions.len());
        for description in &self.actions {
            let mut action = Action::new(description.name.clone())
                .with_precondition(interner.condition(&description.precondition))
                .with_cost(description.cost);
            for effect in &description.effects {
                let condition = interner.condition(&effect.condition);
                let literals = Effect::new(
                    effect.add.iter().map(|n| interner.intern(n)).collect::<Vec<_>>(),
                    effect.delete.iter().map(|n| interner.intern(n)).collect::<Vec<_>>(),
                );
                action = action.with_effect(ConditionalEffect::when(condition, literals));
            }
            actions.push(action);
        }

        Ok(Problem::new(self.name.clone(), interner.names, initial_state, goal, actions)?
            .with_requirements(self.requirements.iter().copied()))
    }
}

#[derive(Default)]
struct Interner {
    names: Vec<String>,
    ids: HashMap<String, Fluent>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> Fluent {
        if let Some(&fluent) = self.ids.get(name) {
            return fluent;
        }
        let fluent = Fluent(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), fluent);
        fluent
    }

    fn condition(&mut self, description: &ConditionDescription) -> Condition {
        let positive: Vec<Fluent> = description.positive.iter().map(|n| self.intern(n)).collect();
        let negative: Vec<Fluent> = description.negative.iter().map(|n| self.intern(n)).collect();
        Condition::new(positive, negative)
    }
}

/// Builder for problems with a fluent API.
#[derive(Debug, Default)]
pub struct ProblemBuilder {
    description: ProblemDescription,
}

impl ProblemBuilder {
    /// Create a new ProblemBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the problem name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.description.name = name.into();
        self
    }

    /// Declare a requirement.
    pub fn requirement(mut self, requirement: Requirement) -> Self {
        self.description.requirements.push(requirement);
        self
    }

    /// Declare fluents up front (fixes their interning order).
    pub fn fluents<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.description.fluents.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the fluents true in the initial state.
    pub fn init<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.description.init = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the goal.
    pub fn goal<P, N>(mut self, positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        self.description.goal = ConditionDescription::new(positive, negative);
        self
    }

    /// Add an action.
    pub fn action(mut self, action: ActionDescription) -> Self {
        self.description.actions.push(action);
        self
    }

    /// Ground the problem.
    pub fn build(self) -> Result<Problem> {
        self.description.ground()
    }
}
