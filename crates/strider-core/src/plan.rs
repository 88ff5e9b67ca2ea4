//! Sequential plans.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StriderError};
use crate::problem::Problem;
use crate::state::State;
use crate::types::ActionId;

/// An ordered sequence of actions, from the initial state onwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plan {
    actions: Vec<ActionId>,
}

impl Plan {
    /// Create a plan from action handles in execution order.
    pub fn new(actions: Vec<ActionId>) -> Self {
        Self { actions }
    }

    /// The plan with no actions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve action names against a problem.
    pub fn from_names<S: AsRef<str>>(problem: &Problem, names: &[S]) -> Result<Self> {
        let actions = names
            .iter()
            .map(|name| {
                problem.find_action(name.as_ref()).ok_or_else(|| {
                    StriderError::invalid_problem(format!("unknown action {}", name.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { actions })
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the plan has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action handles in execution order.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    /// Action names in execution order.
    pub fn names<'p>(&self, problem: &'p Problem) -> Vec<&'p str> {
        self.actions
            .iter()
            .map(|&id| problem.action(id).name.as_str())
            .collect()
    }

    /// Sum of action costs.
    pub fn cost(&self, problem: &Problem) -> f64 {
        self.actions.iter().map(|&id| problem.action(id).cost).sum()
    }

    /// Execute the plan from the initial state and return the final state.
    ///
    /// Fails with `InvalidTransition` at the first inapplicable action.
    pub fn replay(&self, problem: &Problem) -> Result<State> {
        self.actions
            .iter()
            .try_fold(problem.initial_state().clone(), |state, &id| {
                problem.action(id).apply_effects(&state)
            })
    }

    /// Returns true if the plan is executable and reaches the goal.
    pub fn is_solution(&self, problem: &Problem) -> bool {
        self.replay(problem)
            .map(|state| problem.is_goal(&state))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ActionDescription;

    const NONE: [&str; 0] = [];

    fn chain() -> Problem {
        Problem::builder()
            .init(["p0"])
            .goal(["p2"], NONE)
            .action(ActionDescription::new("step-1").precondition(["p0"], NONE).effect(["p1"], ["p0"]))
            .action(
                ActionDescription::new("step-2")
                    .precondition(["p1"], NONE)
                    .effect(["p2"], ["p1"])
                    .cost(3.0),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_replay_solution() {
        let problem = chain();
        let plan = Plan::from_names(&problem, &["step-1", "step-2"]).unwrap();

        assert!(plan.is_solution(&problem));
        assert_eq!(plan.cost(&problem), 4.0);
        assert_eq!(plan.names(&problem), vec!["step-1", "step-2"]);
    }

    #[test]
    fn test_replay_rejects_illegal_step() {
        let problem = chain();
        let plan = Plan::from_names(&problem, &["step-2"]).unwrap();

        assert!(matches!(
            plan.replay(&problem),
            Err(StriderError::InvalidTransition { .. })
        ));
        assert!(!plan.is_solution(&problem));
    }

    #[test]
    fn test_empty_plan_replays_initial_state() {
        let problem = chain();
        let state = Plan::empty().replay(&problem).unwrap();
        assert_eq!(&state, problem.initial_state());
    }

    #[test]
    fn test_unknown_action_name() {
        let problem = chain();
        assert!(Plan::from_names(&problem, &["fly"]).is_err());
    }
}
