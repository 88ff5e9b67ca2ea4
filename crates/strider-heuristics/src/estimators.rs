//! Concrete heuristic strategies.

use strider_core::{Condition, Problem, State};

use crate::heuristic::{HeuristicEstimator, HeuristicName};
use crate::relaxed::{Aggregation, CostModel, RelaxedTask};

/// Relaxed-plan heuristic (`h_FF`).
#[derive(Debug, Clone)]
pub struct FastForwardHeuristic {
    task: RelaxedTask,
}

impl FastForwardHeuristic {
    pub fn new(problem: &Problem) -> Self {
        Self {
            task: RelaxedTask::new(problem),
        }
    }
}

impl HeuristicEstimator for FastForwardHeuristic {
    fn name(&self) -> HeuristicName {
        HeuristicName::FastForward
    }

    fn estimate(&self, state: &State, goal: &Condition) -> f64 {
        let exploration = self.task.explore(state, Aggregation::Sum, CostModel::ActionCost);
        self.task.relaxed_plan_cost(&exploration, goal)
    }
}

/// `h_max` over action costs.
#[derive(Debug, Clone)]
pub struct MaxHeuristic {
    task: RelaxedTask,
}

impl MaxHeuristic {
    pub fn new(problem: &Problem) -> Self {
        Self {
            task: RelaxedTask::new(problem),
        }
    }
}

impl HeuristicEstimator for MaxHeuristic {
    fn name(&self) -> HeuristicName {
        HeuristicName::Max
    }

    fn estimate(&self, state: &State, goal: &Condition) -> f64 {
        self.task
            .explore(state, Aggregation::Max, CostModel::ActionCost)
            .goal_cost(goal, Aggregation::Max)
    }
}

/// `h_add` over action costs.
#[derive(Debug, Clone)]
pub struct SumHeuristic {
    task: RelaxedTask,
}

impl SumHeuristic {
    pub fn new(problem: &Problem) -> Self {
        Self {
            task: RelaxedTask::new(problem),
        }
    }
}

impl HeuristicEstimator for SumHeuristic {
    fn name(&self) -> HeuristicName {
        HeuristicName::Sum
    }

    fn estimate(&self, state: &State, goal: &Condition) -> f64 {
        self.task
            .explore(state, Aggregation::Sum, CostModel::ActionCost)
            .goal_cost(goal, Aggregation::Sum)
    }
}

/// Sum of goal levels plus the set-level interaction term.
///
/// Without mutexes the goal set appears at the level of its latest goal, so
/// the interaction term is zero and the estimate is the additive one over
/// unit-cost layers.
#[derive(Debug, Clone)]
pub struct AdjustedSumHeuristic {
    task: RelaxedTask,
}

impl AdjustedSumHeuristic {
    pub fn new(problem: &Problem) -> Self {
        Self {
            task: RelaxedTask::new(problem),
        }
    }
}

impl HeuristicEstimator for AdjustedSumHeuristic {
    fn name(&self) -> HeuristicName {
        HeuristicName::AdjustedSum
    }

    fn estimate(&self, state: &State, goal: &Condition) -> f64 {
        self.task
            .explore(state, Aggregation::Sum, CostModel::Unit)
            .goal_cost(goal, Aggregation::Sum)
    }
}

/// Index of the first relaxed planning graph layer containing the goal.
#[derive(Debug, Clone)]
pub struct SetLevelHeuristic {
    task: RelaxedTask,
}

impl SetLevelHeuristic {
    pub fn new(problem: &Problem) -> Self {
        Self {
            task: RelaxedTask::new(problem),
        }
    }
}

impl HeuristicEstimator for SetLevelHeuristic {
    fn name(&self) -> HeuristicName {
        HeuristicName::SetLevel
    }

    fn estimate(&self, state: &State, goal: &Condition) -> f64 {
        self.task
            .explore(state, Aggregation::Max, CostModel::Unit)
            .goal_cost(goal, Aggregation::Max)
    }
}

/// Number of goal literals the state violates.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalCountHeuristic;

impl HeuristicEstimator for GoalCountHeuristic {
    fn name(&self) -> HeuristicName {
        HeuristicName::GoalCount
    }

    fn estimate(&self, state: &State, goal: &Condition) -> f64 {
        goal.unsatisfied_count(state) as f64
    }
}
