//! Delete relaxation of a grounded problem.
//!
//! Each conditional effect of each action becomes one relaxed operator whose
//! precondition is the action precondition plus the effect trigger, and whose
//! effect is the add list. Negative literals and delete lists are dropped.
//! Fluent costs are propagated from a state with a Dijkstra-style sweep.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use strider_core::{ActionId, Condition, Problem, State};

/// A unary relaxed operator.
#[derive(Debug, Clone)]
pub struct RelaxedOperator {
    pub action: ActionId,
    pub preconditions: Vec<usize>,
    pub effects: Vec<usize>,
    pub cost: f64,
}

/// How the cost of an operator's preconditions is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// `h_max`: the most expensive precondition.
    Max,
    /// `h_add`: the sum of precondition costs.
    Sum,
}

/// How operators are charged during propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostModel {
    /// Use action costs.
    ActionCost,
    /// Every operator costs one (relaxed planning graph layers).
    Unit,
}

/// Result of a cost propagation from one state.
#[derive(Debug, Clone)]
pub struct Exploration {
    /// Cost to make each fluent true, `INFINITY` if unreachable.
    pub fluent_cost: Vec<f64>,
    /// Operator that achieved each fluent at its recorded cost.
    pub supporter: Vec<Option<usize>>,
}

impl Exploration {
    /// Combine the costs of the goal's positive literals.
    pub fn goal_cost(&self, goal: &Condition, aggregation: Aggregation) -> f64 {
        let costs = goal.positive.iter().map(|f| self.cost_of(f.index()));
        match aggregation {
            Aggregation::Max => costs.fold(0.0, f64::max),
            Aggregation::Sum => costs.sum(),
        }
    }

    fn cost_of(&self, fluent: usize) -> f64 {
        self.fluent_cost.get(fluent).copied().unwrap_or(f64::INFINITY)
    }
}

/// The relaxed operators of a problem, indexed for propagation.
#[derive(Debug, Clone)]
pub struct RelaxedTask {
    fluent_count: usize,
    operators: Vec<RelaxedOperator>,
    /// fluent -> operators that require it.
    precondition_of: Vec<Vec<usize>>,
    /// Operators with no precondition at all.
    unconditional: Vec<usize>,
}

impl RelaxedTask {
    /// Build the relaxation of `problem`.
    pub fn new(problem: &Problem) -> Self {
        let fluent_count = problem.fluent_count();
        let mut operators = Vec::new();

        for (index, action) in problem.actions().iter().enumerate() {
            for conditional in &action.effects {
                if conditional.effect.add.is_empty() {
                    continue;
                }

                let mut preconditions: Vec<usize> = action
                    .precondition
                    .positive
                    .iter()
                    .chain(conditional.condition.positive.iter())
                    .map(|f| f.index())
                    .collect();
                preconditions.sort_unstable();
                preconditions.dedup();

                operators.push(RelaxedOperator {
                    action: ActionId(index),
                    preconditions,
                    effects: conditional.effect.add.iter().map(|f| f.index()).collect(),
                    cost: action.cost,
                });
            }
        }

        let mut precondition_of = vec![Vec::new(); fluent_count];
        let mut unconditional = Vec::new();
        for (op, operator) in operators.iter().enumerate() {
            if operator.preconditions.is_empty() {
                unconditional.push(op);
            }
            for &fluent in &operator.preconditions {
                precondition_of[fluent].push(op);
            }
        }

        Self {
            fluent_count,
            operators,
            precondition_of,
            unconditional,
        }
    }

    /// All relaxed operators.
    pub fn operators(&self) -> &[RelaxedOperator] {
        &self.operators
    }

    /// Propagate fluent costs from `state`.
    pub fn explore(&self, state: &State, aggregation: Aggregation, model: CostModel) -> Exploration {
        let mut fluent_cost = vec![f64::INFINITY; self.fluent_count];
        let mut supporter = vec![None; self.fluent_count];
        let mut expanded = vec![false; self.fluent_count];
        let mut unsatisfied: Vec<usize> = self.operators.iter().map(|o| o.preconditions.len()).collect();
        let mut accumulated = vec![0.0_f64; self.operators.len()];
        let mut queue = BinaryHeap::new();

        for fluent in state.iter() {
            let index = fluent.index();
            if index < self.fluent_count {
                fluent_cost[index] = 0.0;
                queue.push(QueueEntry { cost: 0.0, fluent: index });
            }
        }

        let charge = |op: &RelaxedOperator| match model {
            CostModel::ActionCost => op.cost,
            CostModel::Unit => 1.0,
        };

        for &op in &self.unconditional {
            let operator = &self.operators[op];
            let cost = charge(operator);
            for &effect in &operator.effects {
                if cost < fluent_cost[effect] {
                    fluent_cost[effect] = cost;
                    supporter[effect] = Some(op);
                    queue.push(QueueEntry { cost, fluent: effect });
                }
            }
        }

        while let Some(QueueEntry { cost, fluent }) = queue.pop() {
            if expanded[fluent] || cost > fluent_cost[fluent] {
                continue;
            }
            expanded[fluent] = true;

            for &op in &self.precondition_of[fluent] {
                accumulated[op] = match aggregation {
                    Aggregation::Max => accumulated[op].max(cost),
                    Aggregation::Sum => accumulated[op] + cost,
                };
                unsatisfied[op] -= 1;
                if unsatisfied[op] > 0 {
                    continue;
                }

                let operator = &self.operators[op];
                let reached = accumulated[op] + charge(operator);
                for &effect in &operator.effects {
                    if reached < fluent_cost[effect] {
                        fluent_cost[effect] = reached;
                        supporter[effect] = Some(op);
                        queue.push(QueueEntry {
                            cost: reached,
                            fluent: effect,
                        });
                    }
                }
            }
        }

        Exploration {
            fluent_cost,
            supporter,
        }
    }

    /// Cost of a relaxed plan for `goal`, extracted from an `h_add` exploration.
    ///
    /// Each action is charged once even if several of its effects are used.
    pub fn relaxed_plan_cost(&self, exploration: &Exploration, goal: &Condition) -> f64 {
        let mut open: Vec<usize> = goal.positive.iter().map(|f| f.index()).collect();
        let mut visited = HashSet::new();
        let mut used_actions = HashSet::new();
        let mut total = 0.0;

        while let Some(fluent) = open.pop() {
            if !visited.insert(fluent) {
                continue;
            }
            if exploration.cost_of(fluent).is_infinite() {
                return f64::INFINITY;
            }
            let Some(op) = exploration.supporter.get(fluent).copied().flatten() else {
                continue;
            };

            let operator = &self.operators[op];
            if used_actions.insert(operator.action) {
                total += operator.cost;
            }
            open.extend(operator.preconditions.iter().copied());
        }

        total
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    fluent: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower cost = higher priority)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.fluent.cmp(&self.fluent))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
