//! Bounded random walks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use strider_core::{ActionId, Problem, Result, State};

use crate::random::RandomSource;
use crate::trajectory::{NodeId, TrajectoryArena};

/// Cooperative stop condition shared by the walks of one search.
#[derive(Debug, Clone)]
pub struct StopSignal {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl StopSignal {
    /// A signal that fires once `timeout` has elapsed or on cancellation.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A signal that only fires on cancellation.
    pub fn never() -> Self {
        Self {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask every walk sharing this signal to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_timed_out(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.is_timed_out()
    }
}

/// Outcome of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkResult {
    /// Last node reached.
    pub final_node: NodeId,
    /// Whether the final node satisfies the goal.
    pub goal_reached: bool,
    /// Actions applied.
    pub steps: usize,
    /// Whether the stop signal cut the walk short.
    pub interrupted: bool,
}

/// Runs random walks over a problem.
pub struct WalkSampler<'p> {
    problem: &'p Problem,
    applicable: Vec<ActionId>,
}

impl<'p> WalkSampler<'p> {
    pub fn new(problem: &'p Problem) -> Self {
        Self {
            problem,
            applicable: Vec::new(),
        }
    }

    /// Walk at most `max_steps` uniformly chosen applicable actions from
    /// `start`, recording the trajectory in `arena`.
    ///
    /// Stops early when the goal is reached, when no action is applicable,
    /// or when `stop` fires.
    pub fn walk<R: RandomSource + ?Sized>(
        &mut self,
        start: &State,
        max_steps: usize,
        arena: &mut TrajectoryArena,
        rng: &mut R,
        stop: &StopSignal,
    ) -> Result<WalkResult> {
        let mut current = arena.push_root(start.clone());

        for step in 0..max_steps {
            if stop.should_stop() {
                return Ok(WalkResult {
                    final_node: current,
                    goal_reached: false,
                    steps: step,
                    interrupted: true,
                });
            }

            let state = arena.node(current).state.clone();
            self.applicable.clear();
            self.applicable.extend(self.problem.applicable_actions(&state));

            if self.applicable.is_empty() {
                return Ok(WalkResult {
                    final_node: current,
                    goal_reached: self.problem.is_goal(&state),
                    steps: step,
                    interrupted: false,
                });
            }

            let action = self.applicable[rng.uniform_index(self.applicable.len())];
            let next = self.problem.action(action).apply_effects(&state)?;
            let reached_goal = self.problem.is_goal(&next);
            current = arena.push_child(current, action, next);

            if reached_goal {
                return Ok(WalkResult {
                    final_node: current,
                    goal_reached: true,
                    steps: step + 1,
                    interrupted: false,
                });
            }
        }

        Ok(WalkResult {
            final_node: current,
            goal_reached: false,
            steps: max_steps,
            interrupted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};
    use strider_core::{ActionDescription, ConditionDescription};

    const NONE: [&str; 0] = [];

    fn toy() -> Problem {
        Problem::builder()
            .fluents(["a", "b", "c"])
            .init(["a"])
            .goal(["b"], NONE)
            .action(ActionDescription::new("move").precondition(["a"], NONE).when(
                ConditionDescription::new(["a"], NONE),
                ["b"],
                ["a"],
            ))
            .build()
            .unwrap()
    }

    /// A counter 0..=3 with `inc` and `dec`; the goal is `n3`.
    fn counter() -> Problem {
        let mut builder = Problem::builder().init(["n0"]).goal(["n3"], NONE);
        for i in 0..3 {
            builder = builder
                .action(
                    ActionDescription::new(format!("inc-{i}"))
                        .precondition([format!("n{i}")], NONE)
                        .effect([format!("n{}", i + 1)], [format!("n{i}")]),
                )
                .action(
                    ActionDescription::new(format!("dec-{}", i + 1))
                        .precondition([format!("n{}", i + 1)], NONE)
                        .effect([format!("n{i}")], [format!("n{}", i + 1)]),
                );
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_walk_reaches_goal() {
        let problem = toy();
        let mut arena = TrajectoryArena::new();
        let mut sampler = WalkSampler::new(&problem);
        let result = sampler
            .walk(problem.initial_state(), 5, &mut arena, &mut SeededRandom::seeded(1), &StopSignal::never())
            .unwrap();

        assert!(result.goal_reached);
        assert_eq!(result.steps, 1);
        assert_eq!(arena.node(result.final_node).depth, 1);
        assert_eq!(arena.reconstruct(result.final_node).names(&problem), vec!["move"]);
    }

    #[test]
    fn test_walk_stops_without_applicable_actions() {
        let problem = Problem::builder().init(["a"]).goal(["b"], NONE).build().unwrap();
        let mut arena = TrajectoryArena::new();
        let result = WalkSampler::new(&problem)
            .walk(problem.initial_state(), 5, &mut arena, &mut ScriptedRandom::default(), &StopSignal::never())
            .unwrap();

        assert!(!result.goal_reached);
        assert_eq!(result.steps, 0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_walk_respects_length_bound() {
        let problem = counter();
        let mut arena = TrajectoryArena::new();
        // Applicable actions are listed in declaration order: from n1 the
        // choices are [dec-1, inc-1], so always picking the first one
        // oscillates between n0 and n1.
        let mut rng = ScriptedRandom::new(vec![0]);
        let result = WalkSampler::new(&problem)
            .walk(problem.initial_state(), 4, &mut arena, &mut rng, &StopSignal::never())
            .unwrap();

        assert!(!result.goal_reached);
        assert_eq!(result.steps, 4);
        assert_eq!(arena.node(result.final_node).depth, 4);
        assert_eq!(
            arena.reconstruct(result.final_node).names(&problem),
            vec!["inc-0", "dec-1", "inc-0", "dec-1"]
        );
    }

    #[test]
    fn test_cancelled_walk_is_interrupted() {
        let problem = counter();
        let stop = StopSignal::never();
        stop.cancel();
        let mut arena = TrajectoryArena::new();
        let result = WalkSampler::new(&problem)
            .walk(problem.initial_state(), 4, &mut arena, &mut SeededRandom::seeded(3), &stop)
            .unwrap();

        assert!(result.interrupted);
        assert_eq!(result.steps, 0);
    }

    #[test]
    fn test_every_step_is_legal() {
        let problem = counter();
        let mut arena = TrajectoryArena::new();
        let result = WalkSampler::new(&problem)
            .walk(problem.initial_state(), 20, &mut arena, &mut SeededRandom::seeded(11), &StopSignal::never())
            .unwrap();

        let plan = arena.reconstruct(result.final_node);
        let replayed = plan.replay(&problem).unwrap();
        assert_eq!(&replayed, &arena.node(result.final_node).state);
        assert_eq!(problem.is_goal(&replayed), result.goal_reached);
    }
}
