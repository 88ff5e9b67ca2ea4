//! Restarting random-walk search.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use strider_core::{Plan, Problem, Result};
use strider_heuristics::WeightedHeuristic;
use tracing::{debug, info, warn};

use crate::planner::{PlannerConfig, SearchOutcome, SearchStatistics};
use crate::random::RandomSource;
use crate::trajectory::{NodeId, TrajectoryArena};
use crate::walk::{StopSignal, WalkSampler};

/// Walks and steps still available to a search, shared between workers.
#[derive(Debug)]
pub struct WalkBudget {
    walks_left: AtomicUsize,
    steps_left: Option<AtomicU64>,
    walk_length: usize,
}

impl WalkBudget {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            walks_left: AtomicUsize::new(config.num_walks),
            steps_left: config.max_steps.map(AtomicU64::new),
            walk_length: config.walk_length,
        }
    }

    /// Claim one walk and return its step bound, or `None` once either the
    /// walks or the step budget are spent.
    pub fn claim(&self) -> Option<usize> {
        self.walks_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
            .ok()?;

        let Some(steps_left) = &self.steps_left else {
            return Some(self.walk_length);
        };
        let wanted = self.walk_length as u64;
        let previous = steps_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                (left > 0).then(|| left - left.min(wanted))
            })
            .ok()?;
        Some(previous.min(wanted) as usize)
    }

    /// Return steps that a claimed walk did not use.
    pub fn refund(&self, unused: usize) {
        if let Some(steps_left) = &self.steps_left {
            if unused > 0 {
                steps_left.fetch_add(unused as u64, Ordering::AcqRel);
            }
        }
    }
}

/// What one run of the walk loop produced.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// Plan of the first walk that reached the goal.
    pub goal: Option<Plan>,
    /// Best-effort plan and its weighted score.
    pub best: Option<(Plan, f64)>,
    pub walks_completed: usize,
    pub walks_interrupted: usize,
    pub steps_taken: u64,
    pub peak_nodes: usize,
    pub peak_bytes: usize,
    /// Whether the deadline stopped the loop.
    pub timed_out: bool,
}

/// Random-walk search over one problem.
pub struct RandomWalkSearch<'p> {
    problem: &'p Problem,
    heuristic: &'p WeightedHeuristic,
    config: &'p PlannerConfig,
}

impl<'p> RandomWalkSearch<'p> {
    pub fn new(problem: &'p Problem, heuristic: &'p WeightedHeuristic, config: &'p PlannerConfig) -> Self {
        Self {
            problem,
            heuristic,
            config,
        }
    }

    /// Run the whole search on the calling thread.
    pub fn run<R: RandomSource + ?Sized>(&self, rng: &mut R, stop: &StopSignal) -> Result<SearchOutcome> {
        let started = Instant::now();
        let mut statistics = SearchStatistics::start();

        info!(
            "Starting random-walk search on {} ({} walks of length {}, {} heuristic)",
            self.problem.name(),
            self.config.num_walks,
            self.config.walk_length,
            self.heuristic.name()
        );

        if let Some(outcome) = self.trivial_outcome(&mut statistics) {
            return Ok(outcome);
        }

        let budget = WalkBudget::new(self.config);
        let report = self.walk_loop(&budget, rng, stop)?;
        Ok(self.finish(report, statistics, started))
    }

    /// The empty solution when the initial state already satisfies the goal.
    pub(crate) fn trivial_outcome(&self, statistics: &mut SearchStatistics) -> Option<SearchOutcome> {
        if !self.problem.is_goal(self.problem.initial_state()) {
            return None;
        }
        info!("Initial state of {} satisfies the goal", self.problem.name());
        statistics.best_heuristic = Some(0.0);
        Some(SearchOutcome {
            plan: Some(Plan::empty()),
            goal_reached: true,
            statistics: statistics.clone(),
        })
    }

    /// Run walks until the budget is spent, the goal is reached or `stop`
    /// fires.
    pub fn walk_loop<R: RandomSource + ?Sized>(
        &self,
        budget: &WalkBudget,
        rng: &mut R,
        stop: &StopSignal,
    ) -> Result<WalkReport> {
        let mut report = WalkReport::default();
        let mut arena = TrajectoryArena::new();
        let mut sampler = WalkSampler::new(self.problem);
        let goal = self.problem.goal();
        let mut best: Option<(NodeId, f64)> = None;

        loop {
            if stop.should_stop() {
                report.timed_out = stop.is_timed_out();
                break;
            }
            let Some(bound) = budget.claim() else {
                break;
            };

            let mark = arena.len();
            let walk = sampler.walk(self.problem.initial_state(), bound, &mut arena, rng, stop)?;
            budget.refund(bound - walk.steps);
            report.steps_taken += walk.steps as u64;

            if walk.interrupted {
                report.walks_interrupted += 1;
                report.timed_out = stop.is_timed_out();
                // A cut-short walk is still a legal prefix from the initial
                // state; keep it when nothing better exists.
                if best.is_none() {
                    let score = self.heuristic.score(&arena.node(walk.final_node).state, goal);
                    debug!("Keeping interrupted walk after {} step(s) as best", walk.steps);
                    best = Some((arena.promote(mark, walk.final_node), score));
                } else {
                    arena.truncate(mark);
                }
                break;
            }
            report.walks_completed += 1;

            if walk.goal_reached {
                let plan = arena.reconstruct(walk.final_node);
                info!("Walk {} reached the goal with {} action(s)", report.walks_completed, plan.len());
                report.goal = Some(plan);
                break;
            }

            let score = self.heuristic.score(&arena.node(walk.final_node).state, goal);
            match best {
                Some((_, best_score)) if score >= best_score || score.is_nan() => arena.truncate(mark),
                _ => {
                    debug!("Walk {} improved the best score to {}", report.walks_completed, score);
                    best = Some((arena.promote(mark, walk.final_node), score));
                }
            }
        }

        report.best = best.map(|(node, score)| (arena.reconstruct(node), score));
        report.peak_nodes = arena.peak_nodes();
        report.peak_bytes = arena.peak_bytes();
        Ok(report)
    }

    /// Turn a report into the search outcome.
    pub(crate) fn finish(
        &self,
        report: WalkReport,
        mut statistics: SearchStatistics,
        started: Instant,
    ) -> SearchOutcome {
        statistics.walks_completed = report.walks_completed;
        statistics.walks_interrupted = report.walks_interrupted;
        statistics.steps_taken = report.steps_taken;
        statistics.peak_nodes = report.peak_nodes;
        statistics.memory_bytes = report.peak_bytes;
        statistics.timed_out = report.timed_out;
        statistics.search_time_ms = started.elapsed().as_millis() as u64;

        if report.timed_out {
            warn!(
                "Search on {} timed out after {}ms",
                self.problem.name(),
                statistics.search_time_ms
            );
        }

        let (plan, goal_reached) = match (report.goal, report.best) {
            (Some(plan), _) => {
                statistics.best_heuristic = Some(0.0);
                (Some(plan), true)
            }
            (None, Some((plan, score))) => {
                statistics.best_heuristic = Some(score);
                (Some(plan), false)
            }
            (None, None) => (None, false),
        };

        info!(
            "Search on {} finished: goal reached {}, {} walk(s), {} step(s) in {}ms",
            self.problem.name(),
            goal_reached,
            statistics.walks_completed,
            statistics.steps_taken,
            statistics.search_time_ms
        );

        SearchOutcome {
            plan,
            goal_reached,
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};
    use std::time::Duration;
    use strider_core::{ActionDescription, ConditionDescription};
    use strider_heuristics::HeuristicName;

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

    /// Two independent switches `p` and `q` that can be toggled on and off.
    fn switches() -> Problem {
        Problem::builder()
            .init(NONE)
            .goal(["p", "q"], NONE)
            .action(ActionDescription::new("p-on").precondition(NONE, ["p"]).effect(["p"], NONE))
            .action(ActionDescription::new("p-off").precondition(["p"], NONE).effect(NONE, ["p"]))
            .action(ActionDescription::new("q-on").precondition(NONE, ["q"]).effect(["q"], NONE))
            .action(ActionDescription::new("q-off").precondition(["q"], NONE).effect(NONE, ["q"]))
            .build()
            .unwrap()
    }

    fn search(problem: &Problem, config: &PlannerConfig, rng: &mut dyn RandomSource) -> SearchOutcome {
        let heuristic =
            WeightedHeuristic::for_problem(config.heuristic, config.heuristic_weight, problem).unwrap();
        RandomWalkSearch::new(problem, &heuristic, config)
            .run(rng, &StopSignal::never())
            .unwrap()
    }

    #[test]
    fn test_finds_single_move() {
        let problem = toy();
        let config = PlannerConfig::default().with_walks(10, 5).with_seed(1);
        let outcome = search(&problem, &config, &mut SeededRandom::seeded(1));

        assert!(outcome.is_solution());
        let plan = outcome.plan.unwrap();
        assert_eq!(plan.names(&problem), vec!["move"]);
        assert!(plan.is_solution(&problem));
        assert_eq!(outcome.statistics.walks_completed, 1);
    }

    #[test]
    fn test_no_actions_gives_empty_best_effort() {
        let problem = Problem::builder().init(["a"]).goal(["b"], NONE).build().unwrap();
        let config = PlannerConfig::default().with_walks(3, 4);
        let outcome = search(&problem, &config, &mut SeededRandom::seeded(2));

        assert!(!outcome.goal_reached);
        assert_eq!(outcome.plan, Some(Plan::empty()));
        assert_eq!(outcome.statistics.walks_completed, 3);
        assert_eq!(outcome.statistics.steps_taken, 0);
    }

    #[test]
    fn test_zero_walks() {
        let config = PlannerConfig::default().with_walks(0, 8);

        let unsolved = search(&toy(), &config, &mut SeededRandom::seeded(0));
        assert_eq!(unsolved.plan, None);
        assert!(!unsolved.goal_reached);

        let solved_problem = Problem::builder().init(["a"]).goal(["a"], NONE).build().unwrap();
        let solved = search(&solved_problem, &config, &mut SeededRandom::seeded(0));
        assert!(solved.is_solution());
        assert_eq!(solved.plan, Some(Plan::empty()));
    }

    #[test]
    fn test_same_seed_same_plan() {
        let problem = switches();
        let config = PlannerConfig::default().with_walks(20, 3);
        let first = search(&problem, &config, &mut SeededRandom::seeded(99));
        let second = search(&problem, &config, &mut SeededRandom::seeded(99));

        assert_eq!(first.plan, second.plan);
        assert_eq!(first.goal_reached, second.goal_reached);
        assert_eq!(first.statistics.steps_taken, second.statistics.steps_taken);
    }

    #[test]
    fn test_solutions_replay_to_goal() {
        let problem = switches();
        let config = PlannerConfig::default().with_walks(200, 6);
        for seed in 0..10 {
            let outcome = search(&problem, &config, &mut SeededRandom::seeded(seed));
            let plan = outcome.plan.unwrap();
            let end = plan.replay(&problem).unwrap();
            assert_eq!(problem.is_goal(&end), outcome.goal_reached);
        }
    }

    #[test]
    fn test_keeps_strictly_better_walk() {
        let problem = switches();
        // Walk length 1 from the empty state: choices are [p-on, q-on].
        // Every walk ends one switch short of the goal with the same score,
        // so the first one is kept.
        let config = PlannerConfig::default()
            .with_walks(4, 1)
            .with_heuristic(HeuristicName::GoalCount, 1.0);
        let outcome = search(&problem, &config, &mut ScriptedRandom::new(vec![1, 0, 0, 1]));

        assert!(!outcome.goal_reached);
        assert_eq!(outcome.plan.unwrap().names(&problem), vec!["q-on"]);
        assert_eq!(outcome.statistics.best_heuristic, Some(1.0));
        assert!(outcome.statistics.peak_nodes <= 4);
    }

    #[test]
    fn test_step_budget_bounds_search() {
        let problem = switches();
        // Always toggling p keeps q off, so no walk can reach the goal.
        let config = PlannerConfig {
            max_steps: Some(5),
            ..PlannerConfig::default().with_walks(100, 2)
        };
        let outcome = search(&problem, &config, &mut ScriptedRandom::new(vec![0]));

        assert!(!outcome.goal_reached);
        assert_eq!(outcome.statistics.steps_taken, 5);
        assert_eq!(outcome.statistics.walks_completed, 3);
    }

    #[test]
    fn test_budget_claims() {
        let config = PlannerConfig {
            max_steps: Some(5),
            ..PlannerConfig::default().with_walks(10, 3)
        };
        let budget = WalkBudget::new(&config);
        assert_eq!(budget.claim(), Some(3));
        budget.refund(1);
        assert_eq!(budget.claim(), Some(3));
        assert_eq!(budget.claim(), None);
    }

    #[test]
    fn test_timeout_mid_walk_keeps_trajectory() {
        // `p` can only be toggled, so the goal `q` is never reached and the
        // single walk runs until the deadline.
        let problem = Problem::builder()
            .init(NONE)
            .goal(["q"], NONE)
            .action(ActionDescription::new("p-on").precondition(NONE, ["p"]).effect(["p"], NONE))
            .action(ActionDescription::new("p-off").precondition(["p"], NONE).effect(NONE, ["p"]))
            .build()
            .unwrap();
        let config = PlannerConfig::default().with_walks(1, 1_000_000_000);
        let heuristic = WeightedHeuristic::for_problem(config.heuristic, 1.0, &problem).unwrap();
        let stop = StopSignal::with_timeout(Duration::from_millis(50));
        let outcome = RandomWalkSearch::new(&problem, &heuristic, &config)
            .run(&mut SeededRandom::seeded(8), &stop)
            .unwrap();

        assert!(outcome.statistics.timed_out);
        assert!(!outcome.goal_reached);
        assert_eq!(outcome.statistics.walks_completed, 0);
        assert_eq!(outcome.statistics.walks_interrupted, 1);

        let plan = outcome.plan.unwrap();
        assert_eq!(plan.len() as u64, outcome.statistics.steps_taken);
        assert!(plan.replay(&problem).is_ok());
    }

    #[test]
    fn test_expired_deadline_interrupts() {
        let problem = switches();
        let config = PlannerConfig::default().with_walks(1000, 8);
        let heuristic = WeightedHeuristic::for_problem(config.heuristic, 1.0, &problem).unwrap();
        let stop = StopSignal::with_timeout(Duration::ZERO);
        let outcome = RandomWalkSearch::new(&problem, &heuristic, &config)
            .run(&mut SeededRandom::seeded(5), &stop)
            .unwrap();

        assert!(outcome.statistics.timed_out);
        assert_eq!(outcome.statistics.walks_completed, 0);
        assert_eq!(outcome.plan, None);
    }
}
