//! Random-walk search spread over blocking worker tasks.
//!
//! Workers share one [`WalkBudget`] and one [`StopSignal`]. Each keeps its
//! own arena and random source. The first worker to reach the goal stores its
//! plan and cancels the others; otherwise the workers' best-effort plans are
//! reduced to the lowest score.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use strider_core::{Plan, Problem, Result, StriderError};
use strider_heuristics::WeightedHeuristic;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::planner::{PlannerConfig, SearchOutcome, SearchStatistics};
use crate::random::{RandomSource, SeededRandom};
use crate::search::{RandomWalkSearch, WalkBudget, WalkReport};
use crate::walk::StopSignal;

/// Parallel driver for [`RandomWalkSearch`].
pub struct ParallelSearch {
    problem: Arc<Problem>,
    heuristic: Arc<WeightedHeuristic>,
    config: PlannerConfig,
}

impl ParallelSearch {
    pub fn new(problem: Arc<Problem>, heuristic: Arc<WeightedHeuristic>, config: PlannerConfig) -> Self {
        Self {
            problem,
            heuristic,
            config,
        }
    }

    /// Run `config.workers` walk loops until one reaches the goal or the
    /// budget is spent.
    pub async fn run(&self, stop: StopSignal) -> Result<SearchOutcome> {
        let started = Instant::now();
        let mut statistics = SearchStatistics::start();
        let search = RandomWalkSearch::new(&self.problem, &self.heuristic, &self.config);
        if let Some(outcome) = search.trivial_outcome(&mut statistics) {
            return Ok(outcome);
        }

        info!(
            "Starting parallel random-walk search on {} with {} workers",
            self.problem.name(),
            self.config.workers
        );

        let budget = Arc::new(WalkBudget::new(&self.config));
        let goal_slot: Arc<Mutex<Option<Plan>>> = Arc::new(Mutex::new(None));
        let mut workers = JoinSet::new();

        for index in 0..self.config.workers {
            let problem = Arc::clone(&self.problem);
            let heuristic = Arc::clone(&self.heuristic);
            let config = self.config.clone();
            let budget = Arc::clone(&budget);
            let goal_slot = Arc::clone(&goal_slot);
            let stop = stop.clone();
            let seed = config.seed.map(|seed| seed.wrapping_add(index as u64));

            workers.spawn_blocking(move || {
                let search = RandomWalkSearch::new(&problem, &heuristic, &config);
                let mut rng = SeededRandom::from_seed(seed);
                run_worker(index, &search, &budget, &mut rng, &stop, &goal_slot)
                    .map(|report| (index, report))
            });
        }

        let mut reports = Vec::with_capacity(self.config.workers);
        while let Some(joined) = workers.join_next().await {
            let finished = joined
                .map_err(|e| StriderError::Internal(format!("walk worker failed: {}", e)))
                .and_then(|result| result);
            match finished {
                Ok(report) => reports.push(report),
                Err(e) => {
                    stop.cancel();
                    return Err(e);
                }
            }
        }
        reports.sort_by_key(|(index, _)| *index);

        let goal = goal_slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        let merged = merge_reports(goal, reports.into_iter().map(|(_, report)| report));
        Ok(search.finish(merged, statistics, started))
    }
}

/// One worker's walk loop. A worker reaching the goal stores its plan in
/// `goal_slot` unless another worker got there first, then cancels `stop`.
fn run_worker<R: RandomSource + ?Sized>(
    index: usize,
    search: &RandomWalkSearch<'_>,
    budget: &WalkBudget,
    rng: &mut R,
    stop: &StopSignal,
    goal_slot: &Mutex<Option<Plan>>,
) -> Result<WalkReport> {
    let report = search.walk_loop(budget, rng, stop)?;
    if let Some(plan) = &report.goal {
        let mut slot = goal_slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            debug!("Worker {} reached the goal first", index);
            *slot = Some(plan.clone());
        }
        stop.cancel();
    }
    Ok(report)
}

/// Sum the counters of all workers and keep the lowest-scored best-effort
/// plan. Reports must be in worker order; ties go to the earlier worker.
fn merge_reports(goal: Option<Plan>, reports: impl IntoIterator<Item = WalkReport>) -> WalkReport {
    let mut merged = WalkReport {
        goal,
        ..WalkReport::default()
    };
    for report in reports {
        merged.walks_completed += report.walks_completed;
        merged.walks_interrupted += report.walks_interrupted;
        merged.steps_taken += report.steps_taken;
        merged.peak_nodes += report.peak_nodes;
        merged.peak_bytes += report.peak_bytes;
        merged.timed_out |= report.timed_out;

        if let Some((plan, score)) = report.best {
            let improves = match &merged.best {
                Some((_, best)) => score < *best,
                None => true,
            };
            if improves {
                merged.best = Some((plan, score));
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::random::ScriptedRandom;
    use strider_core::{ActionDescription, ActionId, ConditionDescription};

    const NONE: [&str; 0] = [];

    fn toy() -> Arc<Problem> {
        Arc::new(
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
                .unwrap(),
        )
    }

    fn driver(problem: Arc<Problem>, config: PlannerConfig) -> ParallelSearch {
        let heuristic = Arc::new(
            WeightedHeuristic::for_problem(config.heuristic, config.heuristic_weight, &problem).unwrap(),
        );
        ParallelSearch::new(problem, heuristic, config)
    }

    fn report(best: Option<(Plan, f64)>, walks: usize) -> WalkReport {
        WalkReport {
            best,
            walks_completed: walks,
            steps_taken: walks as u64,
            ..WalkReport::default()
        }
    }

    #[tokio::test]
    async fn test_parallel_finds_move() {
        let problem = toy();
        let config = PlannerConfig {
            workers: 4,
            ..PlannerConfig::default().with_walks(50, 4).with_seed(3)
        };
        let outcome = driver(Arc::clone(&problem), config).run(StopSignal::never()).await.unwrap();

        assert!(outcome.is_solution());
        assert_eq!(outcome.plan.unwrap().names(&problem), vec!["move"]);
    }

    #[tokio::test]
    async fn test_parallel_respects_walk_budget() {
        let problem = Arc::new(Problem::builder().init(["a"]).goal(["b"], NONE).build().unwrap());
        let config = PlannerConfig {
            workers: 3,
            ..PlannerConfig::default().with_walks(10, 4)
        };
        let outcome = driver(problem, config).run(StopSignal::never()).await.unwrap();

        assert!(!outcome.goal_reached);
        assert_eq!(outcome.plan, Some(Plan::empty()));
        assert_eq!(outcome.statistics.walks_completed, 10);
    }

    #[tokio::test]
    async fn test_parallel_zero_walks() {
        let config = PlannerConfig {
            workers: 2,
            ..PlannerConfig::default().with_walks(0, 4)
        };
        let outcome = driver(toy(), config).run(StopSignal::never()).await.unwrap();
        assert_eq!(outcome.plan, None);
    }

    #[tokio::test]
    async fn test_parallel_timeout() {
        let config = PlannerConfig {
            workers: 2,
            ..PlannerConfig::default().with_walks(100, 4)
        };
        let stop = StopSignal::with_timeout(Duration::ZERO);
        let outcome = driver(toy(), config).run(stop).await.unwrap();
        assert!(outcome.statistics.timed_out);
        assert_eq!(outcome.plan, None);
    }

    #[tokio::test]
    async fn test_first_goal_stops_other_workers() {
        let problem = toy();
        let config = PlannerConfig {
            workers: 4,
            ..PlannerConfig::default().with_walks(100_000, 4).with_seed(21)
        };
        let outcome = driver(Arc::clone(&problem), config).run(StopSignal::never()).await.unwrap();

        assert!(outcome.is_solution());
        let walks = outcome.statistics.walks_completed + outcome.statistics.walks_interrupted;
        assert!(walks <= 4, "{} walks ran after the goal was found", walks);
        assert!(outcome.plan.unwrap().is_solution(&problem));
    }

    #[test]
    fn test_worker_goal_cancels_and_first_wins() {
        // Two switches; the goal needs both on. Scripted choices from the
        // empty state pick p-on or q-on first.
        let problem = Problem::builder()
            .init(NONE)
            .goal(["p", "q"], NONE)
            .action(ActionDescription::new("p-on").precondition(NONE, ["p"]).effect(["p"], NONE))
            .action(ActionDescription::new("q-on").precondition(NONE, ["q"]).effect(["q"], NONE))
            .build()
            .unwrap();
        let config = PlannerConfig::default().with_walks(10, 2);
        let heuristic =
            WeightedHeuristic::for_problem(config.heuristic, config.heuristic_weight, &problem).unwrap();
        let search = RandomWalkSearch::new(&problem, &heuristic, &config);
        let budget = WalkBudget::new(&config);
        let goal_slot = Mutex::new(None);

        let stop = StopSignal::never();
        let first = run_worker(0, &search, &budget, &mut ScriptedRandom::new(vec![0]), &stop, &goal_slot).unwrap();
        assert!(first.goal.is_some());
        assert!(stop.is_cancelled());

        // A worker sharing the cancelled signal runs no further walks.
        let idle = run_worker(1, &search, &budget, &mut ScriptedRandom::new(vec![1]), &stop, &goal_slot).unwrap();
        assert_eq!(idle.walks_completed + idle.walks_interrupted, 0);

        // A later goal does not replace the stored one.
        let late_stop = StopSignal::never();
        let late = run_worker(2, &search, &budget, &mut ScriptedRandom::new(vec![1]), &late_stop, &goal_slot).unwrap();
        assert!(late.goal.is_some());

        let stored = goal_slot.lock().unwrap().clone().unwrap();
        assert_eq!(stored.names(&problem), vec!["p-on", "q-on"]);
        assert_eq!(late.goal.unwrap().names(&problem), vec!["q-on", "p-on"]);
    }

    #[test]
    fn test_merge_keeps_lowest_score() {
        let first = Plan::new(vec![ActionId(0)]);
        let second = Plan::new(vec![ActionId(1)]);
        let third = Plan::new(vec![ActionId(2)]);
        let merged = merge_reports(
            None,
            [
                report(Some((first, 3.0)), 2),
                report(Some((second.clone(), 1.0)), 2),
                report(Some((third, 1.0)), 1),
                report(None, 0),
            ],
        );

        assert_eq!(merged.best, Some((second, 1.0)));
        assert_eq!(merged.walks_completed, 5);
        assert_eq!(merged.steps_taken, 5);
        assert!(merged.goal.is_none());
    }
}
