//! Random-walk planner facade.

use std::sync::Arc;

use async_trait::async_trait;
use strider_core::{Plan, Problem, Result, StriderError};
use strider_heuristics::WeightedHeuristic;
use tracing::debug;

use crate::parallel::ParallelSearch;
use crate::planner::{Planner, PlannerConfig, SearchOutcome};
use crate::random::{RandomSource, SeededRandom};
use crate::search::RandomWalkSearch;
use crate::walk::StopSignal;

/// Planner running restarting random walks ranked by a weighted heuristic.
#[derive(Debug, Clone, Default)]
pub struct RandomWalkPlanner {
    config: PlannerConfig,
}

impl RandomWalkPlanner {
    /// Create a new planner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new planner with custom configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Validate the configuration and the problem, then build the heuristic.
    fn prepare(&self, problem: &Problem) -> Result<WeightedHeuristic> {
        self.config.validate()?;
        problem.check_supported()?;
        WeightedHeuristic::for_problem(self.config.heuristic, self.config.heuristic_weight, problem)
    }

    /// Search on the calling thread with the configured seed.
    pub fn solve(&self, problem: &Problem) -> Result<SearchOutcome> {
        let mut rng = SeededRandom::from_seed(self.config.seed);
        self.solve_with(problem, &mut rng)
    }

    /// Search on the calling thread with a caller-provided random source.
    pub fn solve_with<R: RandomSource + ?Sized>(&self, problem: &Problem, rng: &mut R) -> Result<SearchOutcome> {
        let heuristic = self.prepare(problem)?;
        let stop = StopSignal::with_timeout(self.config.timeout());
        RandomWalkSearch::new(problem, &heuristic, &self.config).run(rng, &stop)
    }
}

#[async_trait]
impl Planner for RandomWalkPlanner {
    async fn plan(&self, problem: Arc<Problem>) -> Result<SearchOutcome> {
        let heuristic = self.prepare(&problem)?;
        let stop = StopSignal::with_timeout(self.config.timeout());

        if self.config.workers > 1 {
            return ParallelSearch::new(problem, Arc::new(heuristic), self.config.clone())
                .run(stop)
                .await;
        }

        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            let mut rng = SeededRandom::from_seed(config.seed);
            RandomWalkSearch::new(&problem, &heuristic, &config).run(&mut rng, &stop)
        })
        .await
        .map_err(|e| StriderError::Internal(format!("search task failed: {}", e)))?
    }

    async fn validate_plan(&self, plan: &Plan, problem: &Problem) -> Result<bool> {
        match plan.replay(problem) {
            Ok(_) => Ok(true),
            Err(StriderError::InvalidTransition { action, reason }) => {
                debug!("Plan step {} is not applicable: {}", action, reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn set_config(&mut self, config: PlannerConfig) {
        self.config = config;
    }
}
