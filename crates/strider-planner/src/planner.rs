//! Planner trait, configuration and search results.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strider_core::{Plan, Problem, Result, StriderError};
use strider_heuristics::{validate_weight, HeuristicName};

/// Configuration for the random-walk planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of random walks (restarts) to run.
    pub num_walks: usize,

    /// Maximum number of steps in a single walk.
    pub walk_length: usize,

    /// Optional budget of steps summed over all walks.
    pub max_steps: Option<u64>,

    /// Maximum planning time in milliseconds.
    pub timeout_ms: u64,

    /// Heuristic used to rank the end states of failed walks.
    pub heuristic: HeuristicName,

    /// Weight applied to the heuristic value (must be > 0).
    pub heuristic_weight: f64,

    /// Seed of the random source; drawn from entropy when absent.
    pub seed: Option<u64>,

    /// Number of parallel walk workers (1 runs walks sequentially).
    pub workers: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            num_walks: 1000,
            walk_length: 8,
            max_steps: None,
            timeout_ms: 600_000,
            heuristic: HeuristicName::FastForward,
            heuristic_weight: 1.0,
            seed: None,
            workers: 1,
        }
    }
}

impl PlannerConfig {
    /// Check the configuration before any search starts.
    pub fn validate(&self) -> Result<()> {
        validate_weight(self.heuristic_weight)?;
        if !self.heuristic.is_supported() {
            return Err(StriderError::configuration(format!(
                "heuristic {} is not supported",
                self.heuristic
            )));
        }
        if self.workers == 0 {
            return Err(StriderError::configuration("workers must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(StriderError::configuration("timeout must be greater than 0"));
        }
        Ok(())
    }

    /// The wall-clock budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Set the number of walks.
    pub fn with_walks(mut self, num_walks: usize, walk_length: usize) -> Self {
        self.num_walks = num_walks;
        self.walk_length = walk_length;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the heuristic and its weight.
    pub fn with_heuristic(mut self, heuristic: HeuristicName, weight: f64) -> Self {
        self.heuristic = heuristic;
        self.heuristic_weight = weight;
        self
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// When the search started.
    pub started_at: DateTime<Utc>,

    /// Walks that ran to completion.
    pub walks_completed: usize,

    /// Walks stopped by the timeout or by another worker's solution.
    pub walks_interrupted: usize,

    /// Actions applied over all walks.
    pub steps_taken: u64,

    /// Best weighted heuristic value seen at the end of a walk.
    pub best_heuristic: Option<f64>,

    /// Time spent searching in milliseconds.
    pub search_time_ms: u64,

    /// Largest number of trajectory nodes held at once.
    pub peak_nodes: usize,

    /// Estimated peak memory held by trajectories, in bytes.
    pub memory_bytes: usize,

    /// Whether the search stopped because the timeout elapsed.
    pub timed_out: bool,
}

impl SearchStatistics {
    pub(crate) fn start() -> Self {
        Self {
            started_at: Utc::now(),
            walks_completed: 0,
            walks_interrupted: 0,
            steps_taken: 0,
            best_heuristic: None,
            search_time_ms: 0,
            peak_nodes: 0,
            memory_bytes: 0,
            timed_out: false,
        }
    }
}

/// Result of a planning run.
///
/// `plan` is a genuine solution only when `goal_reached` is set; otherwise
/// it is the best-effort trajectory towards the lowest-scored state found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// The plan found, if any walk produced a trajectory.
    pub plan: Option<Plan>,

    /// Whether the plan reaches the goal.
    pub goal_reached: bool,

    /// Statistics about the search.
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    /// Returns true if the outcome carries a plan reaching the goal.
    pub fn is_solution(&self) -> bool {
        self.goal_reached && self.plan.is_some()
    }
}

/// Trait for planning engines.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Search a plan for the given problem.
    async fn plan(&self, problem: Arc<Problem>) -> Result<SearchOutcome>;

    /// Check that every step of a plan is applicable from the initial state.
    async fn validate_plan(&self, plan: &Plan, problem: &Problem) -> Result<bool>;

    /// Get the planner configuration.
    fn config(&self) -> &PlannerConfig;

    /// Update the planner configuration.
    fn set_config(&mut self, config: PlannerConfig);
}
