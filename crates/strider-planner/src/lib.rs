//! # Strider Planner
//!
//! Restarting random-walk search for the Strider planner.
//!
//! Each walk applies uniformly chosen applicable actions from the initial
//! state. A walk that reaches the goal ends the search; otherwise the end
//! state of every walk is scored with a weighted heuristic and the best one
//! is kept as a best-effort plan.

pub mod parallel;
pub mod planner;
pub mod random;
pub mod random_walk;
pub mod search;
pub mod trajectory;
pub mod walk;

pub use parallel::ParallelSearch;
pub use planner::{Planner, PlannerConfig, SearchOutcome, SearchStatistics};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use random_walk::RandomWalkPlanner;
pub use search::{RandomWalkSearch, WalkBudget, WalkReport};
pub use trajectory::{NodeId, TrajectoryArena, TrajectoryNode};
pub use walk::{StopSignal, WalkResult, WalkSampler};
