//! # Strider Heuristics
//!
//! Distance-to-goal estimators for the Strider planner, selected by
//! [`HeuristicName`] through [`build`] and scaled by [`WeightedHeuristic`].

pub mod estimators;
pub mod heuristic;
pub mod relaxed;

pub use estimators::{
    AdjustedSumHeuristic, FastForwardHeuristic, GoalCountHeuristic, MaxHeuristic, SetLevelHeuristic,
    SumHeuristic,
};
pub use heuristic::{build, validate_weight, HeuristicEstimator, HeuristicName, WeightedHeuristic};
pub use relaxed::RelaxedTask;
