//! Heuristic trait, strategy identifiers and the weighted wrapper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strider_core::{Condition, Problem, Result, State, StriderError};
use tracing::debug;

use crate::estimators::{
    AdjustedSumHeuristic, FastForwardHeuristic, GoalCountHeuristic, MaxHeuristic, SetLevelHeuristic,
    SumHeuristic,
};

/// Estimator of the remaining distance from a state to a goal.
///
/// Values are non-negative and may be `INFINITY` when the goal looks
/// unreachable. Zero suggests, but does not guarantee, that the goal holds.
pub trait HeuristicEstimator: Send + Sync {
    /// Strategy implemented by this estimator.
    fn name(&self) -> HeuristicName;

    /// Estimate the distance from `state` to `goal`.
    fn estimate(&self, state: &State, goal: &Condition) -> f64;
}

/// Identifier of a heuristic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeuristicName {
    /// Cost of a relaxed plan extracted from `h_add` supporters.
    #[default]
    FastForward,
    /// Most expensive goal under the delete relaxation.
    Max,
    /// Sum of goal costs under the delete relaxation.
    Sum,
    /// Additive estimate over relaxed planning graph levels.
    #[serde(alias = "AJUSTED_SUM")]
    AdjustedSum,
    /// First relaxed planning graph level holding every goal.
    SetLevel,
    /// Number of unsatisfied goal literals.
    GoalCount,
    #[serde(alias = "AJUSTED_SUM2")]
    AdjustedSum2,
    #[serde(rename = "ADJUSTED_SUM2M", alias = "AJUSTED_SUM2M")]
    AdjustedSum2M,
    Combo,
    SumMutex,
}

impl HeuristicName {
    /// Every identifier, supported or not.
    pub const ALL: [HeuristicName; 10] = [
        HeuristicName::FastForward,
        HeuristicName::Max,
        HeuristicName::Sum,
        HeuristicName::AdjustedSum,
        HeuristicName::SetLevel,
        HeuristicName::GoalCount,
        HeuristicName::AdjustedSum2,
        HeuristicName::AdjustedSum2M,
        HeuristicName::Combo,
        HeuristicName::SumMutex,
    ];

    /// Returns true if an estimator exists for this identifier.
    ///
    /// The remaining identifiers need mutex reasoning over the planning
    /// graph, which the delete relaxation here does not compute.
    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            HeuristicName::AdjustedSum2
                | HeuristicName::AdjustedSum2M
                | HeuristicName::Combo
                | HeuristicName::SumMutex
        )
    }

    /// The identifier as accepted on input.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeuristicName::FastForward => "FAST_FORWARD",
            HeuristicName::Max => "MAX",
            HeuristicName::Sum => "SUM",
            HeuristicName::AdjustedSum => "ADJUSTED_SUM",
            HeuristicName::SetLevel => "SET_LEVEL",
            HeuristicName::GoalCount => "GOAL_COUNT",
            HeuristicName::AdjustedSum2 => "ADJUSTED_SUM2",
            HeuristicName::AdjustedSum2M => "ADJUSTED_SUM2M",
            HeuristicName::Combo => "COMBO",
            HeuristicName::SumMutex => "SUM_MUTEX",
        }
    }
}

impl fmt::Display for HeuristicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeuristicName {
    type Err = StriderError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        let name = match normalized.as_str() {
            "FAST_FORWARD" | "FF" => HeuristicName::FastForward,
            "MAX" => HeuristicName::Max,
            "SUM" => HeuristicName::Sum,
            "ADJUSTED_SUM" | "AJUSTED_SUM" => HeuristicName::AdjustedSum,
            "SET_LEVEL" => HeuristicName::SetLevel,
            "GOAL_COUNT" => HeuristicName::GoalCount,
            "ADJUSTED_SUM2" | "AJUSTED_SUM2" => HeuristicName::AdjustedSum2,
            "ADJUSTED_SUM2M" | "AJUSTED_SUM2M" => HeuristicName::AdjustedSum2M,
            "COMBO" => HeuristicName::Combo,
            "SUM_MUTEX" => HeuristicName::SumMutex,
            _ => {
                return Err(StriderError::configuration(format!(
                    "unknown heuristic identifier {s}"
                )))
            }
        };
        Ok(name)
    }
}

/// Build the estimator for `name` over `problem`.
///
/// Fails with a configuration error for identifiers without an estimator.
pub fn build(name: HeuristicName, problem: &Problem) -> Result<Box<dyn HeuristicEstimator>> {
    let estimator: Box<dyn HeuristicEstimator> = match name {
        HeuristicName::FastForward => Box::new(FastForwardHeuristic::new(problem)),
        HeuristicName::Max => Box::new(MaxHeuristic::new(problem)),
        HeuristicName::Sum => Box::new(SumHeuristic::new(problem)),
        HeuristicName::AdjustedSum => Box::new(AdjustedSumHeuristic::new(problem)),
        HeuristicName::SetLevel => Box::new(SetLevelHeuristic::new(problem)),
        HeuristicName::GoalCount => Box::new(GoalCountHeuristic),
        unsupported => {
            return Err(StriderError::configuration(format!(
                "heuristic {unsupported} is not supported"
            )))
        }
    };
    debug!("Built {} heuristic for problem {}", name, problem.name());
    Ok(estimator)
}

/// A heuristic whose raw estimate is scaled by a positive weight.
pub struct WeightedHeuristic {
    estimator: Box<dyn HeuristicEstimator>,
    weight: f64,
}

impl WeightedHeuristic {
    /// Wrap an estimator; the weight must be finite and strictly positive.
    pub fn new(estimator: Box<dyn HeuristicEstimator>, weight: f64) -> Result<Self> {
        validate_weight(weight)?;
        Ok(Self { estimator, weight })
    }

    /// Select, build and weight an estimator for `problem`.
    pub fn for_problem(name: HeuristicName, weight: f64, problem: &Problem) -> Result<Self> {
        validate_weight(weight)?;
        Self::new(build(name, problem)?, weight)
    }

    /// Weighted estimate used to rank states.
    pub fn score(&self, state: &State, goal: &Condition) -> f64 {
        self.weight * self.estimator.estimate(state, goal)
    }

    /// The configured weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The wrapped strategy.
    pub fn name(&self) -> HeuristicName {
        self.estimator.name()
    }
}

impl fmt::Debug for WeightedHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedHeuristic")
            .field("name", &self.name())
            .field("weight", &self.weight)
            .finish()
    }
}

/// Reject weights that are not strictly positive.
pub fn validate_weight(weight: f64) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(StriderError::configuration(format!("Weight <= 0: {weight}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_core::ActionDescription;

    const NONE: [&str; 0] = [];

    fn problem() -> Problem {
        Problem::builder()
            .init(["a"])
            .goal(["b"], NONE)
            .action(ActionDescription::new("move").precondition(["a"], NONE).effect(["b"], ["a"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("FAST_FORWARD".parse::<HeuristicName>().unwrap(), HeuristicName::FastForward);
        assert_eq!("set-level".parse::<HeuristicName>().unwrap(), HeuristicName::SetLevel);
        assert_eq!("AJUSTED_SUM".parse::<HeuristicName>().unwrap(), HeuristicName::AdjustedSum);
        for name in HeuristicName::ALL {
            assert_eq!(name.as_str().parse::<HeuristicName>().unwrap(), name);
        }
    }

    #[test]
    fn test_unknown_identifier_is_configuration_error() {
        let err = "MAGIC".parse::<HeuristicName>().unwrap_err();
        assert!(matches!(err, StriderError::Configuration { .. }));
    }

    #[test]
    fn test_unsupported_identifier_rejected_at_build() {
        let problem = problem();
        let result = build(HeuristicName::SumMutex, &problem);
        assert!(matches!(result, Err(StriderError::Configuration { .. })));
    }

    #[test]
    fn test_weight_validation() {
        let problem = problem();
        assert!(WeightedHeuristic::for_problem(HeuristicName::Max, 0.0, &problem).is_err());
        assert!(WeightedHeuristic::for_problem(HeuristicName::Max, -1.5, &problem).is_err());
        assert!(WeightedHeuristic::for_problem(HeuristicName::Max, f64::NAN, &problem).is_err());
        assert!(WeightedHeuristic::for_problem(HeuristicName::Max, 2.0, &problem).is_ok());
    }

    #[test]
    fn test_weight_scales_estimate() {
        let problem = problem();
        let heuristic = WeightedHeuristic::for_problem(HeuristicName::GoalCount, 2.5, &problem).unwrap();
        assert_eq!(heuristic.score(problem.initial_state(), problem.goal()), 2.5);
        assert_eq!(heuristic.name(), HeuristicName::GoalCount);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&HeuristicName::FastForward).unwrap();
        assert_eq!(json, "\"FAST_FORWARD\"");
        let parsed: HeuristicName = serde_json::from_str("\"AJUSTED_SUM\"").unwrap();
        assert_eq!(parsed, HeuristicName::AdjustedSum);
    }
}
