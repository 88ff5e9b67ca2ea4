//! Plan validation endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use strider_core::{Plan, ProblemDescription};
use strider_planner::{Planner, RandomWalkPlanner};

use super::error_response;
use crate::state::AppState;

/// Request to check a plan against a problem.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub problem: ProblemDescription,

    /// Action names in execution order.
    pub plan: Vec<String>,
}

/// Result of a plan check.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// Every step is applicable in turn.
    pub valid: bool,
    /// The final state satisfies the goal.
    pub reaches_goal: bool,
    pub length: usize,
    pub cost: f64,
}

/// Replay a plan without searching.
pub async fn validate_plan(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, (StatusCode, String)> {
    let problem = req.problem.ground().map_err(error_response)?;
    let plan = Plan::from_names(&problem, req.plan.as_slice()).map_err(error_response)?;

    let planner = RandomWalkPlanner::with_config(state.config.as_ref().clone());
    let valid = planner.validate_plan(&plan, &problem).await.map_err(error_response)?;

    Ok(Json(ValidateResponse {
        valid,
        reaches_goal: valid && plan.is_solution(&problem),
        length: plan.len(),
        cost: plan.cost(&problem),
    }))
}
