//! Solve API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use strider_core::ProblemDescription;
use strider_heuristics::HeuristicName;
use strider_planner::{Planner, PlannerConfig, RandomWalkPlanner};
use tracing::info;
use uuid::Uuid;

use super::error_response;
use crate::state::{AppState, SolveRecord};

/// Request to solve a problem.
#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    /// The problem, with fluents and actions referenced by name.
    pub problem: ProblemDescription,

    /// Planner configuration; the node default is used when absent.
    #[serde(default)]
    pub config: Option<PlannerConfig>,

    /// Heuristic identifier overriding the configured one.
    #[serde(default)]
    pub heuristic: Option<String>,
}

/// Solve a problem and store the result.
pub async fn submit_solve(
    State(state): State<AppState>,
    Json(req): Json<SolveRequest>,
) -> Result<(StatusCode, Json<SolveRecord>), (StatusCode, String)> {
    let problem = Arc::new(req.problem.ground().map_err(error_response)?);

    let mut config = req.config.unwrap_or_else(|| state.config.as_ref().clone());
    if let Some(name) = req.heuristic {
        config.heuristic = name.parse::<HeuristicName>().map_err(error_response)?;
    }

    let planner = RandomWalkPlanner::with_config(config);
    let outcome = planner.plan(Arc::clone(&problem)).await.map_err(error_response)?;

    let record = SolveRecord {
        id: Uuid::new_v4(),
        problem: problem.name().to_string(),
        goal_reached: outcome.goal_reached,
        plan: outcome
            .plan
            .as_ref()
            .map(|plan| plan.names(&problem).into_iter().map(str::to_string).collect()),
        cost: outcome.plan.as_ref().map(|plan| plan.cost(&problem)),
        statistics: outcome.statistics,
        created_at: Utc::now(),
    };

    info!(
        "Solve {} for {} finished: goal reached {}",
        record.id, record.problem, record.goal_reached
    );
    state.store_solve(record.clone()).await;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a solve record by ID.
pub async fn get_solve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SolveRecord>, (StatusCode, String)> {
    let record = state
        .get_solve(id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Solve {} not found", id)))?;

    Ok(Json(record))
}

/// List all solve records.
pub async fn list_solves(State(state): State<AppState>) -> Json<Vec<SolveRecord>> {
    Json(state.list_solves().await)
}
