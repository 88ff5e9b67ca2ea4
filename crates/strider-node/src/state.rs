//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strider_planner::{PlannerConfig, SearchStatistics};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Finished solve runs.
    pub solves: Arc<RwLock<HashMap<Uuid, SolveRecord>>>,

    /// Configuration used when a request does not carry its own.
    pub config: Arc<PlannerConfig>,
}

/// Record of a finished solve run.
#[derive(Debug, Clone, Serialize)]
pub struct SolveRecord {
    pub id: Uuid,

    /// Name of the solved problem.
    pub problem: String,

    /// Whether the plan reaches the goal.
    pub goal_reached: bool,

    /// Action names of the plan, if any walk produced one.
    pub plan: Option<Vec<String>>,

    /// Summed action cost of the plan.
    pub cost: Option<f64>,

    pub statistics: SearchStatistics,

    pub created_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new application state.
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    /// Create a state with a default planner configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            solves: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    /// Store a solve record.
    pub async fn store_solve(&self, record: SolveRecord) {
        let mut solves = self.solves.write().await;
        solves.insert(record.id, record);
    }

    /// Get a solve record by ID.
    pub async fn get_solve(&self, id: Uuid) -> Option<SolveRecord> {
        let solves = self.solves.read().await;
        solves.get(&id).cloned()
    }

    /// List all solve records, oldest first.
    pub async fn list_solves(&self) -> Vec<SolveRecord> {
        let solves = self.solves.read().await;
        let mut records: Vec<SolveRecord> = solves.values().cloned().collect();
        records.sort_by_key(|record| record.created_at);
        records
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
