//! Solve a problem description from a JSON file and print the plan.
//!
//! Usage: `strider-solve <problem.json> [config.json]`

use std::time::Instant;

use anyhow::{bail, Context};
use strider_core::ProblemDescription;
use strider_planner::{PlannerConfig, RandomWalkPlanner};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> anyhow::Result<()> {
    let started = Instant::now();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = std::env::args().skip(1);
    let Some(problem_path) = args.next() else {
        bail!("usage: strider-solve <problem.json> [config.json]");
    };

    let text = std::fs::read_to_string(&problem_path)
        .with_context(|| format!("failed to read {}", problem_path))?;
    let description: ProblemDescription =
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", problem_path))?;
    let problem = description.ground()?;

    let config = match args.next() {
        Some(config_path) => {
            let text = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path))?;
            serde_json::from_str::<PlannerConfig>(&text)
                .with_context(|| format!("failed to parse {}", config_path))?
        }
        None => PlannerConfig::default(),
    };

    let outcome = RandomWalkPlanner::with_config(config).solve(&problem)?;
    let statistics = &outcome.statistics;

    match &outcome.plan {
        Some(plan) => {
            if !outcome.goal_reached {
                println!("No solution found, best-effort plan:");
            }
            for (index, name) in plan.names(&problem).iter().enumerate() {
                println!("{:02}: ({})", index, name);
            }
            println!("Plan length: {} action(s)", plan.len());
        }
        None => {
            println!("No plan found");
            println!("Plan length: 0 action(s)");
        }
    }
    println!(
        "Time spent: {} ms searching, {} walk(s), {} step(s)",
        statistics.search_time_ms, statistics.walks_completed, statistics.steps_taken
    );
    println!("Total time: {} ms", started.elapsed().as_millis());
    println!(
        "Memory used: {:.2} MB",
        statistics.memory_bytes as f64 / (1024.0 * 1024.0)
    );

    Ok(())
}
