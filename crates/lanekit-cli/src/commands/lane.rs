//! Lane file execution.

use std::path::Path;

use anyhow::{Context, Result};
use lanekit_core::Environment;
use lanekit_core::pipeline::{LaneContext, LaneRunner, ShellRunner, parse_lane};
use lanekit_core::signing::SecurityProfileTool;

pub async fn handle_lane(
    file: &Path,
    env: &Environment,
    host_ci: bool,
    working_dir: &Path,
) -> Result<LaneContext> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let lane = parse_lane(&content).with_context(|| format!("Invalid lane {}", file.display()))?;

    let profiles = SecurityProfileTool::new()?;
    let scripts = ShellRunner::new();
    let runner = LaneRunner::new(env, host_ci, working_dir, &profiles, &scripts);

    tracing::info!("Running lane {} ({} steps)", file.display(), lane.steps.len());

    runner
        .run(&lane)
        .await
        .with_context(|| format!("Lane {} failed", file.display()))
}
