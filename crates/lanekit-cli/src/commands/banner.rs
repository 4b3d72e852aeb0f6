use std::path::Path;

use anyhow::{Context, Result};
use lanekit_core::Environment;
use lanekit_core::actions::icon_banner;
use lanekit_core::pipeline::ShellRunner;

pub async fn handle_icon_banner(
    text: Option<String>,
    env: &Environment,
    working_dir: &Path,
) -> Result<()> {
    icon_banner::run(text.as_deref(), env, working_dir, &ShellRunner::new())
        .await
        .context("Failed to generate icon banner")
}
