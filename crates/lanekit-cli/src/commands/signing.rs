//! Signing commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lanekit_core::Environment;
use lanekit_core::actions::{
    EnterpriseConfigurationParams, enterprise_configuration, install_provisioning_profile,
};
use lanekit_core::pipeline::{LaneContext, parse_project};
use lanekit_core::signing::{LocalPolicy, SecurityProfileTool};

pub fn handle_enterprise_configuration(
    env: &Environment,
    host_ci: bool,
    allow_local: bool,
    project_file: Option<PathBuf>,
    context: &mut LaneContext,
) -> Result<()> {
    let project = match project_file {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let project = parse_project(&content)
                .with_context(|| format!("Invalid project {}", path.display()))?;
            Some(project)
        }
        None => None,
    };

    let params = EnterpriseConfigurationParams {
        local_policy: if allow_local {
            LocalPolicy::Unsigned
        } else {
            LocalPolicy::Fail
        },
        project: project.as_ref(),
    };

    enterprise_configuration::run(env, host_ci, &params, context)
        .context("Failed to resolve enterprise configuration")?;
    Ok(())
}

pub async fn handle_install_provisioning_profile(
    path: Option<String>,
    working_dir: &Path,
    context: &mut LaneContext,
) -> Result<()> {
    let tool = SecurityProfileTool::new()?;

    install_provisioning_profile::run(path.as_deref(), working_dir, &tool, context)
        .await
        .context("Failed to install provisioning profile")?;
    Ok(())
}
