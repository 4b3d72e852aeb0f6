//! Lane file parser.
//!
//! ```yaml
//! project:                      # optional, enables extension profiles
//!   workspace_path: App.xcworkspace
//!   project_path: App.xcodeproj
//!   info_plist_path: App/Info.plist
//!   scheme: App
//!   target: App
//!   bundle_identifier: com.example.app
//!   extensions:
//!     - target: ShareExtension
//!       bundle_identifier: com.example.app.share
//!       info_plist_path: ShareExtension/Info.plist
//! steps:
//!   - enterprise_configuration: { allow_local: false }
//!   - install_provisioning_profile: { path: certs/main.mobileprovision }
//!   - icon_banner: { text: beta }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LanekitError, Result};
use crate::models::Project;

/// A parsed lane: an optional project and the steps to run in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    /// Each step is a single-key map: `- icon_banner: { text: beta }`.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<LaneStep>,
}

/// One action invocation with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneStep {
    EnterpriseConfiguration {
        /// Fall back to an unsigned configuration outside CI.
        #[serde(default)]
        allow_local: bool,
    },
    InstallProvisioningProfile {
        path: String,
    },
    IconBanner {
        text: String,
    },
}

impl LaneStep {
    pub fn action_name(&self) -> &'static str {
        match self {
            LaneStep::EnterpriseConfiguration { .. } => "enterprise_configuration",
            LaneStep::InstallProvisioningProfile { .. } => "install_provisioning_profile",
            LaneStep::IconBanner { .. } => "icon_banner",
        }
    }
}

/// Parses and validates a YAML lane file.
pub fn parse_lane(yaml_content: &str) -> Result<Lane> {
    let lane: Lane = serde_yaml::from_str(yaml_content)
        .map_err(|e| LanekitError::LaneParse(format!("Invalid YAML: {}", e)))?;

    validate_lane(&lane)?;
    Ok(lane)
}

/// Parses a standalone project description.
pub fn parse_project(yaml_content: &str) -> Result<Project> {
    let project: Project = serde_yaml::from_str(yaml_content)
        .map_err(|e| LanekitError::LaneParse(format!("Invalid project YAML: {}", e)))?;

    project.validate()?;
    Ok(project)
}

fn validate_lane(lane: &Lane) -> Result<()> {
    if lane.steps.is_empty() {
        return Err(LanekitError::LaneParse(
            "Lane must define at least one step".to_string(),
        ));
    }

    if let Some(project) = &lane.project {
        project.validate()?;
    }

    for (i, step) in lane.steps.iter().enumerate() {
        let empty_param = match step {
            LaneStep::EnterpriseConfiguration { .. } => None,
            LaneStep::InstallProvisioningProfile { path } => {
                path.trim().is_empty().then_some("path")
            }
            LaneStep::IconBanner { text } => text.trim().is_empty().then_some("text"),
        };

        if let Some(param) = empty_param {
            return Err(LanekitError::LaneParse(format!(
                "Step {} ({}) has empty {}",
                i + 1,
                step.action_name(),
                param
            )));
        }
    }

    Ok(())
}
