//! Values passed from one lane step to the next.

use serde::{Deserialize, Serialize};

use crate::models::{Configuration, Project};
use crate::signing::ProfileInfo;

/// Shared state of a single lane run.
///
/// Each slot is written by the action that produces it; a later step may
/// overwrite an earlier value. Serialized with the upper-case key names
/// downstream tooling reads (`ENTERPRISE_CONFIGURATION`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LaneContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_configuration: Option<Configuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_profile_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_team_id: Option<String>,
    /// Project as configured, with the bundle identifier override applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

impl LaneContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_configuration(&mut self, configuration: Configuration) {
        self.enterprise_configuration = Some(configuration);
    }

    pub fn publish_project(&mut self, project: Project) {
        self.project = Some(project);
    }

    pub fn publish_profile(&mut self, profile: &ProfileInfo) {
        self.provisioning_profile_name = Some(profile.name.clone());
        self.provisioning_profile_uuid = Some(profile.uuid.clone());
        self.provisioning_team_id = profile.team_id.clone();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
