//! Sequential lane execution.

use std::path::PathBuf;

use super::{Lane, LaneContext, LaneStep, ScriptRunner};
use crate::actions::{self, EnterpriseConfigurationParams};
use crate::env::Environment;
use crate::error::{LanekitError, Result};
use crate::signing::{LocalPolicy, ProfileTool};

/// Runs the steps of a lane one after another over a single context.
pub struct LaneRunner<'a> {
    env: &'a Environment,
    host_ci: bool,
    working_dir: PathBuf,
    profiles: &'a dyn ProfileTool,
    scripts: &'a dyn ScriptRunner,
}

impl<'a> LaneRunner<'a> {
    pub fn new(
        env: &'a Environment,
        host_ci: bool,
        working_dir: impl Into<PathBuf>,
        profiles: &'a dyn ProfileTool,
        scripts: &'a dyn ScriptRunner,
    ) -> Self {
        Self {
            env,
            host_ci,
            working_dir: working_dir.into(),
            profiles,
            scripts,
        }
    }

    /// Runs every step, stopping at the first failure.
    pub async fn run(&self, lane: &Lane) -> Result<LaneContext> {
        let mut context = LaneContext::new();

        for (i, step) in lane.steps.iter().enumerate() {
            let index = i + 1;
            tracing::info!("Step {}/{}: {}", index, lane.steps.len(), step.action_name());

            self.run_step(lane, step, &mut context)
                .await
                .map_err(|e| LanekitError::StepFailed {
                    index,
                    action: step.action_name(),
                    source: Box::new(e),
                })?;
        }

        Ok(context)
    }

    async fn run_step(
        &self,
        lane: &Lane,
        step: &LaneStep,
        context: &mut LaneContext,
    ) -> Result<()> {
        match step {
            LaneStep::EnterpriseConfiguration { allow_local } => {
                let params = EnterpriseConfigurationParams {
                    local_policy: if *allow_local {
                        LocalPolicy::Unsigned
                    } else {
                        LocalPolicy::Fail
                    },
                    project: lane.project.as_ref(),
                };
                actions::enterprise_configuration::run(self.env, self.host_ci, &params, context)?;
            }
            LaneStep::InstallProvisioningProfile { path } => {
                actions::install_provisioning_profile::run(
                    Some(path.as_str()),
                    &self.working_dir,
                    self.profiles,
                    context,
                )
                .await?;
            }
            LaneStep::IconBanner { text } => {
                actions::icon_banner::run(
                    Some(text.as_str()),
                    self.env,
                    &self.working_dir,
                    self.scripts,
                )
                .await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ScriptOutput, parse_lane};
    use crate::signing::ProfileInfo;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Hands out a profile per call without touching the filesystem.
    struct FakeProfiles {
        uuids: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl ProfileTool for FakeProfiles {
        async fn parse(&self, path: &Path) -> Result<ProfileInfo> {
            let uuid = self.uuids.lock().unwrap().remove(0);
            Ok(ProfileInfo {
                name: path.file_stem().unwrap().to_string_lossy().into_owned(),
                uuid: uuid.to_string(),
                team_id: Some("ABCDE12345".to_string()),
            })
        }

        async fn install(&self, _path: &Path, info: &ProfileInfo) -> Result<PathBuf> {
            Ok(PathBuf::from(format!("/profiles/{}.mobileprovision", info.uuid)))
        }
    }

    struct FailingScripts;

    #[async_trait]
    impl ScriptRunner for FailingScripts {
        async fn run(&self, _dir: &Path, _script: &str, _args: &[String]) -> Result<ScriptOutput> {
            Ok(ScriptOutput {
                exit_code: 2,
                stdout: String::new(),
                stderr: "no icons".to_string(),
            })
        }
    }

    fn ci_env() -> Environment {
        Environment::from_pairs([
            ("EXEC_RUNNING_ON_JENKINS", "YES"),
            ("PROVISIONING_DIR", "/opt/prov"),
            ("PROVISIONING_FILE", "main.mobileprovision"),
            ("PROVISIONING_CERTIFICATE_FILE", "cert.p12"),
            ("PROVISIONING_NAME", "Example"),
            ("script_dir", "/ci/scripts"),
        ])
    }

    #[tokio::test]
    async fn test_steps_share_context() {
        let lane = parse_lane(
            r#"
steps:
  - enterprise_configuration: {}
  - install_provisioning_profile: { path: /certs/first.mobileprovision }
  - install_provisioning_profile: { path: /certs/second.mobileprovision }
"#,
        )
        .unwrap();

        let env = ci_env();
        let profiles = FakeProfiles {
            uuids: Mutex::new(vec!["UUID-1", "UUID-2"]),
        };
        let runner = LaneRunner::new(&env, false, "/work", &profiles, &FailingScripts);

        let context = runner.run(&lane).await.unwrap();

        assert!(context.enterprise_configuration.unwrap().is_signed());
        assert_eq!(context.provisioning_profile_name.as_deref(), Some("second"));
        assert_eq!(context.provisioning_profile_uuid.as_deref(), Some("UUID-2"));
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let lane = parse_lane(
            r#"
steps:
  - enterprise_configuration: {}
  - icon_banner: { text: beta }
  - install_provisioning_profile: { path: /certs/main.mobileprovision }
"#,
        )
        .unwrap();

        let env = ci_env();
        let profiles = FakeProfiles {
            uuids: Mutex::new(vec!["UUID-1"]),
        };
        let runner = LaneRunner::new(&env, false, "/work", &profiles, &FailingScripts);

        match runner.run(&lane).await {
            Err(LanekitError::StepFailed {
                index,
                action,
                source,
            }) => {
                assert_eq!(index, 2);
                assert_eq!(action, "icon_banner");
                assert!(matches!(*source, LanekitError::ScriptFailed { exit_code: 2, .. }));
            }
            other => panic!("expected step failure, got {:?}", other),
        }
        assert_eq!(profiles.uuids.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_ci_fails_first_step() {
        let lane = parse_lane("steps:\n  - enterprise_configuration: {}\n").unwrap();
        let env = Environment::default();
        let profiles = FakeProfiles {
            uuids: Mutex::new(Vec::new()),
        };
        let runner = LaneRunner::new(&env, false, "/work", &profiles, &FailingScripts);

        let err = runner.run(&lane).await.unwrap_err();
        assert!(err.to_string().contains("Step 1 (enterprise_configuration) failed"));
    }

    #[tokio::test]
    async fn test_allow_local_yields_unsigned() {
        let lane =
            parse_lane("steps:\n  - enterprise_configuration: { allow_local: true }\n").unwrap();
        let env = Environment::default();
        let profiles = FakeProfiles {
            uuids: Mutex::new(Vec::new()),
        };
        let runner = LaneRunner::new(&env, false, "/work", &profiles, &FailingScripts);

        let context = runner.run(&lane).await.unwrap();
        assert!(!context.enterprise_configuration.unwrap().is_signed());
    }
}
