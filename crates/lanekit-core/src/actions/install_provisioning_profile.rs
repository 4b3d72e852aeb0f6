//! `install_provisioning_profile`: parses a local profile, publishes its
//! name, UUID and team, then installs it for Xcode.

use std::path::{Path, PathBuf};

use crate::error::{LanekitError, Result};
use crate::models::InstalledProfile;
use crate::pipeline::LaneContext;
use crate::signing::ProfileTool;

/// Environment variable the CLI reads the `path` parameter from.
pub const PATH_ENV: &str = "FL_INSTALL_PROVISIONING_PROFILE_PATH";

/// Expands `~` and resolves relative paths against `working_dir`.
pub fn expand_path(path: &str, working_dir: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());

    if expanded.is_absolute() {
        expanded
    } else {
        working_dir.join(expanded)
    }
}

pub async fn run(
    path: Option<&str>,
    working_dir: &Path,
    tool: &dyn ProfileTool,
    context: &mut LaneContext,
) -> Result<InstalledProfile> {
    let path = path
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| LanekitError::MissingParameter("path".to_string()))?;

    let profile_path = expand_path(path, working_dir);
    let info = tool.parse(&profile_path).await?;

    tracing::info!(
        "Provisioning profile \"{} ({})\" for team {} successfully parsed",
        info.name,
        info.uuid,
        info.team_id.as_deref().unwrap_or("<unknown>")
    );

    context.publish_profile(&info);

    let installed_path = tool.install(&profile_path, &info).await?;

    let installed = InstalledProfile {
        name: info.name,
        uuid: info.uuid,
        team_id: info.team_id,
        installed_path: installed_path.display().to_string(),
    };

    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{ProfileInfo, SAMPLE_PROFILE, SecurityProfileTool, parse_profile_plist};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Reads the decoded plist straight from disk instead of calling `security`.
    struct PlainPlistTool {
        inner: SecurityProfileTool,
        parsed: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl ProfileTool for PlainPlistTool {
        async fn parse(&self, path: &Path) -> Result<ProfileInfo> {
            self.parsed.lock().unwrap().push(path.to_path_buf());
            let content = tokio::fs::read(path).await?;
            parse_profile_plist(&content)
        }

        async fn install(&self, path: &Path, info: &ProfileInfo) -> Result<PathBuf> {
            self.inner.install(path, info).await
        }
    }

    #[test]
    fn test_expand_path() {
        let cwd = Path::new("/work/app");
        assert_eq!(
            expand_path("certs/a.mobileprovision", cwd),
            PathBuf::from("/work/app/certs/a.mobileprovision")
        );
        assert_eq!(
            expand_path("/abs/a.mobileprovision", cwd),
            PathBuf::from("/abs/a.mobileprovision")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/a.mobileprovision", cwd), home.join("a.mobileprovision"));
            assert_eq!(expand_path("~", cwd), home);
        }
        assert_eq!(
            expand_path("~ci/a.mobileprovision", cwd),
            PathBuf::from("/work/app/~ci/a.mobileprovision")
        );
    }

    #[tokio::test]
    async fn test_missing_path_parameter() {
        let tool = SecurityProfileTool::with_profiles_dir("/nonexistent");
        let mut context = LaneContext::new();

        for path in [None, Some(""), Some("   ")] {
            let result = run(path, Path::new("/"), &tool, &mut context).await;
            assert!(matches!(result, Err(LanekitError::MissingParameter(ref p)) if p == "path"));
        }
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_install_publishes_profile() {
        let project_dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(project_dir.path().join("certs"))
            .await
            .unwrap();
        tokio::fs::write(
            project_dir.path().join("certs/main.mobileprovision"),
            SAMPLE_PROFILE,
        )
        .await
        .unwrap();

        let profiles_dir = tempfile::tempdir().unwrap();
        let tool = PlainPlistTool {
            inner: SecurityProfileTool::with_profiles_dir(profiles_dir.path()),
            parsed: Mutex::new(Vec::new()),
        };
        let mut context = LaneContext::new();

        let installed = run(
            Some("certs/main.mobileprovision"),
            project_dir.path(),
            &tool,
            &mut context,
        )
        .await
        .unwrap();

        assert_eq!(
            tool.parsed.lock().unwrap().as_slice(),
            &[project_dir.path().join("certs/main.mobileprovision")]
        );
        assert_eq!(installed.name, "Example Enterprise");
        assert!(
            profiles_dir
                .path()
                .join("1f2e3d4c-5b6a-7980-1a2b-3c4d5e6f7a8b.mobileprovision")
                .exists()
        );
        assert_eq!(context.provisioning_profile_name.as_deref(), Some("Example Enterprise"));
        assert_eq!(
            context.provisioning_profile_uuid.as_deref(),
            Some("1f2e3d4c-5b6a-7980-1a2b-3c4d5e6f7a8b")
        );
        assert_eq!(context.provisioning_team_id.as_deref(), Some("ABCDE12345"));
    }

    #[tokio::test]
    async fn test_profile_published_before_install() {
        let project_dir = tempfile::tempdir().unwrap();
        tokio::fs::write(project_dir.path().join("main.mobileprovision"), SAMPLE_PROFILE)
            .await
            .unwrap();

        // A regular file in place of the profiles directory makes installation fail.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let tool = PlainPlistTool {
            inner: SecurityProfileTool::with_profiles_dir(blocker.path()),
            parsed: Mutex::new(Vec::new()),
        };
        let mut context = LaneContext::new();

        let result = run(
            Some("main.mobileprovision"),
            project_dir.path(),
            &tool,
            &mut context,
        )
        .await;

        assert!(matches!(result, Err(LanekitError::ProvisioningProfile(_))));
        assert_eq!(context.provisioning_profile_name.as_deref(), Some("Example Enterprise"));
        assert_eq!(context.provisioning_team_id.as_deref(), Some("ABCDE12345"));
    }

    #[tokio::test]
    async fn test_parse_failure_skips_install() {
        let project_dir = tempfile::tempdir().unwrap();
        tokio::fs::write(project_dir.path().join("broken.mobileprovision"), "garbage")
            .await
            .unwrap();

        let profiles_dir = tempfile::tempdir().unwrap();
        let tool = PlainPlistTool {
            inner: SecurityProfileTool::with_profiles_dir(profiles_dir.path().join("out")),
            parsed: Mutex::new(Vec::new()),
        };
        let mut context = LaneContext::new();

        let result = run(
            Some("broken.mobileprovision"),
            project_dir.path(),
            &tool,
            &mut context,
        )
        .await;

        assert!(matches!(result, Err(LanekitError::ProvisioningProfile(_))));
        assert!(!profiles_dir.path().join("out").exists());
        assert!(context.is_empty());
    }
}
