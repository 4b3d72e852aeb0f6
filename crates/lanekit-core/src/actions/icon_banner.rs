//! `icon_banner`: draws a text banner on the app icons with the shared
//! banner script.

use std::path::{Path, PathBuf};

use crate::env::Environment;
use crate::error::{LanekitError, Result};
use crate::pipeline::ScriptRunner;

/// Environment variable the CLI reads the `text` parameter from.
pub const TEXT_ENV: &str = "FL_ICON_BANNER_TEXT";

/// Directory containing `utils/generate-banner-icons.sh`.
pub const SCRIPT_DIR_ENV: &str = "script_dir";

const BANNER_SCRIPT: &str =
    r#"source utils/generate-banner-icons.sh && generate_ios_banner_icons "$1" "$2""#;

/// Generates banner icons for the project in `PWD` (or `working_dir`).
pub async fn run(
    text: Option<&str>,
    env: &Environment,
    working_dir: &Path,
    runner: &dyn ScriptRunner,
) -> Result<()> {
    let text = text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| LanekitError::MissingParameter("text".to_string()))?;

    let script_dir = env.get(SCRIPT_DIR_ENV).ok_or_else(|| {
        LanekitError::MissingEnvironmentVariables(vec![SCRIPT_DIR_ENV.to_string()])
    })?;

    let project_dir = env
        .get("PWD")
        .map(PathBuf::from)
        .unwrap_or_else(|| working_dir.to_path_buf());

    let output = runner
        .run(
            Path::new(script_dir),
            BANNER_SCRIPT,
            &[project_dir.display().to_string(), text.to_string()],
        )
        .await?;

    if !output.success() {
        return Err(LanekitError::ScriptFailed {
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    tracing::info!("Generated icon banner '{}' for {}", text, project_dir.display());
    Ok(())
}
