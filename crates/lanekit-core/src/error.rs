//! Error types for the lanekit core library.

use thiserror::Error;

/// Core error type for lanekit actions.
///
/// Every variant is fatal to the current lane run.
#[derive(Error, Debug)]
pub enum LanekitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Signing configuration unavailable: not running on a CI server")]
    ConfigurationUnavailable,

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingEnvironmentVariables(Vec<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "Extension provisioning profiles do not match project extensions (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    ExtensionProfileMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Provisioning profile error: {0}")]
    ProvisioningProfile(String),

    #[error("Script exited with code {exit_code}: {stderr}")]
    ScriptFailed { exit_code: i32, stderr: String },

    #[error("Lane parse error: {0}")]
    LaneParse(String),

    #[error("Step {index} ({action}) failed: {source}")]
    StepFailed {
        index: usize,
        action: &'static str,
        #[source]
        source: Box<LanekitError>,
    },
}

/// Result type alias for lanekit operations.
pub type Result<T> = std::result::Result<T, LanekitError>;
