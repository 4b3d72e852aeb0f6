//! Provisioning profile decoding and installation.
//!
//! Mobileprovision files are CMS-signed plists. Decoding goes through the
//! `security` CLI on macOS; installation copies the file to the directory
//! Xcode scans for profiles, named after the profile UUID.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{LanekitError, Result};

/// Fields of a provisioning profile the lane publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub uuid: String,
    /// First entry of `TeamIdentifier`.
    pub team_id: Option<String>,
}

/// Decodes and installs provisioning profiles.
#[async_trait]
pub trait ProfileTool: Send + Sync {
    /// Reads the profile metadata from a mobileprovision file.
    async fn parse(&self, path: &Path) -> Result<ProfileInfo>;

    /// Installs the profile for Xcode, returning the installed path.
    async fn install(&self, path: &Path, info: &ProfileInfo) -> Result<PathBuf>;
}

/// [`ProfileTool`] backed by `security cms` and the user's profile directory.
#[derive(Debug, Clone)]
pub struct SecurityProfileTool {
    profiles_dir: PathBuf,
}

impl SecurityProfileTool {
    /// Uses `~/Library/MobileDevice/Provisioning Profiles`.
    pub fn new() -> Result<Self> {
        let profiles_dir = dirs::home_dir()
            .ok_or_else(|| {
                LanekitError::ProvisioningProfile("No home directory found".to_string())
            })?
            .join("Library/MobileDevice/Provisioning Profiles");
        Ok(Self::with_profiles_dir(profiles_dir))
    }

    /// Installs into a custom directory.
    pub fn with_profiles_dir(profiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
        }
    }
}

#[async_trait]
impl ProfileTool for SecurityProfileTool {
    async fn parse(&self, path: &Path) -> Result<ProfileInfo> {
        let output = Command::new("security")
            .args(["cms", "-D", "-i"])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                LanekitError::ProvisioningProfile(format!("Failed to run security cms: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LanekitError::ProvisioningProfile(format!(
                "Failed to decode {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        parse_profile_plist(&output.stdout)
    }

    async fn install(&self, path: &Path, info: &ProfileInfo) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.profiles_dir)
            .await
            .map_err(|e| {
                LanekitError::ProvisioningProfile(format!(
                    "Failed to create profiles directory: {}",
                    e
                ))
            })?;

        let installed = self
            .profiles_dir
            .join(format!("{}.mobileprovision", info.uuid));

        tokio::fs::copy(path, &installed).await.map_err(|e| {
            LanekitError::ProvisioningProfile(format!(
                "Failed to install {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!("Installed provisioning profile: {}", installed.display());

        Ok(installed)
    }
}

/// Extracts name, UUID and team from decoded profile plist content.
pub fn parse_profile_plist(content: &[u8]) -> Result<ProfileInfo> {
    let plist: plist::Value = plist::from_bytes(content).map_err(|e| {
        LanekitError::ProvisioningProfile(format!("Failed to parse profile plist: {}", e))
    })?;

    let dict = plist.as_dictionary().ok_or_else(|| {
        LanekitError::ProvisioningProfile("Profile plist is not a dictionary".to_string())
    })?;

    let uuid = dict
        .get("UUID")
        .and_then(|v| v.as_string())
        .ok_or_else(|| LanekitError::ProvisioningProfile("Profile missing UUID".to_string()))?
        .to_string();

    let name = dict
        .get("Name")
        .and_then(|v| v.as_string())
        .unwrap_or("Unnamed Profile")
        .to_string();

    let team_id = dict
        .get("TeamIdentifier")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_string())
        .map(|s| s.to_string());

    Ok(ProfileInfo {
        name,
        uuid,
        team_id,
    })
}

/// Decoded profile used by signing and action tests.
#[cfg(test)]
pub(crate) const SAMPLE_PROFILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
<key>AppIDName</key>
<string>Example App</string>
<key>Name</key>
<string>Example Enterprise</string>
<key>TeamIdentifier</key>
<array>
    <string>ABCDE12345</string>
</array>
<key>UUID</key>
<string>1f2e3d4c-5b6a-7980-1a2b-3c4d5e6f7a8b</string>
</dict>
</plist>"#;
