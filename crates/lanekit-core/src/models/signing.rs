//! iOS code signing models.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Project;
use crate::error::{LanekitError, Result};

// ============================================================================
// Certificate and provisioning profile
// ============================================================================

/// A p12 signing certificate on disk.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub path: String,
    /// Keychain display name of the signing identity.
    pub name: String,
    /// Unlock password of the p12. Never serialized.
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A mobileprovision file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningProfile {
    pub path: String,
}

impl ProvisioningProfile {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Certificate and primary provisioning profile, always resolved together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningIdentity {
    pub certificate: Certificate,
    pub provisioning_profile: ProvisioningProfile,
}

/// Metadata of a provisioning profile that was installed on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledProfile {
    pub name: String,
    pub uuid: String,
    pub team_id: Option<String>,
    pub installed_path: String,
}

// ============================================================================
// Export method
// ============================================================================

/// Distribution method passed to the archive export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMethod {
    AppStore,
    AdHoc,
    Enterprise,
    Development,
}

impl ExportMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMethod::AppStore => "app-store",
            ExportMethod::AdHoc => "ad-hoc",
            ExportMethod::Enterprise => "enterprise",
            ExportMethod::Development => "development",
        }
    }
}

impl std::fmt::Display for ExportMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Build configuration name used for signed distribution builds.
pub const RELEASE_BUILD_CONFIGURATION: &str = "Release";

/// Everything a build step needs to sign and export the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    signing: Option<SigningIdentity>,
    pub build_configuration: String,
    pub export_method: ExportMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_identifier_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icloud_container_environment: Option<String>,
    /// Provisioning profile per extension target name.
    #[serde(default)]
    pub extension_provisioning_profiles: BTreeMap<String, ProvisioningProfile>,
}

impl Configuration {
    /// A configuration that signs with the given identity.
    pub fn signed(
        signing: SigningIdentity,
        build_configuration: impl Into<String>,
        export_method: ExportMethod,
    ) -> Self {
        Self::new(Some(signing), build_configuration.into(), export_method)
    }

    /// A configuration without certificate or provisioning profile.
    pub fn unsigned(build_configuration: impl Into<String>, export_method: ExportMethod) -> Self {
        Self::new(None, build_configuration.into(), export_method)
    }

    fn new(
        signing: Option<SigningIdentity>,
        build_configuration: String,
        export_method: ExportMethod,
    ) -> Self {
        Self {
            signing,
            build_configuration,
            export_method,
            bundle_identifier_override: None,
            icloud_container_environment: None,
            extension_provisioning_profiles: BTreeMap::new(),
        }
    }

    pub fn with_bundle_identifier_override(mut self, bundle_identifier: Option<String>) -> Self {
        self.bundle_identifier_override = bundle_identifier;
        self
    }

    pub fn with_icloud_container_environment(mut self, environment: Option<String>) -> Self {
        self.icloud_container_environment = environment;
        self
    }

    pub fn with_extension_profile(
        mut self,
        target: impl Into<String>,
        profile: ProvisioningProfile,
    ) -> Self {
        self.extension_provisioning_profiles
            .insert(target.into(), profile);
        self
    }

    pub fn signing(&self) -> Option<&SigningIdentity> {
        self.signing.as_ref()
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.signing.as_ref().map(|s| &s.certificate)
    }

    pub fn provisioning_profile(&self) -> Option<&ProvisioningProfile> {
        self.signing.as_ref().map(|s| &s.provisioning_profile)
    }

    pub fn is_signed(&self) -> bool {
        self.signing.is_some()
    }

    /// Swaps the primary provisioning profile, keeping the certificate.
    ///
    /// Returns the replaced profile. Fails on an unsigned configuration since
    /// a profile without a certificate cannot sign anything.
    pub fn replace_provisioning_profile(
        &mut self,
        profile: ProvisioningProfile,
    ) -> Result<ProvisioningProfile> {
        let signing = self.signing.as_mut().ok_or_else(|| {
            LanekitError::InvalidConfiguration(
                "Cannot set a provisioning profile on an unsigned configuration".to_string(),
            )
        })?;
        Ok(std::mem::replace(&mut signing.provisioning_profile, profile))
    }

    /// Applies the bundle identifier override, if any, to the project.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(bundle_identifier) = &self.bundle_identifier_override {
            project.override_bundle_identifier(bundle_identifier.clone());
        }
    }

    /// Checks that extension profiles line up with the project's extensions.
    ///
    /// A signed configuration needs exactly one profile per declared
    /// extension; an unsigned one must not carry any.
    pub fn validate_for(&self, project: &Project) -> Result<()> {
        if self.signing.is_none() {
            if !self.extension_provisioning_profiles.is_empty() {
                return Err(LanekitError::InvalidConfiguration(
                    "Unsigned configuration carries extension provisioning profiles".to_string(),
                ));
            }
            return Ok(());
        }

        let declared: BTreeSet<&str> = project.extension_targets().collect();
        let provided: BTreeSet<&str> = self
            .extension_provisioning_profiles
            .keys()
            .map(String::as_str)
            .collect();

        if declared == provided {
            return Ok(());
        }

        Err(LanekitError::ExtensionProfileMismatch {
            missing: declared
                .difference(&provided)
                .map(|s| s.to_string())
                .collect(),
            unexpected: provided
                .difference(&declared)
                .map(|s| s.to_string())
                .collect(),
        })
    }
}
