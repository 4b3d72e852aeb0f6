//! Signing configuration resolution.
//!
//! Turns the provisioning variables injected by the CI job into a
//! [`Configuration`]. All variables are read and validated up front; a run
//! with several unset variables fails once, naming every one of them.

use heck::ToShoutySnakeCase;
use std::collections::BTreeMap;

use crate::env::Environment;
use crate::error::{LanekitError, Result};
use crate::models::{
    Certificate, Configuration, ExportMethod, Project, ProvisioningProfile,
    RELEASE_BUILD_CONFIGURATION, SigningIdentity,
};

pub const PROVISIONING_DIR: &str = "PROVISIONING_DIR";
pub const PROVISIONING_FILE: &str = "PROVISIONING_FILE";
pub const PROVISIONING_CERTIFICATE_FILE: &str = "PROVISIONING_CERTIFICATE_FILE";
pub const PROVISIONING_NAME: &str = "PROVISIONING_NAME";
pub const PROVISIONING_CERTIFICATE_PASSWORD: &str = "PROVISIONING_CERTIFICATE_PASSWORD";
pub const PROVISIONING_BUNDLE_IDENTIFIER: &str = "PROVISIONING_BUNDLE_IDENTIFIER";
pub const ICLOUD_CONTAINER_ENVIRONMENT: &str = "ICLOUD_CONTAINER_ENVIRONMENT";

/// Name of the variable holding the profile file of an extension target.
///
/// `ShareExtension` maps to `PROVISIONING_FILE_SHARE_EXTENSION`.
pub fn extension_profile_variable(target: &str) -> String {
    format!("{}_{}", PROVISIONING_FILE, target.to_shouty_snake_case())
}

/// Provisioning variables of a CI run, quote-stripped and validated.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningEnvironment {
    pub provisioning_dir: String,
    pub provisioning_file: String,
    pub certificate_file: String,
    pub certificate_name: String,
    /// Empty when the p12 has no password.
    pub certificate_password: String,
    pub bundle_identifier_override: Option<String>,
    pub icloud_container_environment: Option<String>,
    /// Profile file per extension target.
    pub extension_files: BTreeMap<String, String>,
}

impl std::fmt::Debug for SigningEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningEnvironment")
            .field("provisioning_dir", &self.provisioning_dir)
            .field("provisioning_file", &self.provisioning_file)
            .field("certificate_file", &self.certificate_file)
            .field("certificate_name", &self.certificate_name)
            .field("certificate_password", &"[REDACTED]")
            .field("bundle_identifier_override", &self.bundle_identifier_override)
            .field("icloud_container_environment", &self.icloud_container_environment)
            .field("extension_files", &self.extension_files)
            .finish()
    }
}

impl SigningEnvironment {
    /// Reads the variables for an app without extensions.
    pub fn from_env(env: &Environment) -> Result<Self> {
        Self::load(env, std::iter::empty())
    }

    /// Reads the variables for a project, including one profile per extension.
    pub fn for_project(env: &Environment, project: &Project) -> Result<Self> {
        Self::load(env, project.extension_targets())
    }

    fn load<'a>(env: &Environment, extensions: impl Iterator<Item = &'a str>) -> Result<Self> {
        let mut missing = Vec::new();

        let provisioning_dir = env.require(PROVISIONING_DIR, &mut missing);
        let provisioning_file = env.require(PROVISIONING_FILE, &mut missing);
        let certificate_file = env.require(PROVISIONING_CERTIFICATE_FILE, &mut missing);
        let certificate_name = env.require(PROVISIONING_NAME, &mut missing);

        let extension_files = extensions
            .map(|target| {
                let file = env.require(&extension_profile_variable(target), &mut missing);
                (target.to_string(), file)
            })
            .collect();

        if !missing.is_empty() {
            return Err(LanekitError::MissingEnvironmentVariables(missing));
        }

        Ok(Self {
            provisioning_dir,
            provisioning_file,
            certificate_file,
            certificate_name,
            certificate_password: env
                .get(PROVISIONING_CERTIFICATE_PASSWORD)
                .unwrap_or_default()
                .to_string(),
            bundle_identifier_override: env
                .get(PROVISIONING_BUNDLE_IDENTIFIER)
                .map(str::to_string),
            icloud_container_environment: env
                .get(ICLOUD_CONTAINER_ENVIRONMENT)
                .map(str::to_string),
            extension_files,
        })
    }

    /// Path of a file inside the provisioning directory.
    pub fn path_of(&self, file: &str) -> String {
        format!("{}/{}", self.provisioning_dir.trim_end_matches('/'), file)
    }

    pub fn signing_identity(&self) -> SigningIdentity {
        SigningIdentity {
            certificate: Certificate {
                path: self.path_of(&self.certificate_file),
                name: self.certificate_name.clone(),
                password: self.certificate_password.clone(),
            },
            provisioning_profile: ProvisioningProfile::new(self.path_of(&self.provisioning_file)),
        }
    }
}

/// What to do when the resolver runs outside CI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalPolicy {
    /// Fail with [`LanekitError::ConfigurationUnavailable`].
    #[default]
    Fail,
    /// Return a Release/enterprise configuration without signing identity.
    Unsigned,
}

/// Resolves the enterprise signing configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigningResolver {
    policy: LocalPolicy,
}

impl SigningResolver {
    pub fn new(policy: LocalPolicy) -> Self {
        Self { policy }
    }

    /// Either the Jenkins marker or the host detection suffices.
    pub fn is_ci(env: &Environment, host_ci: bool) -> bool {
        env.is_jenkins() || host_ci
    }

    /// Resolves the configuration of an app without extensions.
    pub fn resolve(&self, env: &Environment, host_ci: bool) -> Result<Configuration> {
        if !Self::is_ci(env, host_ci) {
            return self.resolve_local();
        }

        let signing_env = SigningEnvironment::from_env(env)?;
        Ok(Self::assemble(&signing_env))
    }

    /// Resolves the configuration of a project, with one profile per extension.
    ///
    /// The result is validated against the project before it is returned.
    pub fn resolve_for_project(
        &self,
        env: &Environment,
        host_ci: bool,
        project: &Project,
    ) -> Result<Configuration> {
        project.validate()?;

        let configuration = if Self::is_ci(env, host_ci) {
            let signing_env = SigningEnvironment::for_project(env, project)?;
            signing_env
                .extension_files
                .iter()
                .fold(Self::assemble(&signing_env), |config, (target, file)| {
                    config.with_extension_profile(
                        target.clone(),
                        ProvisioningProfile::new(signing_env.path_of(file)),
                    )
                })
        } else {
            self.resolve_local()?
        };

        configuration.validate_for(project)?;
        Ok(configuration)
    }

    fn resolve_local(&self) -> Result<Configuration> {
        match self.policy {
            LocalPolicy::Fail => Err(LanekitError::ConfigurationUnavailable),
            LocalPolicy::Unsigned => {
                tracing::warn!("Not running on CI, using an unsigned configuration");
                Ok(Configuration::unsigned(
                    RELEASE_BUILD_CONFIGURATION,
                    ExportMethod::Enterprise,
                ))
            }
        }
    }

    fn assemble(signing_env: &SigningEnvironment) -> Configuration {
        tracing::debug!(
            "Resolved signing identity '{}' from {}",
            signing_env.certificate_name,
            signing_env.provisioning_dir
        );

        Configuration::signed(
            signing_env.signing_identity(),
            RELEASE_BUILD_CONFIGURATION,
            ExportMethod::Enterprise,
        )
        .with_bundle_identifier_override(signing_env.bundle_identifier_override.clone())
        .with_icloud_container_environment(signing_env.icloud_container_environment.clone())
    }
}
