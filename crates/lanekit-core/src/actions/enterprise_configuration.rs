//! `enterprise_configuration`: resolves the enterprise signing configuration
//! and publishes it as `ENTERPRISE_CONFIGURATION`.

use crate::env::Environment;
use crate::error::Result;
use crate::models::{Configuration, Project};
use crate::pipeline::LaneContext;
use crate::signing::{LocalPolicy, SigningResolver};

/// Parameters of the action.
#[derive(Debug, Clone, Default)]
pub struct EnterpriseConfigurationParams<'a> {
    pub local_policy: LocalPolicy,
    /// When set, one profile per extension is resolved and validated.
    pub project: Option<&'a Project>,
}

/// Resolves the configuration, stores it in the context and returns it.
pub fn run(
    env: &Environment,
    host_ci: bool,
    params: &EnterpriseConfigurationParams<'_>,
    context: &mut LaneContext,
) -> Result<Configuration> {
    let resolver = SigningResolver::new(params.local_policy);

    let configuration = match params.project {
        Some(project) => resolver.resolve_for_project(env, host_ci, project)?,
        None => resolver.resolve(env, host_ci)?,
    };

    match configuration.certificate() {
        Some(certificate) => tracing::info!(
            "Enterprise configuration ready: signing as '{}' ({} extension profiles)",
            certificate.name,
            configuration.extension_provisioning_profiles.len()
        ),
        None => tracing::info!("Enterprise configuration ready: unsigned"),
    }

    if let Some(project) = params.project {
        let mut project = project.clone();
        configuration.apply_to(&mut project);
        tracing::info!("Bundle identifier: {}", project.bundle_identifier);
        context.publish_project(project);
    }

    context.publish_configuration(configuration.clone());
    Ok(configuration)
}
