//! Printing of the lane context.

use anyhow::Result;
use lanekit_core::models::Configuration;
use lanekit_core::pipeline::LaneContext;

pub fn print_context(context: &LaneContext, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(context)?);
        return Ok(());
    }

    if context.is_empty() {
        return Ok(());
    }

    if let Some(configuration) = &context.enterprise_configuration {
        print_configuration(configuration);
    }

    if let Some(project) = &context.project {
        println!("{:<26} {}", "Bundle identifier:", project.bundle_identifier);
    }

    let profile_values = [
        ("PROVISIONING_PROFILE_NAME", &context.provisioning_profile_name),
        ("PROVISIONING_PROFILE_UUID", &context.provisioning_profile_uuid),
        ("PROVISIONING_TEAM_ID", &context.provisioning_team_id),
    ];
    for (key, value) in profile_values {
        if let Some(value) = value {
            println!("{:<26} {}", format!("{}:", key), value);
        }
    }

    Ok(())
}

fn print_configuration(configuration: &Configuration) {
    println!("ENTERPRISE_CONFIGURATION");
    println!("  Build configuration:  {}", configuration.build_configuration);
    println!("  Export method:        {}", configuration.export_method);

    match configuration.signing() {
        Some(signing) => {
            println!(
                "  Certificate:          {} ({})",
                signing.certificate.name, signing.certificate.path
            );
            println!(
                "  Provisioning profile: {}",
                signing.provisioning_profile.path
            );
        }
        None => println!("  Signing:              none (unsigned)"),
    }

    if let Some(bundle_identifier) = &configuration.bundle_identifier_override {
        println!("  Bundle identifier:    {}", bundle_identifier);
    }
    if let Some(environment) = &configuration.icloud_container_environment {
        println!("  iCloud environment:   {}", environment);
    }
    for (target, profile) in &configuration.extension_provisioning_profiles {
        println!("  Extension {}: {}", target, profile.path);
    }
}
