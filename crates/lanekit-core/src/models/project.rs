//! Xcode project description.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LanekitError, Result};
use crate::signing::extension_profile_variable;

/// A secondary signable bundle embedded in the main app (share extension,
/// widget, notification service, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppExtension {
    /// Xcode target name; also the key of its provisioning profile.
    pub target: String,
    pub bundle_identifier: String,
    pub info_plist_path: String,
}

/// The app being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub workspace_path: String,
    pub project_path: String,
    pub info_plist_path: String,
    pub scheme: String,
    pub target: String,
    /// Bundle identifier of the main app. Replaced when a configuration
    /// carries an override.
    pub bundle_identifier: String,
    #[serde(default)]
    pub extensions: Vec<AppExtension>,
}

impl Project {
    /// Target names of the declared extensions, in declaration order.
    pub fn extension_targets(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|ext| ext.target.as_str())
    }

    /// Replaces the bundle identifier, returning the previous one.
    pub fn override_bundle_identifier(&mut self, bundle_identifier: impl Into<String>) -> String {
        std::mem::replace(&mut self.bundle_identifier, bundle_identifier.into())
    }

    /// Checks the fields a build cannot do without.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("scheme", &self.scheme),
            ("target", &self.target),
            ("bundle_identifier", &self.bundle_identifier),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(LanekitError::InvalidConfiguration(format!(
                    "Project {} must not be empty",
                    field
                )));
            }
        }

        if self.workspace_path.trim().is_empty() && self.project_path.trim().is_empty() {
            return Err(LanekitError::InvalidConfiguration(
                "Project needs a workspace_path or a project_path".to_string(),
            ));
        }

        // Distinct targets may still share a profile variable, e.g.
        // `ShareExtension` and `Share Extension`.
        let mut variables: HashMap<String, &str> = HashMap::new();
        for ext in &self.extensions {
            if ext.target.trim().is_empty() {
                return Err(LanekitError::InvalidConfiguration(
                    "Extension target must not be empty".to_string(),
                ));
            }
            let variable = extension_profile_variable(&ext.target);
            if let Some(previous) = variables.insert(variable.clone(), &ext.target) {
                return Err(LanekitError::InvalidConfiguration(if previous == ext.target {
                    format!("Extension '{}' is declared more than once", ext.target)
                } else {
                    format!(
                        "Extensions '{}' and '{}' both read their profile from {}",
                        previous, ext.target, variable
                    )
                }));
            }
        }

        Ok(())
    }
}

/// Project fixture shared by model and action tests.
#[cfg(test)]
pub(crate) fn sample_project(extensions: &[&str]) -> Project {
    Project {
        workspace_path: "App.xcworkspace".to_string(),
        project_path: "App.xcodeproj".to_string(),
        info_plist_path: "App/Info.plist".to_string(),
        scheme: "App".to_string(),
        target: "App".to_string(),
        bundle_identifier: "com.example.app".to_string(),
        extensions: extensions
            .iter()
            .map(|target| AppExtension {
                target: target.to_string(),
                bundle_identifier: format!("com.example.app.{}", target.to_lowercase()),
                info_plist_path: format!("{}/Info.plist", target),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_targets_keep_order() {
        let project = sample_project(&["ShareExtension", "WidgetExtension"]);
        let targets: Vec<_> = project.extension_targets().collect();
        assert_eq!(targets, vec!["ShareExtension", "WidgetExtension"]);
    }

    #[test]
    fn test_override_bundle_identifier() {
        let mut project = sample_project(&[]);
        let previous = project.override_bundle_identifier("com.example.beta");
        assert_eq!(previous, "com.example.app");
        assert_eq!(project.bundle_identifier, "com.example.beta");
    }

    #[test]
    fn test_validate_rejects_duplicate_extension() {
        let project = sample_project(&["ShareExtension", "ShareExtension"]);
        let err = project.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_validate_rejects_colliding_profile_variables() {
        let project = sample_project(&["ShareExtension", "Share Extension"]);
        let err = project.validate().unwrap_err();
        assert!(
            err.to_string()
                .contains("'ShareExtension' and 'Share Extension' both read their profile from PROVISIONING_FILE_SHARE_EXTENSION"),
            "{}",
            err
        );
    }

    #[test]
    fn test_validate_requires_workspace_or_project() {
        let mut project = sample_project(&[]);
        assert!(project.validate().is_ok());

        project.workspace_path.clear();
        assert!(project.validate().is_ok());

        project.project_path.clear();
        assert!(project.validate().is_err());
    }

    #[test]
    fn test_deserialize_without_extensions() {
        let yaml = r#"
workspace_path: App.xcworkspace
project_path: App.xcodeproj
info_plist_path: App/Info.plist
scheme: App
target: App
bundle_identifier: com.example.app
"#;
        let project: Project = serde_yaml::from_str(yaml).unwrap();
        assert!(project.extensions.is_empty());
        assert_eq!(project.scheme, "App");
    }
}
