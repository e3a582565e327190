use crate::model::PluginIdentity;
use serde::Deserialize;
use thiserror::Error;

/// Fully-qualified name of the activating component; its private property
/// namespace is this name plus a trailing `.`.
pub const DEFAULT_COMPONENT_NAME: &str = "me.qoomon.maven.gitversioning.VersioningMojo";

/// File name of the generated manifest inside the build directory.
pub const DEFAULT_SIDECAR_NAME: &str = ".git-versioned-pom.xml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default)]
    pub plugin: PluginIdentity,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSettings {
    pub component_name: String,
    pub sidecar_name: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            sidecar_name: DEFAULT_SIDECAR_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn property_prefix(&self) -> String {
        format!("{}.", self.engine.component_name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let required = [
            ("plugin.group_id", &self.plugin.group_id),
            ("plugin.artifact_id", &self.plugin.artifact_id),
            ("plugin.version", &self.plugin.version),
            ("engine.component_name", &self.engine.component_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::MissingField { field });
            }
        }

        let sidecar = self.engine.sidecar_name.as_str();
        if sidecar.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "engine.sidecar_name",
            });
        } else if sidecar == "." || sidecar == ".." || sidecar.contains(['/', '\\']) {
            issues.push(ValidationIssue::InvalidSidecarName {
                name: sidecar.to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Error, Debug, Clone)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("sidecar_name '{name}' must be a plain file name")]
    InvalidSidecarName { name: String },
}
