use crate::model::project::Plugin;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinates of the activating build plugin.
///
/// Supplied through configuration rather than compiled in, so the patcher
/// can recognise whichever plugin release injected it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginIdentity {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Default for PluginIdentity {
    fn default() -> Self {
        Self {
            group_id: "me.qoomon".to_string(),
            artifact_id: "git-versioning-maven-plugin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl PluginIdentity {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Plugin declaration equivalent to this identity.
    pub fn as_plugin(&self) -> Plugin {
        Plugin {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: Some(self.version.clone()),
        }
    }

    /// Same plugin key (groupId and artifactId); versions are not compared.
    pub fn matches(&self, plugin: &Plugin) -> bool {
        plugin.group_id == self.group_id && plugin.artifact_id == self.artifact_id
    }
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
