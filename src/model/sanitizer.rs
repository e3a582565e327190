//! Self-erasure: strip the activating plugin's own fingerprint from a model.
//!
//! The plugin is injected into the effective model by an outside hook. If its
//! declaration or private properties survived into the generated manifest,
//! every later read of that manifest would activate it again.

use crate::model::identity::PluginIdentity;
use crate::model::project::ProjectModel;
use serde::Serialize;
use tracing::debug;

/// What a [`sanitize`] call removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub removed_plugins: usize,
    pub removed_properties: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.removed_plugins == 0 && self.removed_properties == 0
    }
}

/// Remove every plugin matching `identity` and every property under
/// `property_prefix`.
///
/// Idempotent. An empty prefix matches nothing.
pub fn sanitize(
    model: &mut ProjectModel,
    identity: &PluginIdentity,
    property_prefix: &str,
) -> SanitizeReport {
    let plugins_before = model.plugins.len();
    model.plugins.retain(|plugin| !identity.matches(plugin));

    let properties_before = model.properties.len();
    if !property_prefix.is_empty() {
        model
            .properties
            .retain(|key, _| !key.starts_with(property_prefix));
    }

    let report = SanitizeReport {
        removed_plugins: plugins_before - model.plugins.len(),
        removed_properties: properties_before - model.properties.len(),
    };

    debug!(
        artifact_id = %model.gav.artifact_id,
        removed_plugins = report.removed_plugins,
        removed_properties = report.removed_properties,
        "removed plugin and plugin properties from model"
    );

    report
}
