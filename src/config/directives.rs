use crate::error::PatchError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Property (under the private prefix) requesting promotion over the original.
pub const PROPERTY_UPDATE_POM: &str = "updatePom";
/// Property (under the private prefix) forcing parent-version rewriting.
pub const PROPERTY_FORCE_UPDATE_PARENT: &str = "forceUpdateParent";

/// Per-invocation instructions for the patch engine.
///
/// The resolved version is guaranteed non-blank by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchDirectives {
    update_original: bool,
    force_update_parent: bool,
    resolved_version: String,
}

impl PatchDirectives {
    pub fn new(resolved_version: impl Into<String>) -> Result<Self, PatchError> {
        let resolved_version = resolved_version.into();
        if resolved_version.trim().is_empty() {
            return Err(PatchError::precondition("resolved version must not be empty"));
        }
        Ok(Self {
            update_original: false,
            force_update_parent: false,
            resolved_version,
        })
    }

    /// Read the directive flags from the plugin's private model properties.
    pub fn from_properties(
        properties: &BTreeMap<String, String>,
        property_prefix: &str,
        resolved_version: impl Into<String>,
    ) -> Result<Self, PatchError> {
        let flag = |name: &str| {
            properties
                .get(&format!("{property_prefix}{name}"))
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
        };
        Ok(Self::new(resolved_version)?
            .with_update_original(flag(PROPERTY_UPDATE_POM))
            .with_force_update_parent(flag(PROPERTY_FORCE_UPDATE_PARENT)))
    }

    pub fn with_update_original(mut self, enabled: bool) -> Self {
        self.update_original = enabled;
        self
    }

    pub fn with_force_update_parent(mut self, enabled: bool) -> Self {
        self.force_update_parent = enabled;
        self
    }

    pub fn update_original(&self) -> bool {
        self.update_original
    }

    /// Carried for callers deciding whether to invoke the engine at all; the
    /// engine rewrites a present parent version regardless.
    pub fn force_update_parent(&self) -> bool {
        self.force_update_parent
    }

    pub fn resolved_version(&self) -> &str {
        &self.resolved_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;

    const PREFIX: &str = "me.qoomon.maven.gitversioning.VersioningMojo.";

    #[test]
    fn blank_version_is_a_precondition_failure() {
        for version in ["", "   "] {
            let err = PatchDirectives::new(version).unwrap_err();
            assert_eq!(err.phase(), Phase::Precondition);
            assert!(err.is_precondition());
        }
    }

    #[test]
    fn flags_default_to_false() {
        let directives = PatchDirectives::new("1.0.0").unwrap();
        assert!(!directives.update_original());
        assert!(!directives.force_update_parent());
        assert_eq!(directives.resolved_version(), "1.0.0");
    }

    #[test]
    fn from_properties_reads_prefixed_flags() {
        let mut properties = BTreeMap::new();
        properties.insert(format!("{PREFIX}updatePom"), "TRUE".to_string());
        properties.insert(format!("{PREFIX}forceUpdateParent"), "yes".to_string());
        properties.insert("updatePom".to_string(), "false".to_string());

        let directives = PatchDirectives::from_properties(&properties, PREFIX, "2.0.0").unwrap();
        assert!(directives.update_original());
        assert!(!directives.force_update_parent());
    }
}
