use crate::xml::{Element, ManifestDocument};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// groupId Maven assumes for plugin declarations that omit one.
pub const DEFAULT_PLUGIN_GROUP_ID: &str = "org.apache.maven.plugins";

/// groupId / artifactId / version triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Gav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Gav {
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
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A `<build><plugins><plugin>` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl Plugin {
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("manifest root must be <project>, found <{0}>")]
    UnexpectedRoot(String),
}

/// Typed view of a project manifest.
///
/// This is what the sanitizer mutates; the patched manifest itself is always
/// produced from the raw document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectModel {
    pub gav: Gav,
    pub parent: Option<Gav>,
    pub plugins: Vec<Plugin>,
    pub properties: BTreeMap<String, String>,
}

impl ProjectModel {
    pub fn new(gav: Gav) -> Self {
        Self {
            gav,
            ..Self::default()
        }
    }

    /// Build the model from a parsed manifest.
    ///
    /// groupId and version fall back to the parent's when the project omits
    /// them; coordinates declared nowhere are left empty. Plugins without an
    /// artifactId are ignored.
    pub fn from_document(doc: &ManifestDocument) -> Result<Self, ModelError> {
        let project = doc.root();
        if !project.is_named("project") {
            return Err(ModelError::UnexpectedRoot(project.name().to_string()));
        }

        let parent = project.child("parent").map(|parent| Gav {
            group_id: child_text(parent, "groupId").unwrap_or_default(),
            artifact_id: child_text(parent, "artifactId").unwrap_or_default(),
            version: child_text(parent, "version").unwrap_or_default(),
        });
        // Coordinates only label logs and reports; missing ones stay empty.
        let artifact_id = child_text(project, "artifactId").unwrap_or_default();
        let group_id = child_text(project, "groupId")
            .or_else(|| inherit(parent.as_ref().map(|gav| &gav.group_id)))
            .unwrap_or_default();
        let version = child_text(project, "version")
            .or_else(|| inherit(parent.as_ref().map(|gav| &gav.version)))
            .unwrap_or_default();

        let plugins = project
            .child("build")
            .and_then(|build| build.child("plugins"))
            .map(|plugins| {
                plugins
                    .children()
                    .filter(|child| child.is_named("plugin"))
                    .filter_map(plugin_from_element)
                    .collect()
            })
            .unwrap_or_default();

        let properties = project
            .child("properties")
            .map(|properties| {
                properties
                    .children()
                    .map(|child| (child.name().to_string(), child.text().trim().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            gav: Gav {
                group_id,
                artifact_id,
                version,
            },
            parent,
            plugins,
            properties,
        })
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn declares_plugin(&self, group_id: &str, artifact_id: &str) -> bool {
        self.plugins
            .iter()
            .any(|plugin| plugin.group_id == group_id && plugin.artifact_id == artifact_id)
    }
}

fn child_text(element: Element<'_>, name: &str) -> Option<String> {
    element
        .child(name)
        .map(|child| child.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn inherit(value: Option<&String>) -> Option<String> {
    value.filter(|value| !value.is_empty()).cloned()
}

fn plugin_from_element(element: Element<'_>) -> Option<Plugin> {
    Some(Plugin {
        artifact_id: child_text(element, "artifactId")?,
        group_id: child_text(element, "groupId")
            .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP_ID.to_string()),
        version: child_text(element, "version"),
    })
}
