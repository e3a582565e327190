//! Manifest patch engine.
//!
//! One [`PatchEngine::run`] call handles one module:
//! - strip the activating plugin's fingerprint from the in-memory model
//! - load the original manifest file (not the model) as a document
//! - rewrite `/project/version` and `/project/parent/version` when present
//! - write the result to the sidecar path under the build directory
//! - promote the sidecar over the original when requested, as the last step

use crate::config::{EngineConfig, PatchDirectives};
use crate::error::{PatchError, Phase};
use crate::model::{sanitize, ProjectModel, SanitizeReport};
use crate::swap::SwapCoordinator;
use crate::xml::{locator, DocumentStore, FieldPath, ManifestDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to one version field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldUpdate {
    /// The manifest has no such element
    Absent,
    /// Text replaced; `previous` is the trimmed old value
    Updated { previous: String },
    /// Element already held the resolved version
    Unchanged,
}

/// Serializable summary of one patch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub project: String,
    pub version: String,
    pub sidecar_path: PathBuf,
    pub self_version: FieldUpdate,
    pub parent_version: FieldUpdate,
    pub sanitized: SanitizeReport,
    pub promoted: bool,
}

/// Outcome of a successful run. `sidecar_path` is the manifest the caller
/// should install as the active one for the rest of the build.
#[derive(Debug, Clone)]
#[must_use = "the sidecar path has to be installed as the active manifest"]
pub struct PatchResult {
    pub sidecar_path: PathBuf,
    pub document: ManifestDocument,
    pub report: PatchReport,
}

/// Stateless apart from its configuration, so one engine can serve
/// concurrent module builds.
#[derive(Debug, Clone, Default)]
pub struct PatchEngine {
    config: EngineConfig,
}

impl PatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn property_prefix(&self) -> String {
        self.config.property_prefix()
    }

    /// Deterministic sidecar location for a module build directory.
    pub fn sidecar_path(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(&self.config.engine.sidecar_name)
    }

    /// Directives as configured through the model's private properties.
    ///
    /// Must be read before [`run`](Self::run) sanitizes those properties away.
    pub fn directives_for(
        &self,
        model: &ProjectModel,
        resolved_version: impl Into<String>,
    ) -> Result<PatchDirectives, PatchError> {
        PatchDirectives::from_properties(
            &model.properties,
            &self.property_prefix(),
            resolved_version,
        )
    }

    pub fn run(
        &self,
        model: &mut ProjectModel,
        original_manifest: &Path,
        build_dir: &Path,
        directives: &PatchDirectives,
    ) -> Result<PatchResult, PatchError> {
        if !original_manifest.is_file() {
            return Err(PatchError::precondition(format!(
                "original manifest {} does not exist",
                original_manifest.display()
            )));
        }

        let sanitized = sanitize(model, &self.config.plugin, &self.property_prefix());

        info!("Generating git versioned POM of project {}", model.gav);

        let mut document = DocumentStore::load(original_manifest)
            .map_err(|err| PatchError::new(Phase::Load, err))?;

        let version = directives.resolved_version();
        let self_version = rewrite_field(&mut document, FieldPath::SelfVersion, version)?;
        let parent_version = rewrite_field(&mut document, FieldPath::ParentVersion, version)?;
        if self_version == FieldUpdate::Absent && parent_version == FieldUpdate::Absent {
            warn!(
                manifest = %original_manifest.display(),
                "manifest declares neither a version nor a parent version"
            );
        }

        let sidecar_path = self.sidecar_path(build_dir);
        SwapCoordinator::ensure_dir(build_dir)
            .map_err(|err| PatchError::new(Phase::WriteSidecar, err))?;
        SwapCoordinator::write_sidecar(&document, &sidecar_path)
            .map_err(|err| PatchError::new(Phase::WriteSidecar, err))?;

        let promoted =
            SwapCoordinator::promote(&sidecar_path, original_manifest, directives.update_original())
                .map_err(|err| PatchError::new(Phase::Promote, err))?;

        let report = PatchReport {
            project: model.gav.to_string(),
            version: version.to_string(),
            sidecar_path: sidecar_path.clone(),
            self_version,
            parent_version,
            sanitized,
            promoted,
        };

        Ok(PatchResult {
            sidecar_path,
            document,
            report,
        })
    }
}

fn rewrite_field(
    document: &mut ManifestDocument,
    field: FieldPath,
    version: &str,
) -> Result<FieldUpdate, PatchError> {
    let Some(mut handle) = locator::find(document, field) else {
        debug!(%field, "field absent, skipping");
        return Ok(FieldUpdate::Absent);
    };

    let previous = handle.text().trim().to_string();
    let result = handle
        .set_text(version)
        .map_err(|err| PatchError::new(Phase::Rewrite, err))?;

    if result.is_applied() {
        debug!(%field, %previous, version, "rewrote version field");
        Ok(FieldUpdate::Updated { previous })
    } else {
        Ok(FieldUpdate::Unchanged)
    }
}
