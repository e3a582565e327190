//! Multi-module driver: find every module manifest below a root and patch
//! each one independently.
//!
//! Modules share nothing but the engine configuration, so they are patched
//! in parallel on a rayon pool. One module failing never affects another.

use crate::engine::{PatchEngine, PatchResult};
use crate::error::PatchError;
use crate::model::{ModelError, ProjectModel};
use crate::xml::{DocumentStore, XmlError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Manifest file name of a module.
pub const MANIFEST_FILE: &str = "pom.xml";
/// Build output directory of a module, relative to its manifest.
pub const BUILD_DIR: &str = "target";

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("failed to read project model from {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("invalid project model in {}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("failed to start {jobs} patch workers")]
    Pool {
        jobs: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("failed to scan {}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Flags forced on regardless of what the manifest properties say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectiveOverrides {
    pub update_pom: bool,
    pub force_update_parent: bool,
}

/// Everything needed to patch one module.
#[derive(Debug, Clone)]
pub struct ModuleRequest {
    pub manifest: PathBuf,
    pub build_dir: PathBuf,
    pub resolved_version: String,
    pub overrides: DirectiveOverrides,
}

impl ModuleRequest {
    /// Request with the conventional `target/` build directory.
    pub fn new(manifest: impl Into<PathBuf>, resolved_version: impl Into<String>) -> Self {
        let manifest = manifest.into();
        let build_dir = manifest
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(BUILD_DIR);
        Self {
            manifest,
            build_dir,
            resolved_version: resolved_version.into(),
            overrides: DirectiveOverrides::default(),
        }
    }
}

#[derive(Debug)]
pub struct ModuleOutcome {
    pub manifest: PathBuf,
    pub result: Result<PatchResult, ModuleError>,
}

/// Module manifests below `root`, sorted. Build output and hidden
/// directories are not descended into.
pub fn discover_modules(root: &Path) -> Result<Vec<PathBuf>, ModuleError> {
    let mut manifests = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        name != BUILD_DIR && !name.starts_with('.')
    });

    for entry in walker {
        let entry = entry.map_err(|source| ModuleError::Discover {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE {
            manifests.push(entry.into_path());
        }
    }

    manifests.sort();
    Ok(manifests)
}

/// Patch one module: parse its model, read its directives, run the engine.
pub fn patch_module(engine: &PatchEngine, request: &ModuleRequest) -> Result<PatchResult, ModuleError> {
    let document = DocumentStore::load(&request.manifest).map_err(|source| ModuleError::Load {
        path: request.manifest.clone(),
        source,
    })?;
    let mut model = ProjectModel::from_document(&document).map_err(|source| ModuleError::Model {
        path: request.manifest.clone(),
        source,
    })?;

    let configured = engine.directives_for(&model, request.resolved_version.as_str())?;
    let directives = configured
        .clone()
        .with_update_original(configured.update_original() || request.overrides.update_pom)
        .with_force_update_parent(
            configured.force_update_parent() || request.overrides.force_update_parent,
        );

    let result = engine.run(&mut model, &request.manifest, &request.build_dir, &directives)?;
    Ok(result)
}

/// Patch all `requests` on `jobs` worker threads (`0` means one per CPU).
/// Outcomes keep request order.
pub fn patch_modules(
    engine: &PatchEngine,
    requests: &[ModuleRequest],
    jobs: usize,
) -> Result<Vec<ModuleOutcome>, ModuleError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|source| ModuleError::Pool { jobs, source })?;
    debug!(modules = requests.len(), workers = pool.current_num_threads(), "patching modules");

    Ok(pool.install(|| {
        requests
            .par_iter()
            .map(|request| ModuleOutcome {
                manifest: request.manifest.clone(),
                result: patch_module(engine, request),
            })
            .collect()
    }))
}
