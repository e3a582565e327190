//! File-level protocol around the patched manifest: write the sidecar,
//! point the session at it, optionally promote it over the original.

use crate::error::PatchErrorKind;
use crate::xml::store::atomic_write;
use crate::xml::{DocumentStore, ManifestDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct SwapCoordinator;

impl SwapCoordinator {
    /// Create `dir` and its ancestors; an existing directory is fine.
    pub fn ensure_dir(dir: &Path) -> Result<(), PatchErrorKind> {
        fs::create_dir_all(dir).map_err(|source| PatchErrorKind::Io {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Write the patched document to `sidecar`, replacing any previous one.
    pub fn write_sidecar(doc: &ManifestDocument, sidecar: &Path) -> Result<(), PatchErrorKind> {
        DocumentStore::save(doc, sidecar)?;
        debug!(path = %sidecar.display(), bytes = doc.as_bytes().len(), "wrote git versioned pom");
        Ok(())
    }

    /// Replace `original` with the bytes of `sidecar` when `enabled`.
    ///
    /// Returns whether the original was replaced. The replacement is a whole
    /// file rename, so readers see either the old or the new manifest.
    pub fn promote(sidecar: &Path, original: &Path, enabled: bool) -> Result<bool, PatchErrorKind> {
        if !enabled {
            return Ok(false);
        }

        info!("Updating original POM {}", original.display());
        let bytes = fs::read(sidecar).map_err(|source| PatchErrorKind::Io {
            path: sidecar.to_path_buf(),
            source,
        })?;
        atomic_write(original, &bytes).map_err(|source| PatchErrorKind::Io {
            path: original.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

/// The manifest a build session currently reads for a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveManifest {
    original: PathBuf,
    active: PathBuf,
}

impl ActiveManifest {
    pub fn new(original: impl Into<PathBuf>) -> Self {
        let original = original.into();
        Self {
            active: original.clone(),
            original,
        }
    }

    /// Re-point the session at `sidecar`.
    pub fn install(&mut self, sidecar: impl Into<PathBuf>) {
        self.active = sidecar.into();
        debug!(
            original = %self.original.display(),
            active = %self.active.display(),
            "replaced pom file with git versioned pom file"
        );
    }

    pub fn path(&self) -> &Path {
        &self.active
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn is_swapped(&self) -> bool {
        self.active != self.original
    }
}
