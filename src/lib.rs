//! pom-versioner: git-versioned Maven manifests.
//!
//! Given a module's `pom.xml` and a version already resolved from
//! version-control state, the patch engine produces a copy of the manifest
//! whose `/project/version` and `/project/parent/version` carry that
//! version, writes it next to the build output as `.git-versioned-pom.xml`,
//! and optionally promotes it over the original.
//!
//! # Architecture
//!
//! Documents are never re-serialized from a tree. [`ManifestDocument`] keeps
//! the original text and an element index over it; every mutation compiles
//! down to a verified byte-span [`Edit`]. Untouched bytes, including comments
//! and indentation, therefore survive exactly.
//!
//! Before patching, the engine strips the activating plugin's declaration
//! and private properties from the in-memory [`ProjectModel`] so re-reading
//! the generated manifest never re-activates it.
//!
//! # Example
//!
//! ```no_run
//! use pom_versioner::{ActiveManifest, PatchDirectives, PatchEngine, ProjectModel};
//! use pom_versioner::xml::DocumentStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pom = Path::new("pom.xml");
//! let mut model = ProjectModel::from_document(&DocumentStore::load(pom)?)?;
//!
//! let engine = PatchEngine::default();
//! let directives = engine.directives_for(&model, "1.2.3-feature-x")?;
//! let result = engine.run(&mut model, pom, Path::new("target"), &directives)?;
//!
//! let mut active = ActiveManifest::new(pom);
//! active.install(&result.sidecar_path);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod reactor;
pub mod swap;
pub mod xml;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, EngineConfig, PatchDirectives};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use engine::{FieldUpdate, PatchEngine, PatchReport, PatchResult};
pub use error::{PatchError, PatchErrorKind, Phase};
pub use model::{sanitize, Gav, Plugin, PluginIdentity, ProjectModel, SanitizeReport};
pub use reactor::{
    discover_modules, patch_module, patch_modules, DirectiveOverrides, ModuleError, ModuleOutcome,
    ModuleRequest,
};
pub use swap::{ActiveManifest, SwapCoordinator};
pub use xml::{DocumentStore, FieldPath, ManifestDocument, XmlError};
