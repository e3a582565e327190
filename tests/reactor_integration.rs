//! Multi-module runs.

use pom_versioner::config::DEFAULT_SIDECAR_NAME;
use pom_versioner::reactor::{
    discover_modules, patch_modules, DirectiveOverrides, ModuleError, ModuleRequest,
};
use pom_versioner::xml::{self, DocumentStore, FieldPath};
use pom_versioner::PatchEngine;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn module_pom(artifact_id: &str, with_parent: bool) -> String {
    let parent = if with_parent {
        "  <parent>\n    <groupId>com.example</groupId>\n    <artifactId>root</artifactId>\n    <version>0.0.0-SNAPSHOT</version>\n  </parent>\n"
    } else {
        "  <groupId>com.example</groupId>\n"
    };
    format!(
        "<project>\n{parent}  <artifactId>{artifact_id}</artifactId>\n  <version>0.0.0-SNAPSHOT</version>\n</project>\n"
    )
}

fn setup_reactor(modules: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pom.xml"), module_pom("root", false)).unwrap();
    for module in modules {
        let module_dir = dir.path().join(module);
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join("pom.xml"), module_pom(module, true)).unwrap();
    }
    dir
}

fn requests(root: &Path, version: &str) -> Vec<ModuleRequest> {
    discover_modules(root)
        .unwrap()
        .into_iter()
        .map(|manifest| ModuleRequest::new(manifest, version))
        .collect()
}

#[test]
fn patches_modules_concurrently() {
    let modules = ["api", "core", "web", "batch", "cli", "docs"];
    let dir = setup_reactor(&modules);
    let requests = requests(dir.path(), "4.2.0");
    assert_eq!(requests.len(), modules.len() + 1);

    let outcomes = patch_modules(&PatchEngine::default(), &requests, 3).unwrap();

    assert_eq!(outcomes.len(), requests.len());
    for (request, outcome) in requests.iter().zip(&outcomes) {
        assert_eq!(outcome.manifest, request.manifest);
        let result = outcome.result.as_ref().unwrap();
        assert_eq!(
            result.sidecar_path,
            request.build_dir.join(DEFAULT_SIDECAR_NAME)
        );

        let sidecar = DocumentStore::load(&result.sidecar_path).unwrap();
        assert_eq!(
            xml::read(&sidecar, FieldPath::SelfVersion).as_deref(),
            Some("4.2.0")
        );
    }

    let core = DocumentStore::load(dir.path().join("core/target").join(DEFAULT_SIDECAR_NAME)).unwrap();
    assert_eq!(
        xml::read(&core, FieldPath::ParentVersion).as_deref(),
        Some("4.2.0")
    );
}

#[test]
fn one_failing_module_does_not_affect_others() {
    let dir = setup_reactor(&["good", "bad"]);
    fs::write(dir.path().join("bad/pom.xml"), "<project><version>1</project>").unwrap();

    let outcomes = patch_modules(&PatchEngine::default(), &requests(dir.path(), "1.0.0"), 2).unwrap();

    let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].manifest.ends_with("bad/pom.xml"));
    assert!(matches!(
        failed[0].result,
        Err(ModuleError::Load { .. })
    ));

    assert!(dir
        .path()
        .join("good/target")
        .join(DEFAULT_SIDECAR_NAME)
        .is_file());
    assert!(!dir.path().join("bad/target").exists());
}

#[test]
fn overrides_promote_every_module() {
    let dir = setup_reactor(&["core"]);
    let requests: Vec<_> = requests(dir.path(), "7.0.0")
        .into_iter()
        .map(|mut request| {
            request.overrides = DirectiveOverrides {
                update_pom: true,
                force_update_parent: false,
            };
            request
        })
        .collect();

    let outcomes = patch_modules(&PatchEngine::default(), &requests, 1).unwrap();

    for outcome in outcomes {
        let result = outcome.result.unwrap();
        assert!(result.report.promoted);
        assert_eq!(
            fs::read(&outcome.manifest).unwrap(),
            fs::read(&result.sidecar_path).unwrap()
        );
    }
}

#[test]
fn modules_in_build_output_are_ignored() {
    let dir = setup_reactor(&["core"]);
    let requests = requests(dir.path(), "1.0.0");
    patch_modules(&PatchEngine::default(), &requests, 2).unwrap();

    // The sidecars live under target/ and are not picked up as modules
    fs::write(dir.path().join("core/target/pom.xml"), "<broken").unwrap();
    assert_eq!(discover_modules(dir.path()).unwrap().len(), 2);
}

#[test]
fn zero_jobs_uses_default_pool() {
    let dir = setup_reactor(&["core", "web"]);
    let requests = requests(dir.path(), "1.0.0");

    let outcomes = patch_modules(&PatchEngine::default(), &requests, 0).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|outcome| outcome.result.is_ok()));
    let manifests: Vec<_> = outcomes.iter().map(|o| o.manifest.clone()).collect();
    let expected: Vec<_> = requests.iter().map(|r| r.manifest.clone()).collect();
    assert_eq!(manifests, expected);
}
