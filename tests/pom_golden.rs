use pom_versioner::engine::FieldUpdate;
use pom_versioner::xml::DocumentStore;
use pom_versioner::{PatchEngine, ProjectModel};
use std::fs;
use std::path::Path;

fn load_fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

fn patch_in(dir: &Path, contents: &str, version: &str) -> (String, pom_versioner::PatchReport) {
    let pom = dir.join("pom.xml");
    fs::write(&pom, contents).expect("write pom");

    let engine = PatchEngine::default();
    let document = DocumentStore::load(&pom).expect("load");
    let mut model = ProjectModel::from_document(&document).expect("model");
    let directives = engine.directives_for(&model, version).expect("directives");
    let result = engine
        .run(&mut model, &pom, &dir.join("target"), &directives)
        .expect("patch");

    let written = fs::read_to_string(&result.sidecar_path).expect("read sidecar");
    (written, result.report)
}

#[test]
fn patch_preserves_formatting_fixture() {
    let input = load_fixture("pom.xml.input");
    let expected = load_fixture("pom.xml.expected");
    let temp = tempfile::tempdir().expect("tempdir");

    let (output, report) = patch_in(temp.path(), &input, "2.4.0-feature-billing");
    assert_eq!(output, expected);
    assert_eq!(report.project, "com.example.platform:billing-service:0.0.0-SNAPSHOT");
    assert_eq!(report.sanitized.removed_plugins, 1);

    // The original manifest stays as written
    let original = fs::read_to_string(temp.path().join("pom.xml")).expect("read original");
    assert_eq!(original, input);
}

#[test]
fn patch_is_noop_on_expected_fixture() {
    let expected = load_fixture("pom.xml.expected");
    let temp = tempfile::tempdir().expect("tempdir");

    let (output, report) = patch_in(temp.path(), &expected, "2.4.0-feature-billing");
    assert_eq!(output, expected);
    assert_eq!(report.self_version, FieldUpdate::Unchanged);
    assert_eq!(report.parent_version, FieldUpdate::Unchanged);
}

#[test]
fn previous_values_are_trimmed() {
    let input = load_fixture("pom.xml.input");
    let temp = tempfile::tempdir().expect("tempdir");

    let (_, report) = patch_in(temp.path(), &input, "2.4.0");
    assert_eq!(
        report.parent_version,
        FieldUpdate::Updated {
            previous: "0.0.0-SNAPSHOT".to_string()
        }
    );
}
