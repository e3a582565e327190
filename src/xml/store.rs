//! Loading and saving manifest documents.

use crate::xml::document::ManifestDocument;
use crate::xml::errors::XmlError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Reads manifests from disk and writes them back byte-exact.
pub struct DocumentStore;

impl DocumentStore {
    /// Read and parse a manifest, preserving its formatting.
    pub fn load(path: impl AsRef<Path>) -> Result<ManifestDocument, XmlError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| XmlError::io(path, e))?;
        let content = String::from_utf8(bytes).map_err(|_| XmlError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        ManifestDocument::from_string(content)
    }

    /// Serialize `doc` to `path`, creating missing parent directories.
    ///
    /// An existing file is replaced unconditionally. On failure the target
    /// is left as it was; only the temp file may linger.
    pub fn save(doc: &ManifestDocument, path: impl AsRef<Path>) -> Result<(), XmlError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| XmlError::io(parent, e))?;
        }
        atomic_write(path, doc.as_bytes()).map_err(|e| XmlError::io(path, e))
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the target is unchanged. Permissions of
/// an existing target carry over to the replacement.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory as the target so the rename stays on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_creates_parent_directories_and_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("target/nested/.git-versioned-pom.xml");

        let doc = ManifestDocument::parse("<project><version>1</version></project>").unwrap();
        DocumentStore::save(&doc, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), doc.to_xml());

        let doc = ManifestDocument::parse("<project><version>2</version></project>").unwrap();
        DocumentStore::save(&doc, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), doc.to_xml());
    }

    #[test]
    fn load_round_trips_bytes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pom.xml");
        let content = "<?xml version=\"1.0\"?>\r\n<project>\r\n\t<version>1</version>\r\n</project>\r\n";
        fs::write(&path, content).unwrap();

        let doc = DocumentStore::load(&path).unwrap();
        assert_eq!(doc.to_xml(), content);
    }

    #[test]
    fn load_reports_io_and_encoding_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.xml");
        assert!(matches!(
            DocumentStore::load(&missing),
            Err(XmlError::Io { .. })
        ));

        let binary = temp_dir.path().join("binary.xml");
        fs::write(&binary, [0x3c, 0xff, 0xfe, 0x3e]).unwrap();
        assert!(matches!(
            DocumentStore::load(&binary),
            Err(XmlError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn atomic_write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pom.xml");
        fs::write(&path, "<project/>").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        atomic_write(&path, b"<project></project>").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<project></project>");
    }
}
