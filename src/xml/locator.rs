//! Locating the version fields of a manifest.

use crate::edit::EditResult;
use crate::xml::document::ManifestDocument;
use crate::xml::errors::XmlError;
use crate::xml::query::ElementPath;
use std::fmt;

/// The fields the patcher rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// `/project/version`
    SelfVersion,
    /// `/project/parent/version`
    ParentVersion,
}

impl FieldPath {
    pub const ALL: [FieldPath; 2] = [FieldPath::SelfVersion, FieldPath::ParentVersion];

    pub fn expression(self) -> &'static str {
        match self {
            FieldPath::SelfVersion => "/project/version",
            FieldPath::ParentVersion => "/project/parent/version",
        }
    }

    fn element_path(self) -> ElementPath {
        match self {
            FieldPath::SelfVersion => ElementPath::new(&["project", "version"]),
            FieldPath::ParentVersion => ElementPath::new(&["project", "parent", "version"]),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expression())
    }
}

/// Mutable handle to the text of one located field.
pub struct TextHandle<'a> {
    doc: &'a mut ManifestDocument,
    index: usize,
    field: FieldPath,
}

impl TextHandle<'_> {
    pub fn field(&self) -> FieldPath {
        self.field
    }

    pub fn text(&self) -> String {
        self.doc.element(self.index).text()
    }

    /// Replace the field's text; attributes, siblings and surrounding
    /// whitespace are untouched.
    pub fn set_text(&mut self, value: &str) -> Result<EditResult, XmlError> {
        self.doc.set_text(self.index, value)
    }
}

/// Locate `field` in `doc`. Absence is a normal outcome: a module may
/// inherit its version or have no parent.
pub fn find(doc: &mut ManifestDocument, field: FieldPath) -> Option<TextHandle<'_>> {
    let index = field.element_path().evaluate(doc)?.index();
    Some(TextHandle { doc, index, field })
}

/// Current decoded value of `field`, if present.
pub fn read(doc: &ManifestDocument, field: FieldPath) -> Option<String> {
    field
        .element_path()
        .evaluate(doc)
        .map(|element| element.text().trim().to_string())
}
