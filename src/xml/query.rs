use crate::xml::document::{Element, ManifestDocument};

/// Absolute element path such as `/project/parent/version`.
///
/// Each step selects the first matching child in document order; there are
/// no predicates, wildcards, or axes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ElementPath {
    segments: &'static [&'static str],
}

impl ElementPath {
    pub(crate) const fn new(segments: &'static [&'static str]) -> Self {
        Self { segments }
    }

    /// Resolve the path against `doc`, returning the first match.
    pub(crate) fn evaluate<'a>(&self, doc: &'a ManifestDocument) -> Option<Element<'a>> {
        let (first, rest) = self.segments.split_first()?;
        let root = doc.root();
        if !root.is_named(first) {
            return None;
        }
        rest.iter()
            .try_fold(root, |element, segment| element.child(segment))
    }
}
