use crate::edit::EditError;
use crate::xml::XmlError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stage of the patch operation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Precondition,
    Load,
    Rewrite,
    WriteSidecar,
    Promote,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::Precondition => "checking preconditions",
            Phase::Load => "loading the original manifest",
            Phase::Rewrite => "rewriting version fields",
            Phase::WriteSidecar => "writing the git versioned manifest",
            Phase::Promote => "updating the original manifest",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum PatchErrorKind {
    #[error("malformed manifest: {0}")]
    Parse(#[source] XmlError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Precondition(String),

    #[error("span edit rejected: {0}")]
    Edit(#[source] EditError),
}

impl From<XmlError> for PatchErrorKind {
    fn from(err: XmlError) -> Self {
        match err {
            XmlError::Io { path, source } => PatchErrorKind::Io { path, source },
            XmlError::Edit(err) => PatchErrorKind::Edit(err),
            other => PatchErrorKind::Parse(other),
        }
    }
}

/// Single failure surfaced by a patch operation: the phase that failed plus
/// the underlying cause. Nothing is reported as done once this is returned.
#[derive(Error, Debug)]
#[error("git versioned pom generation failed while {phase}")]
pub struct PatchError {
    phase: Phase,
    #[source]
    kind: PatchErrorKind,
}

impl PatchError {
    pub fn new(phase: Phase, kind: impl Into<PatchErrorKind>) -> Self {
        Self {
            phase,
            kind: kind.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(
            Phase::Precondition,
            PatchErrorKind::Precondition(message.into()),
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn kind(&self) -> &PatchErrorKind {
        &self.kind
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self.kind, PatchErrorKind::Precondition(_))
    }
}
