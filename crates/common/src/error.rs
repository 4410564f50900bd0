use crate::mirror::Kind;
use crate::path::Path;

/// Why a snapshot location could not be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("value is already borrowed")]
    Borrowed,
    #[error("value has been dropped")]
    Dropped,
}

/// Errors from taking or reverting a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot snapshot {path}: {reason}")]
    InvalidTarget {
        path: Path,
        #[source]
        reason: Unavailable,
    },
    #[error("unsupported type `{type_name}` at {path}")]
    UnsupportedType { path: Path, type_name: &'static str },
    #[error("hidden field at {path} cannot be captured")]
    UnsupportedField { path: Path },
    #[error("cannot write back to {path}: {reason}")]
    TargetInvalidated {
        path: Path,
        #[source]
        reason: Unavailable,
    },
    #[error("shape mismatch at {path}: expected {expected}, found {found}")]
    ShapeMismatch {
        path: Path,
        expected: String,
        found: String,
    },
    #[error("nesting at {path} exceeds the depth limit of {limit}")]
    DepthExceeded { path: Path, limit: usize },
}

impl SnapshotError {
    /// Path the error was raised at.
    pub fn path(&self) -> &Path {
        match self {
            Self::InvalidTarget { path, .. }
            | Self::UnsupportedType { path, .. }
            | Self::UnsupportedField { path }
            | Self::TargetInvalidated { path, .. }
            | Self::ShapeMismatch { path, .. }
            | Self::DepthExceeded { path, .. } => path,
        }
    }

    /// Mismatch between an expected category and what the mirror holds.
    pub fn kind_mismatch(path: Path, expected: Kind, found: &str) -> Self {
        Self::ShapeMismatch {
            path,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
