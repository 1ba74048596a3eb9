//! Error types for docxtree.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docxtree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while mapping documents to and from the tree.
#[derive(Error, Debug)]
pub enum Error {
    /// The source document could not be opened or parsed.
    #[error("Cannot read document {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The package relationship metadata could not be read or parsed.
    ///
    /// Extraction downgrades this to "no hyperlinks"; it only surfaces from
    /// the low-level relationship reader.
    #[error("Relationship resolution failed: {0}")]
    Relationships(String),

    /// Reconstruction failed; no output was produced.
    #[error("Document build failed: {0}")]
    Build(String),

    /// A tree handed in as text could not be decoded.
    #[error("Invalid document tree: {0}")]
    InvalidTree(String),

    /// Configuration could not be loaded or saved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process-wide engine initialization was rejected.
    #[error("Engine activation failed: {0}")]
    Activation(String),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures raised while reading a source document
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Error::SourceUnreadable { .. })
    }

    /// True for failures raised while reconstructing a document
    pub fn is_build_failure(&self) -> bool {
        matches!(self, Error::Build(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidTree(err.to_string())
    }
}
