use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// On-disk file the classifier cannot run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Model,
    Labels,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Model => f.write_str("model"),
            Artifact::Labels => f.write_str("class label"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("{artifact} file '{}' does not exist", .path.display())]
    ArtifactMissing { artifact: Artifact, path: PathBuf },
    #[error("model produced {scores} scores but {labels} class labels are loaded")]
    LabelMismatch { labels: usize, scores: usize },
    #[error("invalid class labels: {message}")]
    InvalidLabels { message: String },
    #[error("invalid classifier input: {message}")]
    InvalidInput { message: String },
    #[error("backend error: {message}")]
    Backend { message: String },
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClassifierError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn invalid_labels(message: impl Into<String>) -> Self {
        Self::InvalidLabels {
            message: message.into(),
        }
    }
}

/// Fails with [`ClassifierError::ArtifactMissing`] unless `path` names an existing file.
pub fn ensure_artifact(artifact: Artifact, path: &std::path::Path) -> Result<(), ClassifierError> {
    if path.is_file() {
        return Ok(());
    }
    Err(ClassifierError::ArtifactMissing {
        artifact,
        path: path.to_path_buf(),
    })
}
