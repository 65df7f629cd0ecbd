use std::fs;
use std::path::Path;

use crate::error::{Artifact, ClassifierError, ensure_artifact};

/// Ordered class names, index-aligned with the model's output vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::invalid_labels("label list is empty"));
        }
        Ok(Self { labels })
    }

    /// One label per line; blank lines are skipped and surrounding
    /// whitespace trimmed.
    pub fn from_text(text: &str) -> Result<Self, ClassifierError> {
        let labels = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self::new(labels)
    }

    /// A JSON array of strings.
    pub fn from_json(text: &str) -> Result<Self, ClassifierError> {
        let labels: Vec<String> = serde_json::from_str(text).map_err(|err| {
            ClassifierError::invalid_labels(format!("expected a JSON string array: {err}"))
        })?;
        Self::new(labels)
    }

    /// Reads a `.json` array or a plain text list, chosen by file extension.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        ensure_artifact(Artifact::Labels, path)?;
        let text = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let labels = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_text(&text)?
        };
        tracing::debug!(path = %path.display(), classes = labels.len(), "loaded class labels");
        Ok(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
