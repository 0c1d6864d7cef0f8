use crate::model_service::{ArtifactError, LabelDecoder};
use serde::Deserialize;
use std::path::Path;

/// Ordered class list of the training label encoder; position is the scorer index.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let encoder: LabelEncoder =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if encoder.classes.is_empty() {
            return Err(ArtifactError::Invalid(format!(
                "label encoder {:?} has no classes",
                path
            )));
        }
        Ok(encoder)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl LabelDecoder for LabelEncoder {
    fn decode(&self, index: usize) -> Result<String, ArtifactError> {
        self.classes
            .get(index)
            .map(|label| label.trim().to_string())
            .ok_or(ArtifactError::IndexOutOfRange {
                index,
                classes: self.classes.len(),
            })
    }

    fn num_classes(&self) -> usize {
        self.classes.len()
    }
}
