use ndarray::Array3;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("Invalid artifact: {0}")]
    Invalid(String),
    #[error("Expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Class index {index} is out of range for {classes} classes")]
    IndexOutOfRange { index: usize, classes: usize },
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Pretrained classifier over the fixed label set.
///
/// Input is the scaled feature vector shaped `[1, feature_len, 1]`; output is
/// one probability per label.
pub trait Scorer: Send + Sync + 'static {
    fn score(&self, input: &Array3<f32>) -> Result<Vec<f32>, ArtifactError>;
}

/// Pre-fit feature standardization.
pub trait Scaler: Send + Sync + 'static {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtifactError>;
}

/// Maps scorer output indices back to species labels.
pub trait LabelDecoder: Send + Sync + 'static {
    fn decode(&self, index: usize) -> Result<String, ArtifactError>;
    fn num_classes(&self) -> usize;
}
