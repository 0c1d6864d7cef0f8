use crate::{
    metadata,
    model_service::ArtifactError,
    state::ModelArtifacts,
};
use image::{metadata::Orientation, DynamicImage, ImageDecoder, ImageError, RgbImage};
use mushroom_features::FeatureError;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Model not loaded. Error: {0}")]
    ModelNotLoaded(String),
    #[error("No image uploaded")]
    MissingImage,
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("Upload exceeds the {limit_mib} MiB limit")]
    PayloadTooLarge { limit_mib: usize },
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Feature extraction failed: {0}")]
    Extraction(#[from] FeatureError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("{0}")]
    Internal(String),
}

impl PredictionError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictionError::MissingImage
                | PredictionError::InvalidUpload(_)
                | PredictionError::PayloadTooLarge { .. }
                | PredictionError::Decode(_)
        )
    }

    /// Body text returned to the client. Decode and extraction causes stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            PredictionError::MissingImage | PredictionError::InvalidUpload(_) => {
                "No image uploaded".to_string()
            }
            PredictionError::Decode(_) => "Failed to decode image".to_string(),
            PredictionError::Extraction(_) => "Feature extraction failed".to_string(),
            other => other.to_string(),
        }
    }

    /// Label used for the outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            PredictionError::ModelNotLoaded(_) => "model_not_loaded",
            PredictionError::MissingImage | PredictionError::InvalidUpload(_) => "bad_request",
            PredictionError::PayloadTooLarge { .. } => "payload_too_large",
            PredictionError::Decode(_) => "decode_error",
            PredictionError::Extraction(_) => "extraction_error",
            PredictionError::Artifact(_) | PredictionError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub name: String,
    pub confidence: f32,
    pub desc: String,
    pub region: String,
    pub edibility: String,
}

/// Decodes an upload and applies its EXIF orientation, so camera photos come
/// out the way they were taken.
pub fn decode_image(image_data: &[u8]) -> Result<RgbImage, PredictionError> {
    let decode_error = |e: ImageError| PredictionError::Decode(e.to_string());

    let mut decoder = image::ImageReader::new(std::io::Cursor::new(image_data))
        .with_guessed_format()
        .map_err(|e| PredictionError::Decode(e.to_string()))?
        .into_decoder()
        .map_err(decode_error)?;

    // unreadable EXIF leaves the pixels as stored
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    image.apply_orientation(orientation);

    Ok(image.to_rgb8())
}

/// Index and value of the highest score; the first one wins a tie.
fn argmax(scores: &[f32]) -> Result<(usize, f32), ArtifactError> {
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(ArtifactError::Inference(format!(
            "scorer returned a non-finite score ({})",
            bad
        )));
    }
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((i, s)),
        })
        .ok_or_else(|| ArtifactError::Inference("scorer returned no scores".into()))
}

impl ModelArtifacts {
    /// Full pass for one decoded image: resize, extract, scale, score and label.
    pub fn predict(&self, image: &RgbImage) -> Result<PredictionResponse, PredictionError> {
        let resized = self.extractor.resize(image);
        let features = self.extractor.extract(&resized)?;

        let scaled = self.scaler.transform(&features)?;
        let input = Array3::from_shape_vec(
            (1, scaled.len(), 1),
            scaled.iter().map(|&v| v as f32).collect(),
        )
        .map_err(|e| PredictionError::Internal(format!("invalid input shape: {}", e)))?;

        let scores = self.scorer.score(&input)?;
        let (class_idx, confidence) = argmax(&scores)?;
        let name = self.decoder.decode(class_idx)?;
        let info = metadata::lookup(&name);

        tracing::debug!(
            "Predicted {} (index {}) with confidence {:.3}",
            name,
            class_idx,
            confidence
        );

        Ok(PredictionResponse {
            name,
            confidence: confidence.clamp(0.0, 1.0),
            desc: info.desc.to_string(),
            region: info.region.to_string(),
            edibility: info.edibility.to_string(),
        })
    }

    /// Decodes uploaded bytes and predicts; decoding failures are client errors.
    pub fn predict_bytes(&self, image_data: &[u8]) -> Result<PredictionResponse, PredictionError> {
        let image = decode_image(image_data)?;
        self.predict(&image)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{
        label_encoder::LabelEncoder,
        metadata::SPECIES,
        model_service::{ArtifactError, Scaler, Scorer},
        state::ModelArtifacts,
    };
    use mushroom_features::{FeatureConfig, FeatureExtractor};
    use ndarray::Array3;

    /// Fixed distribution; rejects inputs not shaped `[1, FEATURE_LEN, 1]`.
    pub struct FixedScorer {
        pub winner: usize,
        pub confidence: f32,
        pub classes: usize,
    }

    impl Scorer for FixedScorer {
        fn score(&self, input: &Array3<f32>) -> Result<Vec<f32>, ArtifactError> {
            if input.shape() != [1, mushroom_features::FEATURE_LEN, 1] {
                return Err(ArtifactError::Inference(format!(
                    "unexpected input shape {:?}",
                    input.shape()
                )));
            }
            let rest = (1.0 - self.confidence) / (self.classes - 1) as f32;
            let mut scores = vec![rest; self.classes];
            scores[self.winner] = self.confidence;
            Ok(scores)
        }
    }

    pub struct FailingScorer;

    impl Scorer for FailingScorer {
        fn score(&self, _input: &Array3<f32>) -> Result<Vec<f32>, ArtifactError> {
            Err(ArtifactError::Inference("session run failed: boom".into()))
        }
    }

    pub struct PanickingScorer;

    impl Scorer for PanickingScorer {
        fn score(&self, _input: &Array3<f32>) -> Result<Vec<f32>, ArtifactError> {
            panic!("scorer crashed");
        }
    }

    pub struct IdentityScaler;

    impl Scaler for IdentityScaler {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtifactError> {
            Ok(features.to_vec())
        }
    }

    pub fn species_encoder() -> LabelEncoder {
        LabelEncoder::new(SPECIES.iter().map(|s| s.to_string()).collect())
    }

    pub fn artifacts_with(scorer: impl Scorer, decoder: LabelEncoder) -> ModelArtifacts {
        let extractor = FeatureExtractor::new(FeatureConfig::default()).unwrap();
        ModelArtifacts::new(extractor, scorer, IdentityScaler, decoder)
    }

    pub fn fixed_artifacts(winner: usize, confidence: f32) -> ModelArtifacts {
        artifacts_with(
            FixedScorer {
                winner,
                confidence,
                classes: SPECIES.len(),
            },
            species_encoder(),
        )
    }
}
