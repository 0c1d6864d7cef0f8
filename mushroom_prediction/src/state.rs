use crate::{
    config::{ModelConfig, Validatable},
    label_encoder::LabelEncoder,
    metadata,
    model_service::{ArtifactError, LabelDecoder, Scaler, Scorer},
    ort_service::OrtScorer,
    scaler::StandardScaler,
};
use mushroom_features::{FeatureConfig, FeatureExtractor};
use std::sync::Arc;

/// Everything a prediction needs, loaded once and never mutated.
pub struct ModelArtifacts {
    pub extractor: FeatureExtractor,
    pub scorer: Box<dyn Scorer>,
    pub scaler: Box<dyn Scaler>,
    pub decoder: Box<dyn LabelDecoder>,
}

impl ModelArtifacts {
    pub fn new(
        extractor: FeatureExtractor,
        scorer: impl Scorer,
        scaler: impl Scaler,
        decoder: impl LabelDecoder,
    ) -> Self {
        Self {
            extractor,
            scorer: Box::new(scorer),
            scaler: Box::new(scaler),
            decoder: Box::new(decoder),
        }
    }

    pub fn load(model_config: &ModelConfig) -> Result<Self, ArtifactError> {
        model_config.validate().map_err(ArtifactError::Invalid)?;

        let extractor = FeatureExtractor::new(FeatureConfig::default())
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;
        let scaler =
            StandardScaler::from_file(&model_config.get_scaler_path(), extractor.feature_len())?;
        let decoder = LabelEncoder::from_file(&model_config.get_label_encoder_path())?;
        let scorer = OrtScorer::new(model_config)?;

        let without_metadata: Vec<&str> = decoder
            .classes()
            .iter()
            .map(|label| label.trim())
            .filter(|label| metadata::lookup(label) == metadata::DEFAULT_INFO)
            .collect();
        if !without_metadata.is_empty() {
            tracing::warn!("Labels without metadata: {:?}", without_metadata);
        }

        tracing::info!(
            "Loaded artifacts: {} features, {} classes",
            extractor.feature_len(),
            decoder.num_classes()
        );

        Ok(Self::new(extractor, scorer, scaler, decoder))
    }
}

/// Outcome of the startup load; a failure is kept so requests can report it.
#[derive(Clone)]
pub enum ModelState {
    Loaded(Arc<ModelArtifacts>),
    Failed(String),
}

impl ModelState {
    pub fn load(model_config: &ModelConfig) -> Self {
        match ModelArtifacts::load(model_config) {
            Ok(artifacts) => ModelState::Loaded(Arc::new(artifacts)),
            Err(e) => {
                tracing::error!("Error loading artifacts: {}", e);
                ModelState::Failed(e.to_string())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }

    pub fn artifacts(&self) -> Result<Arc<ModelArtifacts>, &str> {
        match self {
            ModelState::Loaded(artifacts) => Ok(artifacts.clone()),
            ModelState::Failed(cause) => Err(cause),
        }
    }
}

impl From<ModelArtifacts> for ModelState {
    fn from(artifacts: ModelArtifacts) -> Self {
        ModelState::Loaded(Arc::new(artifacts))
    }
}
