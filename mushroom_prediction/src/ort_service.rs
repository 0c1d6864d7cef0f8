use crate::{
    config::ModelConfig,
    model_service::{ArtifactError, Scorer},
};
use ndarray::Array3;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

/// ONNX Runtime scorer backed by a pool of sessions.
///
/// A session is not shared between concurrent runs: each sits behind its own
/// mutex and requests are spread round-robin.
pub struct OrtScorer {
    sessions: Vec<Mutex<Session>>,
    counter: AtomicUsize,
    output_name: String,
}

impl OrtScorer {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ArtifactError> {
        let num_instances = model_config.num_instances.max(1);
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .with_intra_threads(1)?
                    .commit_from_file(model_config.get_onnx_path())?;
                Ok(Mutex::new(session))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        let output_name = {
            let session = sessions[0]
                .lock()
                .map_err(|e| ArtifactError::Inference(format!("session mutex poisoned: {}", e)))?;
            session
                .outputs
                .first()
                .map(|output| output.name.clone())
                .ok_or_else(|| ArtifactError::Invalid("ONNX model declares no outputs".into()))?
        };

        tracing::info!(
            "Created {} ONNX sessions for {:?}",
            num_instances,
            model_config.get_onnx_path()
        );

        Ok(Self {
            sessions,
            counter: AtomicUsize::new(0),
            output_name,
        })
    }
}

impl Scorer for OrtScorer {
    fn score(&self, input: &Array3<f32>) -> Result<Vec<f32>, ArtifactError> {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| ArtifactError::Inference(format!("session mutex poisoned: {}", e)))?;

        tracing::debug!("Scoring with session {}", index);
        let owned_buffer;
        let input_view = if input.view().is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.as_standard_layout().into_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)
            .map_err(|e| ArtifactError::Inference(format!("failed to build tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| ArtifactError::Inference(format!("session run failed: {}", e)))?;

        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| ArtifactError::Inference(format!("failed to extract tensor: {}", e)))?;

        Ok(data.to_vec())
    }
}
