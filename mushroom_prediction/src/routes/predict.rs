use crate::{
    prediction::{PredictionError, PredictionResponse},
    server::{SharedState, MAX_UPLOAD_BYTES},
};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

const IMAGE_FIELD: &str = "image";

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = match &self {
            PredictionError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_client_error() {
            tracing::warn!("Rejected prediction request: {}", self);
        } else {
            tracing::error!("Prediction failed: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, PredictionError> {
    let start_time = Instant::now();
    let result = run_prediction(&state, multipart).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };
    state.metrics.record_prediction(outcome);
    state
        .metrics
        .record_prediction_duration(start_time.elapsed().as_millis() as u64);

    result.map(Json)
}

async fn run_prediction(
    state: &SharedState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PredictionResponse, PredictionError> {
    // fail before touching the upload when nothing can score it
    let artifacts = state
        .model
        .artifacts()
        .map_err(|cause| PredictionError::ModelNotLoaded(cause.to_string()))?;

    let multipart = multipart.map_err(|e| PredictionError::InvalidUpload(e.body_text()))?;
    let image_data = read_image_field(multipart).await?;
    tracing::debug!("Received image of {} bytes", image_data.len());

    tokio::task::spawn_blocking(move || artifacts.predict_bytes(&image_data))
        .await
        .map_err(|e| PredictionError::Internal(format!("Prediction worker failed: {}", e)))?
}

async fn read_image_field(mut multipart: Multipart) -> Result<Bytes, PredictionError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() == Some(IMAGE_FIELD) {
            return field.bytes().await.map_err(upload_error);
        }
    }
    Err(PredictionError::MissingImage)
}

/// The body limit surfaces as a multipart read error with status 413.
fn upload_error(e: MultipartError) -> PredictionError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PredictionError::PayloadTooLarge {
            limit_mib: MAX_UPLOAD_BYTES / (1024 * 1024),
        }
    } else {
        PredictionError::InvalidUpload(e.body_text())
    }
}
