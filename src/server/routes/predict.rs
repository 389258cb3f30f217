//! Prediction endpoint - classify one uploaded image
//!
//! Accepts a multipart/form-data body with an `image_file` field, decodes
//! it, runs the classifier, and returns the predicted type with its
//! confidence. Each request is independent; a failure here never affects
//! other in-flight requests.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::Error;
use crate::server::state::SharedState;

/// The multipart field carrying the uploaded image
const IMAGE_FIELD: &str = "image_file";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_type: String,
    pub confidence: f32,
}

/// POST /predict - classify an uploaded image
pub async fn predict(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, (StatusCode, String)> {
    let mut image_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read upload: {}", e)))?;
            image_bytes = Some(bytes);
            break;
        }
    }

    let bytes = image_bytes.ok_or((
        StatusCode::BAD_REQUEST,
        format!("Missing file field '{}'", IMAGE_FIELD),
    ))?;

    // The forward pass is compute-bound; run it on a blocking worker so
    // the event loop keeps serving other connections.
    let shared = state.clone();
    let prediction = tokio::task::spawn_blocking(move || {
        let predictor = shared
            .predictor
            .lock()
            .map_err(|_| Error::Inference("predictor lock poisoned".to_string()))?;
        predictor.predict_bytes(&bytes)
    })
    .await
    .map_err(|e| {
        error!("Inference task failed to complete: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Inference failed".to_string(),
        )
    })?
    .map_err(error_response)?;

    Ok(Json(PredictResponse {
        predicted_type: prediction.label,
        confidence: prediction.confidence,
    }))
}

/// Map a prediction error to an HTTP response
fn error_response(err: Error) -> (StatusCode, String) {
    match err {
        // Client sent bytes that are not a decodable image
        Error::Decode(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        other => {
            error!("Prediction failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Prediction failed".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_is_client_error() {
        let (status, _) = error_response(Error::Decode("bad bytes".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_other_errors_are_server_errors() {
        let (status, body) = error_response(Error::Inference("oom".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Internal detail is logged, not leaked to the client.
        assert_eq!(body, "Prediction failed");
    }
}
