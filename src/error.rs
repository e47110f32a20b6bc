//! Error types for the prediction path.
//!
//! Decode and inference failures are kept apart so the handler boundary can
//! tell a bad upload from a model fault and answer with the matching status.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// The uploaded bytes are not an image the decoder understands.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct DecodeError(#[from] pub image::ImageError);

/// Failure while running the model or interpreting its output.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The model runtime rejected the input or failed during execution.
    #[error("{0}")]
    Backend(String),

    #[error("model returned no scores")]
    EmptyOutput,

    #[error("model returned only NaN scores")]
    NoValidScore,

    /// Score vector length disagrees with the configured label set.
    #[error("model returned {actual} scores for {expected} labels")]
    ScoreCount { expected: usize, actual: usize },

    /// The blocking task running the model panicked or its pool shut down.
    #[error("inference worker panicked or was shut down")]
    WorkerFailed,
}

/// Every way `POST /predict` can fail, as seen by the client.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model is not loaded or failed to load.")]
    ModelUnavailable,

    #[error("No file part in the request.")]
    MissingFilePart,

    #[error("No file selected for uploading.")]
    EmptyFilename,

    #[error("Malformed multipart request: {0}")]
    MalformedUpload(String),

    #[error("Uploaded file exceeds the {limit} byte limit.")]
    PayloadTooLarge { limit: usize },

    #[error("Uploaded file is not a readable image: {0}")]
    Decode(#[from] DecodeError),

    #[error("An error occurred during prediction: {0}")]
    Inference(#[from] InferenceError),
}

impl PredictError {
    /// True when the fault lies with the request rather than the server.
    pub fn is_client_fault(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingFilePart
            | PredictError::EmptyFilename
            | PredictError::MalformedUpload(_)
            | PredictError::Decode(_) => StatusCode::BAD_REQUEST,
            PredictError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::ModelUnavailable | PredictError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
