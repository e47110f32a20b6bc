use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{InferenceError, PredictError};
use crate::models::{HealthResponse, PredictionResult};
use crate::preprocess::preprocess_image;
use crate::state::AppState;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/health").route(web::get().to(health)));
}

/// Any origin, method and header; the service has no authentication.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

pub async fn predict(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, PredictError> {
    let span = info_span!("predict", request_id = %Uuid::new_v4());

    async move {
        match run_prediction(state, payload).await {
            Ok(result) => {
                info!(label = %result.label, confidence = result.confidence, "prediction served");
                Ok(HttpResponse::Ok().json(result.into_response()))
            }
            Err(e) => {
                if e.is_client_fault() {
                    warn!("rejected upload: {}", e);
                } else if matches!(e, PredictError::ModelUnavailable) {
                    debug!("prediction requested while no model is loaded");
                } else {
                    error!("Error during prediction: {}", e);
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_prediction(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<PredictionResult, PredictError> {
    let classifier = state
        .classifier
        .as_ref()
        .map(Arc::clone)
        .ok_or(PredictError::ModelUnavailable)?;

    let upload = read_upload(&mut payload, state.max_upload_bytes).await?;
    debug!(filename = %upload.filename, size = upload.bytes.len(), "upload received");

    web::block(move || -> Result<PredictionResult, PredictError> {
        let tensor = preprocess_image(&upload.bytes)?;
        let scores = classifier.predict(&tensor)?;
        Ok(state.labels.select(&scores)?)
    })
    .await
    .map_err(|_| PredictError::Inference(InferenceError::WorkerFailed))?
}

/// Returns the first part named [`FILE_FIELD`] that carries a filename.
///
/// A part with that name but no `filename` parameter is a plain form field
/// and is skipped, as are all other fields.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Upload, PredictError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(upload_error)?;

        let disposition = field.content_disposition();
        if disposition.get_name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = match disposition.get_filename() {
            Some(name) => name.to_owned(),
            None => continue,
        };
        if filename.is_empty() {
            return Err(PredictError::EmptyFilename);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(upload_error)?;
            if bytes.len() + data.len() > limit {
                return Err(PredictError::PayloadTooLarge { limit });
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(Upload { filename, bytes });
    }

    Err(PredictError::MissingFilePart)
}

fn upload_error(e: MultipartError) -> PredictError {
    match e {
        // not a multipart body at all, so there is no file part to find
        MultipartError::NoContentType
        | MultipartError::ParseContentType
        | MultipartError::Boundary => PredictError::MissingFilePart,
        other => PredictError::MalformedUpload(other.to_string()),
    }
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        model_loaded: state.model_loaded(),
        labels: state.labels.as_slice().to_vec(),
    })
}
