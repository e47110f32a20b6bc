//! Process-wide state built once at startup and shared read-only with every
//! request through `web::Data`.

use std::sync::Arc;

use tracing::{error, info};

use crate::classifier::{Classifier, OnnxClassifier};
use crate::config::AppConfig;
use crate::models::ClassLabels;

pub struct AppState {
    /// `None` when the model failed to load; `/predict` then always answers 500.
    pub classifier: Option<Arc<dyn Classifier>>,
    pub labels: ClassLabels,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        classifier: Option<Arc<dyn Classifier>>,
        labels: ClassLabels,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            classifier,
            labels,
            max_upload_bytes,
        }
    }

    /// Loads the model named in `config`. A missing or corrupt artifact is
    /// logged and leaves the service running without a classifier.
    pub fn load(config: &AppConfig) -> Self {
        let classifier: Option<Arc<dyn Classifier>> =
            match OnnxClassifier::load(&config.model_path) {
                Ok(model) => {
                    info!("Model loaded successfully from {:?}", config.model_path);
                    Some(Arc::new(model))
                }
                Err(e) => {
                    error!("Error loading model from {:?}: {:#}", config.model_path, e);
                    None
                }
            };

        Self::new(classifier, config.labels.clone(), config.max_upload_bytes)
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }
}
