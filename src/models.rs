use serde::Serialize;

use crate::error::InferenceError;

/// Ordered class names; position `i` names output score `i`.
///
/// The order must match the one the model was trained with. Nothing in the
/// model artifact records it, so a mismatch goes unnoticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabels(Vec<String>);

impl ClassLabels {
    pub fn new<I, S>(labels: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.into().trim().to_string())
            .collect();

        if labels.is_empty() {
            return Err("label set must not be empty".to_string());
        }
        if let Some(pos) = labels.iter().position(|label| label.is_empty()) {
            return Err(format!("label at index {} is empty", pos));
        }

        Ok(Self(labels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Picks the highest score and names it.
    ///
    /// Ties go to the earliest index, NaN scores never win, and the
    /// confidence is the raw score without renormalization.
    pub fn select(&self, scores: &[f32]) -> Result<PredictionResult, InferenceError> {
        if scores.is_empty() {
            return Err(InferenceError::EmptyOutput);
        }
        if scores.len() != self.len() {
            return Err(InferenceError::ScoreCount {
                expected: self.len(),
                actual: scores.len(),
            });
        }

        let mut best: Option<(usize, f32)> = None;
        for (index, &score) in scores.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((index, score)),
            }
        }

        let (index, confidence) = best.ok_or(InferenceError::NoValidScore)?;
        Ok(PredictionResult {
            label: self.0[index].clone(),
            confidence,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f32,
}

impl PredictionResult {
    pub fn into_response(self) -> PredictionResponse {
        PredictionResponse {
            confidence: format_confidence(self.confidence),
            prediction: self.label,
        }
    }
}

/// `0.873` becomes `"87.30%"`.
pub fn format_confidence(confidence: f32) -> String {
    format!("{:.2}%", f64::from(confidence) * 100.0)
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub confidence: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub labels: Vec<String>,
}
