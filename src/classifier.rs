use std::path::Path;

use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::InferenceError;
use crate::preprocess::{CHANNELS, IMG_HEIGHT, IMG_WIDTH};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// A trained model seen as a function from a `1x224x224x3` batch to one
/// score per class.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// ONNX export of the classifier, run with tract.
pub struct OnnxClassifier {
    model: OnnxPlan,
}

impl OnnxClassifier {
    pub fn load(model_path: impl AsRef<Path>) -> TractResult<Self> {
        let input_shape = [1, IMG_HEIGHT as usize, IMG_WIDTH as usize, CHANNELS];
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(0, f32::fact(input_shape).into())?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let tensor = Tensor::from(input.clone());

        let outputs = self.model.run(tvec!(tensor.into())).map_err(backend_error)?;

        let scores = outputs
            .first()
            .ok_or(InferenceError::EmptyOutput)?
            .to_array_view::<f32>()
            .map_err(backend_error)?
            .iter()
            .copied()
            .collect();

        Ok(scores)
    }
}

fn backend_error(e: TractError) -> InferenceError {
    InferenceError::Backend(format!("{:#}", e))
}
