//! Inference backend contract and ONNX Runtime implementation
//!
//! The pipeline never executes a neural network itself; it hands a
//! preprocessed input tensor to an [`InferenceBackend`] and decodes whatever
//! comes back. Output tensors are positional, with a fixed slot order per
//! model (the decoders document the slots they read).

use ndarray::{Array4, ArrayD};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use tracing::info;

use crate::error::OcrError;

/// A loaded model that maps one input tensor to its output tensors.
///
/// Implementations are expected to be deterministic given identical input.
/// Invocation takes `&mut self` because one backend instance serves one run
/// at a time; concurrent runs need their own instances.
pub trait InferenceBackend {
    /// Run a forward pass. Outputs are returned in the model's declared
    /// slot order.
    fn invoke(&mut self, input: Array4<f32>) -> Result<Vec<ArrayD<f32>>, OcrError>;
}

/// ONNX Runtime session wrapper.
pub struct OrtSession {
    session: Session,
    output_names: Vec<String>,
}

impl OrtSession {
    /// Load a model from an ONNX file.
    ///
    /// The session runs with a bounded intra-op thread pool; that pool is an
    /// internal detail of the backend and not part of the pipeline's
    /// concurrency contract.
    pub fn from_file(model_path: &Path) -> Result<Self, OcrError> {
        info!("Loading ONNX model from {:?}", model_path);

        let session = Session::builder()
            .map_err(|e| OcrError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| OcrError::ModelLoad(e.to_string()))?
            .with_intra_threads(4)
            .map_err(|e| OcrError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| OcrError::ModelLoad(format!("{:?}: {}", model_path, e)))?;

        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();

        info!("Model loaded. Outputs: {:?}", output_names);

        Ok(Self {
            session,
            output_names,
        })
    }

    /// Names of the model's outputs, in slot order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

impl InferenceBackend for OrtSession {
    fn invoke(&mut self, input: Array4<f32>) -> Result<Vec<ArrayD<f32>>, OcrError> {
        let input_tensor =
            Tensor::from_array(input).map_err(|e| OcrError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| OcrError::Inference(e.to_string()))?;

        let mut extracted = Vec::with_capacity(self.output_names.len());
        for slot in 0..self.output_names.len() {
            let view = outputs[slot]
                .try_extract_array::<f32>()
                .map_err(|e| OcrError::Inference(e.to_string()))?;
            extracted.push(view.to_owned());
        }

        Ok(extracted)
    }
}
