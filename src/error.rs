//! Error types for the OCR pipeline.

use thiserror::Error;

/// Errors surfaced by the OCR pipeline.
///
/// All variants are fatal for the run that raised them: a backend failure
/// during detection or recognition aborts the whole `run` call with no
/// per-region retry. Zero detections and empty decoded strings are normal
/// outcomes, not errors.
#[derive(Debug, Error)]
pub enum OcrError {
    /// A model file is missing, unreadable, or failed to load into the
    /// inference backend. Raised at pipeline construction.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The inference backend failed during a forward pass.
    #[error("inference failed: {0}")]
    Inference(String),

    /// A backend output violates the shape contract of the decoder that
    /// consumes it. This is a configuration error, not a recoverable one.
    #[error("output shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// A detection box produced a degenerate quadrilateral that admits no
    /// perspective transform.
    #[error("rectification failed: {0}")]
    Rectify(String),
}

impl OcrError {
    /// Build a `ShapeMismatch` from a contract string and an actual shape.
    pub fn shape(expected: impl Into<String>, actual: &[usize]) -> Self {
        OcrError::ShapeMismatch {
            expected: expected.into(),
            actual: format!("{:?}", actual),
        }
    }
}
