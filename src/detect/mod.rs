//! Detection decoders
//!
//! Two interchangeable strategies for turning raw detector tensors into
//! oriented text boxes: a fixed-anchor grid regressor and a dense
//! geometry-map regressor. Both produce the same candidate type, so
//! suppression, rectification, and recognition are written once.

pub mod east;
pub mod grid;

use ndarray::ArrayD;

use crate::config::DetectorKind;
use crate::error::OcrError;
use crate::geometry::RotatedRect;

/// One decoded text detection in detector-grid coordinates.
///
/// Candidates below the detection threshold are never constructed.
#[derive(Debug, Clone, Copy)]
pub struct DetectionCandidate {
    /// Oriented box in detector-grid space
    pub rect: RotatedRect,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

/// Decode detector outputs with the decoder matching `kind`.
pub fn decode_detections(
    kind: DetectorKind,
    outputs: &[ArrayD<f32>],
    threshold: f32,
) -> Result<Vec<DetectionCandidate>, OcrError> {
    match kind {
        DetectorKind::Grid => {
            grid::decode(outputs, kind.input_width(), kind.input_height(), threshold)
        }
        DetectorKind::East => east::decode(outputs, threshold),
    }
}
