//! Grid regressor decoder
//!
//! Decodes the output of a fixed-anchor box-regression head: `boxes`
//! normalized to [0, 1] over the detector input, one score per slot. The
//! detector is single-class, so the classes tensor (slot 1) is ignored.

use ndarray::ArrayD;
use tracing::debug;

use super::DetectionCandidate;
use crate::error::OcrError;
use crate::geometry::RotatedRect;

/// Output slot carrying `boxes [1, N, 4]` as (ymin, xmin, ymax, xmax).
const SLOT_BOXES: usize = 0;
/// Output slot carrying `scores [1, N]`.
const SLOT_SCORES: usize = 2;

/// Decode grid-regressor outputs into detection candidates.
///
/// Returns an empty list when no slot clears the threshold.
pub fn decode(
    outputs: &[ArrayD<f32>],
    input_width: u32,
    input_height: u32,
    threshold: f32,
) -> Result<Vec<DetectionCandidate>, OcrError> {
    if outputs.len() <= SLOT_SCORES {
        return Err(OcrError::ShapeMismatch {
            expected: "at least 3 output tensors (boxes, classes, scores)".to_string(),
            actual: format!("{} outputs", outputs.len()),
        });
    }

    let boxes = &outputs[SLOT_BOXES];
    let scores = &outputs[SLOT_SCORES];

    let box_shape = boxes.shape();
    if box_shape.len() != 3 || box_shape[0] != 1 || box_shape[2] != 4 {
        return Err(OcrError::shape("boxes [1, N, 4]", box_shape));
    }
    let slots = box_shape[1];

    let score_shape = scores.shape();
    if score_shape != [1, slots] {
        return Err(OcrError::shape(format!("scores [1, {}]", slots), score_shape));
    }

    let input_w = input_width as f32;
    let input_h = input_height as f32;
    let mut candidates = Vec::new();

    for slot in 0..slots {
        let score = scores[[0, slot]];
        if score < threshold {
            continue;
        }

        let ymin = boxes[[0, slot, 0]];
        let xmin = boxes[[0, slot, 1]];
        let ymax = boxes[[0, slot, 2]];
        let xmax = boxes[[0, slot, 3]];

        let w = (xmax - xmin) * input_w;
        let h = (ymax - ymin) * input_h;
        let center_x = xmin * input_w + w / 2.0;
        let center_y = ymin * input_h + h / 2.0;

        candidates.push(DetectionCandidate {
            rect: RotatedRect::new((center_x, center_y), (w, h), 0.0),
            confidence: score,
        });
    }

    debug!("Grid decoder produced {} candidates", candidates.len());
    Ok(candidates)
}
