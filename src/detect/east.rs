//! Geometry-map decoder
//!
//! Decodes a dense EAST-style head: a per-cell score map and a five-channel
//! geometry map (distances to the four box edges plus a rotation angle), with
//! a fixed stride of 4 between cells and source pixels.
//!
//! The offset/corner arithmetic below carries the model's sign and axis
//! conventions; the rectifier derives corners from the same conventions, so
//! any change here skews every rectified region.

use ndarray::ArrayD;
use tracing::debug;

use super::DetectionCandidate;
use crate::error::OcrError;
use crate::geometry::RotatedRect;

/// Output slot carrying `scores [1, H, W, 1]`.
const SLOT_SCORES: usize = 0;
/// Output slot carrying `geometry [1, H, W, 5]`.
const SLOT_GEOMETRY: usize = 1;

/// Source pixels per score-map cell.
const CELL_STRIDE: f32 = 4.0;

/// Decode geometry-map outputs into detection candidates.
pub fn decode(outputs: &[ArrayD<f32>], threshold: f32) -> Result<Vec<DetectionCandidate>, OcrError> {
    if outputs.len() <= SLOT_GEOMETRY {
        return Err(OcrError::ShapeMismatch {
            expected: "2 output tensors (scores, geometry)".to_string(),
            actual: format!("{} outputs", outputs.len()),
        });
    }

    let scores = &outputs[SLOT_SCORES];
    let geometry = &outputs[SLOT_GEOMETRY];

    let score_shape = scores.shape();
    if score_shape.len() != 4 || score_shape[0] != 1 || score_shape[3] != 1 {
        return Err(OcrError::shape("scores [1, H, W, 1]", score_shape));
    }
    let (rows, cols) = (score_shape[1], score_shape[2]);

    let geometry_shape = geometry.shape();
    if geometry_shape != [1, rows, cols, 5] {
        return Err(OcrError::shape(
            format!("geometry [1, {}, {}, 5]", rows, cols),
            geometry_shape,
        ));
    }

    let mut candidates = Vec::new();

    for y in 0..rows {
        for x in 0..cols {
            let score = scores[[0, y, x, 0]];
            if score < threshold {
                continue;
            }

            let d_top = geometry[[0, y, x, 0]];
            let d_right = geometry[[0, y, x, 1]];
            let d_bottom = geometry[[0, y, x, 2]];
            let d_left = geometry[[0, y, x, 3]];
            let angle = geometry[[0, y, x, 4]];

            let h = d_top + d_bottom;
            let w = d_right + d_left;

            let cos = angle.cos();
            let sin = angle.sin();

            let cell_x = x as f32 * CELL_STRIDE;
            let cell_y = y as f32 * CELL_STRIDE;

            let offset = (
                cell_x + cos * d_right + sin * d_bottom,
                cell_y - sin * d_right + cos * d_bottom,
            );

            let p1 = (offset.0 - sin * h, offset.1 - cos * h);
            let p3 = (offset.0 - cos * w, offset.1 + sin * w);
            let center = (0.5 * (p1.0 + p3.0), 0.5 * (p1.1 + p3.1));

            candidates.push(DetectionCandidate {
                rect: RotatedRect::new(center, (w, h), -angle.to_degrees()),
                confidence: score,
            });
        }
    }

    debug!("Geometry-map decoder produced {} candidates", candidates.len());
    Ok(candidates)
}
