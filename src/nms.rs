//! Rotated-box suppression
//!
//! Greedy non-max suppression generalized to rotated rectangles: candidates
//! are visited score-descending and kept unless they overlap an already-kept
//! box beyond the IoU threshold.

use std::cmp::Ordering;

use tracing::debug;

use crate::detect::DetectionCandidate;
use crate::geometry::rotated_iou;

/// Suppress overlapping candidates.
///
/// Returns the indices of surviving candidates in suppression decision order:
/// confidence descending, ties broken by lower original index. The
/// confidence threshold is re-applied here even though decoding already
/// enforced it, so the function stands alone on arbitrary input.
pub fn suppress(
    candidates: &[DetectionCandidate],
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len())
        .filter(|&i| candidates[i].confidence >= confidence_threshold)
        .collect();

    order.sort_by(|&a, &b| {
        candidates[b]
            .confidence
            .partial_cmp(&candidates[a].confidence)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut kept: Vec<usize> = Vec::new();
    for &index in &order {
        let suppressed = kept.iter().any(|&k| {
            rotated_iou(&candidates[index].rect, &candidates[k].rect) > iou_threshold
        });
        if !suppressed {
            kept.push(index);
        }
    }

    debug!("Suppression kept {} of {} candidates", kept.len(), candidates.len());
    kept
}
