//! Region rectification
//!
//! Perspective-corrects each surviving detection into the fixed-size upright
//! patch the recognizer expects, and draws the box outline onto the run's
//! annotated overlay. Both operations derive the corners the same way, so
//! what the overlay shows is exactly what the recognizer reads.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::error::OcrError;
use crate::geometry::{RotatedRect, ScaleRatios};

/// Outline color for annotated boxes.
const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Rectify one detection into a `target_width` x `target_height` patch.
///
/// The box corners are taken in grid space, scaled into source pixel space,
/// and mapped onto the canonical rectangle through a perspective transform.
/// As a side effect the four scaled edges are drawn onto `annotated`.
pub fn rectify_region(
    source: &RgbImage,
    rect: &RotatedRect,
    ratios: ScaleRatios,
    target_width: u32,
    target_height: u32,
    annotated: &mut RgbImage,
) -> Result<RgbImage, OcrError> {
    let scaled: Vec<(f32, f32)> = rect.corners().iter().map(|&p| ratios.apply(p)).collect();

    draw_outline(annotated, &scaled);

    // Corner order is bottom-left, top-left, top-right, bottom-right on both
    // sides of the mapping.
    let source_corners = [scaled[0], scaled[1], scaled[2], scaled[3]];
    let target_corners = [
        (0.0, (target_height - 1) as f32),
        (0.0, 0.0),
        ((target_width - 1) as f32, 0.0),
        ((target_width - 1) as f32, (target_height - 1) as f32),
    ];

    let projection = Projection::from_control_points(source_corners, target_corners)
        .ok_or_else(|| {
            OcrError::Rectify(format!("degenerate box corners {:?}", source_corners))
        })?;

    let mut patch = RgbImage::new(target_width, target_height);
    warp_into(
        source,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut patch,
    );

    Ok(patch)
}

/// Draw the four edges of a box onto the annotated overlay.
fn draw_outline(annotated: &mut RgbImage, corners: &[(f32, f32)]) {
    for i in 1..corners.len() {
        draw_line_segment_mut(annotated, corners[i - 1], corners[i], OUTLINE_COLOR);
    }
    draw_line_segment_mut(annotated, corners[0], corners[3], OUTLINE_COLOR);
}
