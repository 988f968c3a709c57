//! Image preprocessing for the detection and recognition models
//!
//! Converts images into the NHWC float tensors the models expect: bilinear
//! resize to the exact model input size, optional grayscale conversion, and
//! per-channel mean/std normalization.

use image::{imageops::FilterType, RgbImage};
use ndarray::Array4;

/// Preprocess an image for a detection model.
///
/// Stretches to `target_width` x `target_height` (no aspect preservation),
/// then normalizes each channel as `(pixel - mean) / std`. Returns an NHWC
/// tensor of shape `[1, H, W, 3]`.
pub fn detection_tensor(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    means: [f32; 3],
    stds: [f32; 3],
) -> Array4<f32> {
    let resized = image::imageops::resize(image, target_width, target_height, FilterType::Triangle);

    let h = target_height as usize;
    let w = target_width as usize;
    let mut tensor = Array4::<f32>::zeros((1, h, w, 3));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = (pixel.0[c] as f32 - means[c]) / stds[c];
        }
    }

    tensor
}

/// Preprocess a rectified region for the recognition model.
///
/// Stretches to the target size, converts to grayscale by luminance, then
/// normalizes as `(pixel - mean) / std`. Returns an NHWC tensor of shape
/// `[1, H, W, 1]`.
pub fn recognition_tensor(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    mean: f32,
    std: f32,
) -> Array4<f32> {
    let resized = image::imageops::resize(image, target_width, target_height, FilterType::Triangle);

    let h = target_height as usize;
    let w = target_width as usize;
    let mut tensor = Array4::<f32>::zeros((1, h, w, 1));

    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        // Standard luminance weights
        let gray = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        tensor[[0, y as usize, x as usize, 0]] = (gray - mean) / std;
    }

    tensor
}
