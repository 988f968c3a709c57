//! Sequence decoding
//!
//! Maps the recognizer's fixed-length run of raw class indices onto the
//! alphabet. Out-of-range indices act as blank/filler tokens and are skipped;
//! in-range indices are appended literally, in position order, without
//! collapsing consecutive repeats.

use ndarray::ArrayD;

use crate::config::RECOGNITION_OUTPUT_STEPS;
use crate::error::OcrError;

/// Decode one recognizer output into text.
///
/// The output must carry exactly [`RECOGNITION_OUTPUT_STEPS`] values
/// regardless of its shape; each is rounded to an integer class index. An
/// empty result means the region contributes nothing, which is a normal
/// outcome rather than an error.
pub fn decode_sequence(output: &ArrayD<f32>, alphabet: &str) -> Result<String, OcrError> {
    if output.len() != RECOGNITION_OUTPUT_STEPS {
        return Err(OcrError::shape(
            format!("{} class indices", RECOGNITION_OUTPUT_STEPS),
            output.shape(),
        ));
    }

    let symbols: Vec<char> = alphabet.chars().collect();
    let mut text = String::new();

    for &value in output.iter() {
        let index = value.round() as i64;
        if index >= 0 && (index as usize) < symbols.len() {
            text.push(symbols[index as usize]);
        }
    }

    Ok(text)
}
