//! Pipeline Configuration
//!
//! Fixed model constants and tunable thresholds, loadable from TOML.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of sequential class indices the recognizer emits per region.
pub const RECOGNITION_OUTPUT_STEPS: usize = 48;

/// Detection model variant.
///
/// Both variants feed the same downstream stages; the choice is made once at
/// pipeline construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Fixed-anchor box regression over a 10-slot grid (MobileNet SSD head)
    #[default]
    Grid,
    /// Dense per-pixel geometry regression (EAST)
    East,
}

impl DetectorKind {
    /// Model input width in pixels.
    pub fn input_width(&self) -> u32 {
        match self {
            DetectorKind::Grid => 300,
            DetectorKind::East => 320,
        }
    }

    /// Model input height in pixels.
    pub fn input_height(&self) -> u32 {
        match self {
            DetectorKind::Grid => 300,
            DetectorKind::East => 320,
        }
    }

    /// Per-channel normalization means.
    pub fn means(&self) -> [f32; 3] {
        match self {
            DetectorKind::Grid => [127.5, 127.5, 127.5],
            DetectorKind::East => [103.94, 116.78, 123.68],
        }
    }

    /// Per-channel normalization standard deviations.
    pub fn stds(&self) -> [f32; 3] {
        match self {
            DetectorKind::Grid => [127.5, 127.5, 127.5],
            DetectorKind::East => [1.0, 1.0, 1.0],
        }
    }

    /// Model filename inside the model directory.
    pub fn filename(&self) -> &'static str {
        match self {
            DetectorKind::Grid => "det_grid.onnx",
            DetectorKind::East => "det_east.onnx",
        }
    }
}

/// Recognizer model filename inside the model directory.
pub const RECOGNITION_MODEL_FILENAME: &str = "rec.onnx";

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Detection model variant to load
    pub detector: DetectorKind,
    /// Minimum confidence for a decoded detection (0.0 - 1.0)
    pub detection_threshold: f32,
    /// Rotated IoU above which a lower-confidence box is suppressed
    pub nms_iou_threshold: f32,
    /// Characters the recognizer can emit, in class-index order
    pub alphabet: String,
    /// Rectified region width fed to the recognizer
    pub recognition_width: u32,
    /// Rectified region height fed to the recognizer
    pub recognition_height: u32,
    /// Recognizer input normalization mean
    pub recognition_mean: f32,
    /// Recognizer input normalization standard deviation
    pub recognition_std: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorKind::Grid,
            detection_threshold: 0.5,
            nms_iou_threshold: 0.4,
            alphabet: "0123456789abcdefghijklmnopqrstuvwxyz".to_string(),
            recognition_width: 200,
            recognition_height: 31,
            recognition_mean: 0.0,
            recognition_std: 255.0,
        }
    }
}

/// Load pipeline configuration from a TOML file
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save pipeline configuration to a TOML file
pub fn save_config(config: &PipelineConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.detector, DetectorKind::Grid);
        assert!((config.detection_threshold - 0.5).abs() < f32::EPSILON);
        assert!((config.nms_iou_threshold - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.alphabet.len(), 36);
        assert_eq!(config.recognition_width, 200);
        assert_eq!(config.recognition_height, 31);
        assert!((config.recognition_std - 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_detector_constants() {
        assert_eq!(DetectorKind::Grid.input_width(), 300);
        assert_eq!(DetectorKind::Grid.input_height(), 300);
        assert_eq!(DetectorKind::East.input_width(), 320);
        assert_eq!(DetectorKind::East.means(), [103.94, 116.78, 123.68]);
        assert_eq!(DetectorKind::Grid.stds(), [127.5, 127.5, 127.5]);
        assert_eq!(DetectorKind::Grid.filename(), "det_grid.onnx");
        assert_eq!(DetectorKind::East.filename(), "det_east.onnx");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PipelineConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.detector, parsed.detector);
        assert_eq!(config.alphabet, parsed.alphabet);
        assert_eq!(config.recognition_width, parsed.recognition_width);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = PipelineConfig::default();
        config.detector = DetectorKind::East;
        config.nms_iou_threshold = 0.3;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.detector, DetectorKind::East);
        assert!((loaded.nms_iou_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
