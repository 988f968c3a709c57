//! Pipeline orchestration
//!
//! Sequences detection decoding, rotated-box suppression, rectification, and
//! sequence decoding over a source image. Execution is single-threaded and
//! synchronous; every stage blocks until complete, and any backend failure
//! aborts the whole run. No state survives between runs - each invocation
//! builds its result from fresh values.

use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info};

use crate::backend::{InferenceBackend, OrtSession};
use crate::config::{PipelineConfig, RECOGNITION_MODEL_FILENAME};
use crate::decode::decode_sequence;
use crate::detect::decode_detections;
use crate::error::OcrError;
use crate::geometry::ScaleRatios;
use crate::nms::suppress;
use crate::preprocess::{detection_tensor, recognition_tensor};
use crate::rectify::rectify_region;

/// Result of one OCR run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Copy of the source image with every surviving box outlined
    pub annotated: RgbImage,
    /// Recognized strings in suppression order, empty decodes discarded
    pub texts: Vec<String>,
}

/// The OCR pipeline: one detector, one recognizer, fixed configuration.
///
/// The detector variant is chosen at construction through
/// [`PipelineConfig::detector`]; models are loaded once and shared read-only
/// across runs. Running takes `&mut self`, which serializes runs on a single
/// instance - concurrent processing needs one pipeline per thread.
pub struct OcrPipeline {
    detector: Box<dyn InferenceBackend>,
    recognizer: Box<dyn InferenceBackend>,
    config: PipelineConfig,
}

impl OcrPipeline {
    /// Build a pipeline from already-loaded backends.
    pub fn new(
        detector: Box<dyn InferenceBackend>,
        recognizer: Box<dyn InferenceBackend>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            recognizer,
            config,
        }
    }

    /// Load the configured detector model and the recognizer model from a
    /// directory of ONNX files.
    pub fn from_model_dir(model_dir: &Path, config: PipelineConfig) -> Result<Self, OcrError> {
        let detector = OrtSession::from_file(&model_dir.join(config.detector.filename()))?;
        let recognizer = OrtSession::from_file(&model_dir.join(RECOGNITION_MODEL_FILENAME))?;
        Ok(Self::new(Box::new(detector), Box::new(recognizer), config))
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run OCR over a source image.
    ///
    /// Zero detections is a quiet outcome: the annotated image equals the
    /// source and the text list is empty. Backend errors abort the run.
    pub fn run(&mut self, image: &RgbImage) -> Result<PipelineResult, OcrError> {
        let started = Instant::now();
        let kind = self.config.detector;

        // Grid-to-source mapping, computed once and reused for every box.
        let ratios = ScaleRatios::new(
            image.width(),
            image.height(),
            kind.input_width(),
            kind.input_height(),
        );

        let input = detection_tensor(
            image,
            kind.input_width(),
            kind.input_height(),
            kind.means(),
            kind.stds(),
        );
        let outputs = self.detector.invoke(input)?;
        let candidates = decode_detections(kind, &outputs, self.config.detection_threshold)?;

        if candidates.is_empty() {
            debug!("No text detected");
            return Ok(PipelineResult {
                annotated: image.clone(),
                texts: Vec::new(),
            });
        }

        let kept = suppress(
            &candidates,
            self.config.detection_threshold,
            self.config.nms_iou_threshold,
        );

        let mut annotated = image.clone();
        let mut texts = Vec::new();

        for &index in &kept {
            let patch = rectify_region(
                image,
                &candidates[index].rect,
                ratios,
                self.config.recognition_width,
                self.config.recognition_height,
                &mut annotated,
            )?;

            let recognition_input = recognition_tensor(
                &patch,
                self.config.recognition_width,
                self.config.recognition_height,
                self.config.recognition_mean,
                self.config.recognition_std,
            );
            let recognition_outputs = self.recognizer.invoke(recognition_input)?;
            let indices = recognition_outputs.first().ok_or_else(|| {
                OcrError::ShapeMismatch {
                    expected: "1 recognizer output tensor".to_string(),
                    actual: "0 outputs".to_string(),
                }
            })?;

            let text = decode_sequence(indices, &self.config.alphabet)?;
            if !text.is_empty() {
                texts.push(text);
            }
        }

        info!(
            "OCR complete in {:?}: {} candidates, {} kept, {} texts",
            started.elapsed(),
            candidates.len(),
            kept.len(),
            texts.len()
        );

        Ok(PipelineResult { annotated, texts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use ndarray::{Array, Array4, ArrayD};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Backend that replays fixed outputs and counts invocations.
    struct FakeBackend {
        outputs: Vec<ArrayD<f32>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeBackend {
        fn new(outputs: Vec<ArrayD<f32>>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let backend = Box::new(Self {
                outputs,
                calls: calls.clone(),
            });
            (backend, calls)
        }
    }

    impl InferenceBackend for FakeBackend {
        fn invoke(&mut self, _input: Array4<f32>) -> Result<Vec<ArrayD<f32>>, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outputs.clone())
        }
    }

    /// Backend that fails every invocation.
    struct FailingBackend;

    impl InferenceBackend for FailingBackend {
        fn invoke(&mut self, _input: Array4<f32>) -> Result<Vec<ArrayD<f32>>, OcrError> {
            Err(OcrError::Inference("forward pass failed".to_string()))
        }
    }

    /// Grid-detector outputs for a list of (center, size, confidence) boxes
    /// on a 300x300 input, padded to 10 slots.
    fn grid_outputs(boxes: &[((f32, f32), (f32, f32), f32)]) -> Vec<ArrayD<f32>> {
        let mut box_data = vec![0.0f32; 10 * 4];
        let mut score_data = vec![0.0f32; 10];

        for (slot, &((cx, cy), (w, h), confidence)) in boxes.iter().enumerate() {
            box_data[slot * 4] = (cy - h / 2.0) / 300.0;
            box_data[slot * 4 + 1] = (cx - w / 2.0) / 300.0;
            box_data[slot * 4 + 2] = (cy + h / 2.0) / 300.0;
            box_data[slot * 4 + 3] = (cx + w / 2.0) / 300.0;
            score_data[slot] = confidence;
        }

        vec![
            Array::from_shape_vec((1, 10, 4), box_data).unwrap().into_dyn(),
            Array::zeros((1, 10)).into_dyn(),
            Array::from_shape_vec((1, 10), score_data).unwrap().into_dyn(),
            Array::zeros(1).into_dyn(),
        ]
    }

    /// Recognizer output holding the given indices padded with filler.
    fn recognizer_outputs(indices: &[i64]) -> Vec<ArrayD<f32>> {
        let mut data = vec![99.0f32; 48];
        for (i, &index) in indices.iter().enumerate() {
            data[i] = index as f32;
        }
        vec![Array::from_shape_vec((1, 48), data).unwrap().into_dyn()]
    }

    fn pipeline_with(
        detector_outputs: Vec<ArrayD<f32>>,
        recognizer_indices: &[i64],
    ) -> (OcrPipeline, Arc<AtomicUsize>) {
        let (detector, _) = FakeBackend::new(detector_outputs);
        let (recognizer, recognizer_calls) =
            FakeBackend::new(recognizer_outputs(recognizer_indices));
        let pipeline = OcrPipeline::new(detector, recognizer, PipelineConfig::default());
        (pipeline, recognizer_calls)
    }

    #[test]
    fn test_no_detections_returns_source_unchanged() {
        let source = RgbImage::from_pixel(300, 300, Rgb([42, 42, 42]));
        let (detector, _) = FakeBackend::new(grid_outputs(&[]));
        let mut pipeline = OcrPipeline::new(
            detector,
            Box::new(FailingBackend),
            PipelineConfig::default(),
        );

        // The recognizer would fail if invoked; zero detections must short-
        // circuit before it.
        let result = pipeline.run(&source).unwrap();
        assert!(result.texts.is_empty());
        assert_eq!(result.annotated, source);
    }

    #[test]
    fn test_single_detection_recognized_and_annotated() {
        let source = RgbImage::from_pixel(300, 300, Rgb([42, 42, 42]));
        let (mut pipeline, recognizer_calls) = pipeline_with(
            grid_outputs(&[((150.0, 150.0), (100.0, 20.0), 0.9)]),
            &[10, 11, 12],
        );

        let result = pipeline.run(&source).unwrap();
        assert_eq!(result.texts, vec!["abc".to_string()]);
        assert_eq!(recognizer_calls.load(Ordering::SeqCst), 1);

        // The box outline lands on the annotated copy: top edge at y=140.
        assert_eq!(*result.annotated.get_pixel(150, 140), Rgb([0, 255, 0]));
        // The source itself is untouched.
        assert_eq!(*source.get_pixel(150, 140), Rgb([42, 42, 42]));
    }

    #[test]
    fn test_overlapping_boxes_recognize_only_survivor() {
        // IoU 0.6 between the two boxes: suppression keeps the 0.9 one.
        let source = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let (mut pipeline, recognizer_calls) = pipeline_with(
            grid_outputs(&[
                ((150.0, 150.0), (100.0, 20.0), 0.9),
                ((175.0, 150.0), (100.0, 20.0), 0.8),
            ]),
            &[0, 1],
        );

        let result = pipeline.run(&source).unwrap();
        assert_eq!(result.texts.len(), 1);
        assert_eq!(recognizer_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_decode_contributes_nothing() {
        let source = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let (mut pipeline, recognizer_calls) =
            pipeline_with(grid_outputs(&[((150.0, 150.0), (100.0, 20.0), 0.9)]), &[]);

        let result = pipeline.run(&source).unwrap();
        assert!(result.texts.is_empty());
        // The region was still recognized and its box still drawn.
        assert_eq!(recognizer_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*result.annotated.get_pixel(150, 140), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_recognizer_failure_aborts_run() {
        let source = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let (detector, _) =
            FakeBackend::new(grid_outputs(&[((150.0, 150.0), (100.0, 20.0), 0.9)]));
        let mut pipeline = OcrPipeline::new(
            detector,
            Box::new(FailingBackend),
            PipelineConfig::default(),
        );

        let result = pipeline.run(&source);
        assert!(matches!(result, Err(OcrError::Inference(_))));
    }

    #[test]
    fn test_detector_failure_aborts_run() {
        let source = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let (recognizer, _) = FakeBackend::new(recognizer_outputs(&[0]));
        let mut pipeline = OcrPipeline::new(
            Box::new(FailingBackend),
            recognizer,
            PipelineConfig::default(),
        );

        let result = pipeline.run(&source);
        assert!(matches!(result, Err(OcrError::Inference(_))));
    }

    #[test]
    fn test_consecutive_runs_share_no_state() {
        let source = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        let (mut pipeline, _) = pipeline_with(
            grid_outputs(&[((150.0, 150.0), (100.0, 20.0), 0.9)]),
            &[5, 6, 7],
        );

        let first = pipeline.run(&source).unwrap();
        let second = pipeline.run(&source).unwrap();

        assert_eq!(first.texts, second.texts);
        assert_eq!(second.texts, vec!["567".to_string()]);
    }
}
