//! scenetext - scene-text OCR pipeline
//!
//! Chains a text-detection model with a text-recognition model and bridges
//! their outputs with classical image geometry: raw detector tensors are
//! decoded into oriented text boxes, overlapping boxes are suppressed,
//! survivors are perspective-rectified into canonical patches, and the
//! recognizer's per-step class indices are decoded into text.
//!
//! Model execution itself lives behind the [`backend::InferenceBackend`]
//! trait; an ONNX Runtime implementation is provided.

pub mod backend;
pub mod config;
pub mod decode;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod nms;
pub mod preprocess;
pub mod rectify;

mod pipeline;

pub use backend::{InferenceBackend, OrtSession};
pub use config::{load_config, save_config, DetectorKind, PipelineConfig};
pub use detect::DetectionCandidate;
pub use error::OcrError;
pub use geometry::{RotatedRect, ScaleRatios};
pub use pipeline::{OcrPipeline, PipelineResult};
