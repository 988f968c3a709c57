//! scenetext - scene-text OCR from the command line
//!
//! Loads the detection and recognition models, runs the OCR pipeline over a
//! single image, prints the recognized strings, and optionally writes the
//! annotated copy of the input.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use scenetext::{load_config, DetectorKind, OcrPipeline, PipelineConfig};

/// Scene-text OCR pipeline
#[derive(Parser, Debug)]
#[command(name = "scenetext")]
#[command(about = "Detect and recognize text in an image")]
struct Args {
    /// Image to run OCR on
    image: PathBuf,

    /// Directory containing det_grid.onnx / det_east.onnx and rec.onnx
    #[arg(short, long, default_value = "models")]
    models: PathBuf,

    /// Detection model variant
    #[arg(short, long, value_enum, default_value = "grid")]
    detector: DetectorKind,

    /// Pipeline configuration file (TOML); overrides --detector
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the annotated image to this path
    #[arg(short, long)]
    annotated: Option<PathBuf>,

    /// Print results as JSON instead of plain lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => PipelineConfig {
            detector: args.detector,
            ..PipelineConfig::default()
        },
    };

    info!("Using {:?} detector", config.detector);

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open image {:?}", args.image))?
        .to_rgb8();

    let mut pipeline = OcrPipeline::from_model_dir(&args.models, config)?;
    let result = pipeline.run(&image)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "texts": result.texts }))?
        );
    } else if result.texts.is_empty() {
        println!("No text recognized");
    } else {
        for text in &result.texts {
            println!("{}", text);
        }
    }

    if let Some(path) = &args.annotated {
        result
            .annotated
            .save(path)
            .with_context(|| format!("Failed to save annotated image to {:?}", path))?;
        info!("Annotated image written to {:?}", path);
    }

    Ok(())
}
