#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Watermark Inpaint Library
//!
//! Removes bottom-right watermarks from images by running a LaMa-class
//! inpainting network over a masked region and compositing the result back
//! into the untouched full-resolution original.
//!
//! The pipeline converts an arbitrary-resolution image into the fixed-size
//! model input (image + mask tensors), invokes the network through ONNX
//! Runtime, decodes the output with a numeric-range classifier, and
//! stretch-blits the patch back over an extended blend region so the seam
//! disappears into regenerated pixels.
//!
//! ## Features
//!
//! - **Fixed bottom-right anchor**: region geometry driven by three
//!   configurable ratios (strict mask width/height, extended blend)
//! - **Single-slot session cache**: the model session persists across runs
//!   and is invalidated the moment the model source changes
//! - **State-machine orchestration**: strict stage sequence with monotonic
//!   progress and busy-rejection of overlapping runs
//! - **Lossless output**: full-resolution PNG artifact
//! - **CLI Integration**: optional command-line interface (enable with the
//!   `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use watermark_inpaint::{
//!     remove_watermark_from_bytes, ModelSource, ProcessorConfig,
//! };
//! use std::path::PathBuf;
//!
//! # async fn example(image_bytes: Vec<u8>) -> anyhow::Result<()> {
//! let config = ProcessorConfig::builder()
//!     .model(ModelSource::File(PathBuf::from("lama_fp32.onnx")))
//!     .build()?;
//!
//! let output = remove_watermark_from_bytes(&image_bytes, &config).await?;
//! output.save_png("cleaned.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Reusing the processor
//!
//! The one-shot functions above build a fresh pipeline per call, which
//! reloads the model session every time. For repeated runs hold on to a
//! [`WatermarkRemovalProcessor`] so the session slot stays warm:
//!
//! ```rust,no_run
//! use watermark_inpaint::{
//!     ModelSource, ProcessorConfig, WatermarkRemovalProcessor,
//! };
//! use std::path::PathBuf;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ProcessorConfig::builder()
//!     .model(ModelSource::File(PathBuf::from("lama_fp32.onnx")))
//!     .build()?;
//! let mut processor = WatermarkRemovalProcessor::new(config)?;
//! processor.preload_model()?;
//!
//! if let Some(output) = processor.process_file("photo.png").await? {
//!     output.save_png("photo-clean.png")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod composite;
pub mod config;
pub mod decode;
pub mod error;
pub mod inference;
pub mod models;
pub mod processor;
pub mod region;
pub mod services;
pub mod session_slot;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
#[cfg(feature = "onnx")]
pub use backends::OnnxBackend;
pub use composite::composite_patch;
pub use config::{
    ExecutionProvider, ProcessorConfig, ProcessorConfigBuilder, RegionRatios,
    DEFAULT_MODEL_INPUT_SIZE,
};
pub use decode::{classify_range, decode_output};
pub use error::{InpaintError, Result};
pub use inference::{BackendFactory, DefaultBackendFactory, InferenceBackend};
pub use models::{ModelArtifact, ModelIdentity, ModelSource};
pub use processor::WatermarkRemovalProcessor;
pub use region::{watermark_region, Region};
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, PipelineStage,
    ProgressReporter, ProgressUpdate, StageCeilings,
};
pub use session_slot::SessionSlot;
pub use types::{PipelineState, ProcessingTimings, RemovalOutput};
pub use utils::{ModelInputAdapter, ModelInputs};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Remove the watermark from an image provided as bytes.
///
/// Builds a fresh pipeline for the call; prefer holding a
/// [`WatermarkRemovalProcessor`] when processing more than one image with
/// the same model.
///
/// # Errors
/// - Any pipeline stage error (see [`InpaintError`])
pub async fn remove_watermark_from_bytes(
    image_bytes: &[u8],
    config: &ProcessorConfig,
) -> Result<RemovalOutput> {
    let mut processor = WatermarkRemovalProcessor::new(config.clone())?;
    processor
        .process_bytes(image_bytes)?
        .ok_or_else(|| InpaintError::internal("Fresh pipeline reported busy"))
}

/// Remove the watermark from an already decoded image.
///
/// # Errors
/// - Any pipeline stage error (see [`InpaintError`])
pub async fn remove_watermark_from_image(
    image: &image::DynamicImage,
    config: &ProcessorConfig,
) -> Result<RemovalOutput> {
    let mut processor = WatermarkRemovalProcessor::new(config.clone())?;
    processor
        .process_image(image)?
        .ok_or_else(|| InpaintError::internal("Fresh pipeline reported busy"))
}

/// Remove the watermark from an image supplied by an async reader stream.
///
/// # Errors
/// - [`InpaintError::Io`] when the stream cannot be read
/// - Any pipeline stage error (see [`InpaintError`])
pub async fn remove_watermark_from_reader<R: AsyncRead + Unpin>(
    reader: R,
    config: &ProcessorConfig,
) -> Result<RemovalOutput> {
    let mut processor = WatermarkRemovalProcessor::new(config.clone())?;
    processor
        .process_reader(reader)
        .await?
        .ok_or_else(|| InpaintError::internal("Fresh pipeline reported busy"))
}
