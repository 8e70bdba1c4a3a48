//! Core pipeline types: state snapshot, timings, and the output artifact

use crate::error::Result;
use crate::services::io::ImageIOService;
use crate::services::progress::PipelineStage;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot of the pipeline's user-visible state.
///
/// Progress is monotonically non-decreasing during one run and resets to 0
/// at the start of a new run or on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Current stage of the state machine
    pub stage: PipelineStage,
    /// Progress percentage in `[0, 100]`
    pub progress: u8,
    /// Human-readable status line
    pub status_message: String,
    /// Message of the error that aborted the last run, if any
    pub last_error: Option<String>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Idle,
            progress: 0,
            status_message: PipelineStage::Idle.description().to_string(),
            last_error: None,
        }
    }
}

/// Wall-clock timings of one pipeline run (milliseconds)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Model read and session creation (0 when the cached session is reused)
    pub model_load_ms: u64,
    /// Input decode
    pub decode_ms: u64,
    /// Tensor preparation
    pub preprocessing_ms: u64,
    /// Inference call
    pub inference_ms: u64,
    /// Output decode and compositing
    pub compositing_ms: u64,
    /// Whole run
    pub total_ms: u64,
}

/// Finished artifact of a successful run
#[derive(Debug, Clone)]
pub struct RemovalOutput {
    /// Composited result at full original resolution
    pub image: RgbaImage,
    /// Dimensions of the source image
    pub original_dimensions: (u32, u32),
    /// Per-stage timings of the producing run
    pub timings: ProcessingTimings,
}

impl RemovalOutput {
    /// Encode the artifact as lossless PNG bytes
    ///
    /// # Errors
    /// - [`crate::error::InpaintError::Composition`] when encoding fails
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        ImageIOService::encode_png(&self.image)
    }

    /// Write the artifact as lossless PNG
    ///
    /// # Errors
    /// - [`crate::error::InpaintError::Composition`] when encoding fails
    /// - [`crate::error::InpaintError::Io`] on write failure
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ImageIOService::save_png(&self.image, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_default_state_is_idle() {
        let state = PipelineState::default();
        assert_eq!(state.stage, PipelineStage::Idle);
        assert_eq!(state.progress, 0);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_output_png_round_trip() {
        let output = RemovalOutput {
            image: RgbaImage::from_pixel(5, 4, Rgba([9, 8, 7, 255])),
            original_dimensions: (5, 4),
            timings: ProcessingTimings::default(),
        };
        let bytes = output.to_png_bytes().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(2, 2).0, [9, 8, 7, 255]);
    }
}
