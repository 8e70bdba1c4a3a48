//! Progress reporting service
//!
//! Separates progress presentation from pipeline logic: the orchestrator
//! reports stage transitions through the [`ProgressReporter`] trait, and the
//! per-stage percentage ceilings live in a plain data table so UI changes
//! never touch control flow.

use crate::error::{InpaintError, Result};
use instant::Instant;
use serde::{Deserialize, Serialize};

/// Stages of the watermark removal pipeline.
///
/// Transitions are strictly sequential: `Idle -> ModelLoading -> Reading ->
/// Preprocessing -> Inference -> Compositing -> Done`, with `Error` reachable
/// from any active stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// No run in progress
    Idle,
    /// Reading the model artifact and building the session
    ModelLoading,
    /// Reading and decoding the input image
    Reading,
    /// Building the image and mask tensors
    Preprocessing,
    /// Running the inpainting network
    Inference,
    /// Decoding the output and compositing the full-resolution result
    Compositing,
    /// Run finished successfully, artifact available
    Done,
    /// Run aborted; see the pipeline state's last error
    Error,
}

impl PipelineStage {
    /// Whether a run is currently active. New run requests are rejected as
    /// no-ops while this is true; the busy guard is part of the state
    /// machine, not a separate flag.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::ModelLoading
                | Self::Reading
                | Self::Preprocessing
                | Self::Inference
                | Self::Compositing
        )
    }

    /// Whether the stage accepts a new run request
    #[must_use]
    pub fn accepts_new_run(self) -> bool {
        matches!(self, Self::Idle | Self::Done | Self::Error)
    }

    /// Get a human-readable description of the stage
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "Waiting for input",
            Self::ModelLoading => "Loading inpainting model",
            Self::Reading => "Reading input image",
            Self::Preprocessing => "Preparing model input",
            Self::Inference => "Running AI inpainting",
            Self::Compositing => "Compositing full-resolution result",
            Self::Done => "Processing completed",
            Self::Error => "Processing failed",
        }
    }
}

/// Per-stage progress ceilings used purely for user feedback.
///
/// A stage may report any value up to its ceiling while working; the values
/// carry no scheduling meaning. Callers with different UI pacing can supply
/// their own table through the config builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCeilings {
    /// Progress when the model session is ready
    pub model_loading: u8,
    /// Progress when the input image is decoded
    pub reading: u8,
    /// Progress when both tensors are built
    pub preprocessing: u8,
    /// Progress when inference returns
    pub inference: u8,
    /// Progress when the final artifact is composited
    pub compositing: u8,
}

impl Default for StageCeilings {
    fn default() -> Self {
        Self {
            model_loading: 50,
            reading: 65,
            preprocessing: 80,
            inference: 92,
            compositing: 100,
        }
    }
}

impl StageCeilings {
    /// Ceiling for a stage; terminal stages map to their natural endpoints.
    #[must_use]
    pub fn ceiling(&self, stage: PipelineStage) -> u8 {
        match stage {
            PipelineStage::Idle | PipelineStage::Error => 0,
            PipelineStage::ModelLoading => self.model_loading,
            PipelineStage::Reading => self.reading,
            PipelineStage::Preprocessing => self.preprocessing,
            PipelineStage::Inference => self.inference,
            PipelineStage::Compositing => self.compositing,
            PipelineStage::Done => 100,
        }
    }

    /// Validate that ceilings are non-decreasing and end at 100.
    ///
    /// # Errors
    /// - [`InpaintError::InvalidConfig`] when the table is not monotonic
    pub fn validate(&self) -> Result<()> {
        let sequence = [
            self.model_loading,
            self.reading,
            self.preprocessing,
            self.inference,
            self.compositing,
        ];
        if sequence.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(InpaintError::invalid_config(
                "Stage ceilings must be monotonically non-decreasing",
            ));
        }
        if self.compositing != 100 {
            return Err(InpaintError::invalid_config(
                "Compositing ceiling must be 100",
            ));
        }
        Ok(())
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable status message
    pub message: String,
    /// Elapsed time since the run started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update with the stage's default description
    #[must_use]
    pub fn new(stage: PipelineStage, progress: u8, start_time: Instant) -> Self {
        Self {
            stage,
            progress,
            message: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Create a progress update with a custom message
    #[must_use]
    pub fn with_message(
        stage: PipelineStage,
        progress: u8,
        message: String,
        start_time: Instant,
    ) -> Self {
        Self {
            stage,
            progress,
            message,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Trait for reporting progress during watermark removal
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report an error during processing
    fn report_error(&self, stage: PipelineStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {
        // Intentionally empty - discards progress updates
    }

    fn report_error(&self, _stage: PipelineStage, _error: &str) {
        // Intentionally empty - discards error reports
    }
}

/// Console progress reporter that logs progress through the `log` facade
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.message,
                update.elapsed_ms
            );
        } else {
            log::info!("[{}%] {}", update.progress, update.message);
        }
    }

    fn report_error(&self, stage: PipelineStage, error: &str) {
        log::error!("Error during {}: {}", stage.description(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_stages() {
        assert!(PipelineStage::Inference.is_active());
        assert!(PipelineStage::ModelLoading.is_active());
        assert!(!PipelineStage::Idle.is_active());
        assert!(!PipelineStage::Done.is_active());
        assert!(!PipelineStage::Error.is_active());

        assert!(PipelineStage::Idle.accepts_new_run());
        assert!(PipelineStage::Done.accepts_new_run());
        assert!(PipelineStage::Error.accepts_new_run());
        assert!(!PipelineStage::Compositing.accepts_new_run());
    }

    #[test]
    fn test_default_ceilings() {
        let ceilings = StageCeilings::default();
        assert_eq!(ceilings.ceiling(PipelineStage::ModelLoading), 50);
        assert_eq!(ceilings.ceiling(PipelineStage::Reading), 65);
        assert_eq!(ceilings.ceiling(PipelineStage::Preprocessing), 80);
        assert_eq!(ceilings.ceiling(PipelineStage::Inference), 92);
        assert_eq!(ceilings.ceiling(PipelineStage::Compositing), 100);
        assert_eq!(ceilings.ceiling(PipelineStage::Done), 100);
        assert_eq!(ceilings.ceiling(PipelineStage::Idle), 0);
        assert!(ceilings.validate().is_ok());
    }

    #[test]
    fn test_ceiling_validation_rejects_non_monotonic() {
        let ceilings = StageCeilings {
            model_loading: 70,
            reading: 65,
            ..StageCeilings::default()
        };
        assert!(ceilings.validate().is_err());

        let ceilings = StageCeilings {
            compositing: 99,
            inference: 92,
            ..StageCeilings::default()
        };
        assert!(ceilings.validate().is_err());
    }

    #[test]
    fn test_progress_update_message() {
        let start = Instant::now();
        let update = ProgressUpdate::new(PipelineStage::Inference, 85, start);
        assert_eq!(update.progress, 85);
        assert_eq!(update.message, "Running AI inpainting");

        let custom = ProgressUpdate::with_message(
            PipelineStage::Reading,
            60,
            "Reading photo.png".to_string(),
            start,
        );
        assert_eq!(custom.message, "Reading photo.png");
    }
}
