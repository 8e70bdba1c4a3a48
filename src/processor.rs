//! Watermark removal pipeline orchestrator
//!
//! Sequences model loading, input decode, preprocessing, inference, and
//! compositing as a strict state machine with monotonic progress. The
//! orchestrator owns the single-slot session cache and is the one place
//! where stage failures become user-facing status.

use crate::{
    composite::composite_patch,
    config::ProcessorConfig,
    decode::decode_output,
    error::{InpaintError, Result},
    inference::{BackendFactory, DefaultBackendFactory},
    models::ModelSource,
    services::io::ImageIOService,
    services::progress::{
        NoOpProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
    },
    session_slot::SessionSlot,
    types::{PipelineState, ProcessingTimings, RemovalOutput},
    utils::ModelInputAdapter,
};
use image::{DynamicImage, RgbaImage};
use instant::Instant;
use log::{debug, warn};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Mutex;
use tracing::{instrument, span, Level};

/// Input handed to one pipeline run
enum PipelineInput<'a> {
    /// Raw raster bytes, decoded during the Reading stage
    Bytes(&'a [u8]),
    /// An already decoded image
    Decoded(&'a DynamicImage),
}

/// Orchestrator for the watermark removal pipeline
pub struct WatermarkRemovalProcessor {
    config: ProcessorConfig,
    backend_factory: Box<dyn BackendFactory>,
    session: Mutex<SessionSlot>,
    reporter: Box<dyn ProgressReporter>,
    state: PipelineState,
    output: Option<RemovalOutput>,
}

impl WatermarkRemovalProcessor {
    /// Create a new processor with the default backend factory
    ///
    /// # Errors
    ///
    /// Returns [`InpaintError::InvalidConfig`] for invalid configurations.
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        Self::with_factory(config, Box::new(DefaultBackendFactory))
    }

    /// Create a new processor with a custom backend factory
    ///
    /// # Errors
    ///
    /// Returns [`InpaintError::InvalidConfig`] for invalid configurations.
    pub fn with_factory(
        config: ProcessorConfig,
        backend_factory: Box<dyn BackendFactory>,
    ) -> Result<Self> {
        config.ceilings.validate()?;
        Ok(Self {
            config,
            backend_factory,
            session: Mutex::new(SessionSlot::new()),
            reporter: Box::new(NoOpProgressReporter),
            state: PipelineState::default(),
            output: None,
        })
    }

    /// Install a progress reporter for subsequent runs
    pub fn set_progress_reporter(&mut self, reporter: Box<dyn ProgressReporter>) {
        self.reporter = reporter;
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Snapshot of the pipeline's user-visible state
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Artifact of the last fully successful run, if one is available
    #[must_use]
    pub fn last_output(&self) -> Option<&RemovalOutput> {
        self.output.as_ref()
    }

    /// Drop any retained artifact and return the pipeline to idle
    pub fn clear(&mut self) {
        self.output = None;
        self.state = PipelineState::default();
    }

    /// Swap the model source.
    ///
    /// The cached session is invalidated immediately and unconditionally,
    /// even mid-preparation for a future run; the next run performs a full
    /// reload.
    ///
    /// # Errors
    /// - [`InpaintError::Internal`] when the session slot lock is poisoned
    pub fn set_model(&mut self, source: ModelSource) -> Result<()> {
        debug!("Model source set to {}", source.display_name());
        self.config.model = Some(source);
        self.invalidate_session()
    }

    /// Explicitly drop the cached model session
    ///
    /// # Errors
    /// - [`InpaintError::Internal`] when the session slot lock is poisoned
    pub fn invalidate_session(&mut self) -> Result<()> {
        self.lock_session()?.invalidate();
        Ok(())
    }

    /// Warm the model session ahead of the first run.
    ///
    /// A no-op while a run is active. On success the pipeline returns to
    /// idle with the session cached; on failure the state machine enters
    /// `Error` exactly as a failing run would.
    ///
    /// # Errors
    /// - [`InpaintError::ModelMissing`] when no model source is configured
    /// - [`InpaintError::ModelLoad`] on read or session-creation failure
    pub fn preload_model(&mut self) -> Result<()> {
        if !self.state.stage.accepts_new_run() {
            warn!("Preload request ignored: a run is active");
            return Ok(());
        }
        let start = Instant::now();
        self.state.last_error = None;
        self.enter_stage(PipelineStage::ModelLoading, start);
        match self.ensure_session(start) {
            Ok(()) => {
                self.complete_stage(PipelineStage::ModelLoading, start);
                self.state.stage = PipelineStage::Idle;
                self.state.status_message = "Model ready".to_string();
                Ok(())
            },
            Err(err) => {
                self.fail(&err);
                Err(err)
            },
        }
    }

    /// Process an image file.
    ///
    /// Reads the file through the async runtime, then runs the pipeline.
    /// Returns `Ok(None)` when a run is already active (the request is
    /// ignored, not queued).
    ///
    /// # Errors
    /// - [`InpaintError::Io`] when the input cannot be read
    /// - Any pipeline stage error (see [`InpaintError`])
    pub async fn process_file<P: AsRef<Path>>(
        &mut self,
        input_path: P,
    ) -> Result<Option<RemovalOutput>> {
        let bytes = ImageIOService::read_bytes(input_path.as_ref()).await?;
        self.process_bytes(&bytes)
    }

    /// Process image data from raw raster bytes.
    ///
    /// Returns `Ok(None)` when a run is already active.
    ///
    /// # Errors
    /// - Any pipeline stage error (see [`InpaintError`])
    pub fn process_bytes(&mut self, image_bytes: &[u8]) -> Result<Option<RemovalOutput>> {
        self.run_pipeline(PipelineInput::Bytes(image_bytes))
    }

    /// Process an image from an async reader stream.
    ///
    /// Returns `Ok(None)` when a run is already active.
    ///
    /// # Errors
    /// - [`InpaintError::Io`] when the stream cannot be read
    /// - Any pipeline stage error (see [`InpaintError`])
    pub async fn process_reader<R: tokio::io::AsyncRead + Unpin>(
        &mut self,
        mut reader: R,
    ) -> Result<Option<RemovalOutput>> {
        use tokio::io::AsyncReadExt;

        let mut buffer = Vec::new();
        AsyncReadExt::read_to_end(&mut reader, &mut buffer)
            .await
            .map_err(InpaintError::Io)?;
        self.process_bytes(&buffer)
    }

    /// Process an already decoded image.
    ///
    /// Returns `Ok(None)` when a run is already active.
    ///
    /// # Errors
    /// - Any pipeline stage error (see [`InpaintError`])
    #[instrument(
        skip(self, image),
        fields(dimensions = %format!("{}x{}", image.width(), image.height()))
    )]
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<Option<RemovalOutput>> {
        self.run_pipeline(PipelineInput::Decoded(image))
    }

    /// Run the full stage sequence for one input
    fn run_pipeline(&mut self, input: PipelineInput<'_>) -> Result<Option<RemovalOutput>> {
        if !self.state.stage.accepts_new_run() {
            warn!(
                "Run request ignored: pipeline is busy ({:?})",
                self.state.stage
            );
            return Ok(None);
        }

        // A previously displayed success is dropped up front: a failed
        // attempt must not leave a stale prior result visible.
        self.output = None;
        self.state = PipelineState::default();

        let start = Instant::now();
        let mut timings = ProcessingTimings::default();

        match self.execute_stages(input, start, &mut timings) {
            Ok((image, original_dimensions)) => {
                timings.total_ms = start.elapsed().as_millis() as u64;
                self.state.stage = PipelineStage::Done;
                self.state.progress = 100;
                self.state.status_message = PipelineStage::Done.description().to_string();
                self.reporter
                    .report_progress(ProgressUpdate::new(PipelineStage::Done, 100, start));
                debug!("Run complete in {}ms", timings.total_ms);

                let output = RemovalOutput {
                    image,
                    original_dimensions,
                    timings,
                };
                self.output = Some(output.clone());
                Ok(Some(output))
            },
            Err(err) => {
                self.fail(&err);
                Err(err)
            },
        }
    }

    /// Execute the sequential stages, returning the composited canvas
    fn execute_stages(
        &mut self,
        input: PipelineInput<'_>,
        start: Instant,
        timings: &mut ProcessingTimings,
    ) -> Result<(RgbaImage, (u32, u32))> {
        // Model loading
        self.enter_stage(PipelineStage::ModelLoading, start);
        let stage_start = Instant::now();
        self.ensure_session(start)?;
        timings.model_load_ms = stage_start.elapsed().as_millis() as u64;
        self.complete_stage(PipelineStage::ModelLoading, start);

        // Reading
        self.enter_stage(PipelineStage::Reading, start);
        let stage_start = Instant::now();
        let image: Cow<'_, DynamicImage> = match input {
            PipelineInput::Bytes(bytes) => Cow::Owned(ImageIOService::decode_image(bytes)?),
            PipelineInput::Decoded(image) => Cow::Borrowed(image),
        };
        let original_dimensions = (image.width(), image.height());
        timings.decode_ms = stage_start.elapsed().as_millis() as u64;
        self.complete_stage(PipelineStage::Reading, start);

        // Preprocessing
        let inputs = {
            let _span = span!(
                Level::DEBUG,
                "preprocessing",
                width = original_dimensions.0,
                height = original_dimensions.1
            )
            .entered();
            self.enter_stage(PipelineStage::Preprocessing, start);
            let stage_start = Instant::now();
            let inputs = ModelInputAdapter::prepare(
                &image,
                self.config.model_input_size,
                &self.config.ratios,
            )?;
            timings.preprocessing_ms = stage_start.elapsed().as_millis() as u64;
            self.complete_stage(PipelineStage::Preprocessing, start);
            inputs
        };

        // Inference
        let output_tensor = {
            let _span = span!(Level::INFO, "inference").entered();
            self.enter_stage(PipelineStage::Inference, start);
            let stage_start = Instant::now();
            let tensor = {
                let mut slot = self.lock_session()?;
                slot.backend_mut()?.infer(&inputs)?
            };
            timings.inference_ms = stage_start.elapsed().as_millis() as u64;
            self.complete_stage(PipelineStage::Inference, start);
            tensor
        };

        // Compositing
        let canvas = {
            let _span = span!(Level::DEBUG, "compositing").entered();
            self.enter_stage(PipelineStage::Compositing, start);
            let stage_start = Instant::now();
            let patch = decode_output(&output_tensor)?;
            let canvas = composite_patch(
                &image,
                &patch,
                self.config.model_input_size,
                &self.config.ratios,
            )?;
            timings.compositing_ms = stage_start.elapsed().as_millis() as u64;
            self.complete_stage(PipelineStage::Compositing, start);
            canvas
        };

        Ok((canvas, original_dimensions))
    }

    /// Make sure the session slot holds a ready backend for the configured
    /// model, reloading on identity mismatch.
    fn ensure_session(&mut self, start: Instant) -> Result<()> {
        let source = self.config.model.clone().ok_or(InpaintError::ModelMissing)?;
        let identity = source.identity()?;

        let warm = self.lock_session()?.is_warm(&identity);
        if warm {
            debug!("Reusing cached model session {identity}");
            return Ok(());
        }

        self.advance(
            10,
            format!("Loading model {}...", source.display_name()),
            start,
        );
        let artifact = source.load()?;
        self.advance(40, "Creating inference session...".to_string(), start);

        let mut backend = self.backend_factory.create_backend()?;
        backend.initialize(&artifact, &self.config)?;
        self.lock_session()?.install(identity, backend);
        Ok(())
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, SessionSlot>> {
        self.session
            .lock()
            .map_err(|_| InpaintError::internal("Session slot lock poisoned"))
    }

    /// Move the state machine into a stage and report the transition
    fn enter_stage(&mut self, stage: PipelineStage, start: Instant) {
        debug!("Stage: {stage:?}");
        self.state.stage = stage;
        self.state.status_message = stage.description().to_string();
        self.reporter
            .report_progress(ProgressUpdate::new(stage, self.state.progress, start));
    }

    /// Advance progress to the stage's ceiling once its work is done
    fn complete_stage(&mut self, stage: PipelineStage, start: Instant) {
        let ceiling = self.config.ceilings.ceiling(stage);
        self.advance(ceiling, stage.description().to_string(), start);
    }

    /// Report progress, capped at the current stage's ceiling and never
    /// moving backwards within a run.
    fn advance(&mut self, progress: u8, message: String, start: Instant) {
        let ceiling = self.config.ceilings.ceiling(self.state.stage);
        let capped = progress.min(ceiling);
        if capped > self.state.progress {
            self.state.progress = capped;
        }
        self.state.status_message.clone_from(&message);
        self.reporter.report_progress(ProgressUpdate::with_message(
            self.state.stage,
            self.state.progress,
            message,
            start,
        ));
    }

    /// Abort the run: stage becomes Error, progress resets, the error
    /// message becomes the user-facing status.
    fn fail(&mut self, err: &InpaintError) {
        let failed_stage = self.state.stage;
        self.reporter.report_error(failed_stage, &err.to_string());
        self.state.stage = PipelineStage::Error;
        self.state.progress = 0;
        self.state.last_error = Some(err.to_string());
        self.state.status_message = format!("Processing failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::{MockBackendFactory, MockBehavior};
    use crate::config::{ProcessorConfig, RegionRatios};
    use image::Rgba;
    use std::path::PathBuf;

    fn memory_model(name: &str, fill: u8) -> ModelSource {
        ModelSource::Memory {
            name: name.to_string(),
            bytes: vec![fill; 64],
        }
    }

    fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[test]
    fn test_successful_run_reaches_done() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("lama_fp32.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(100, 80, [120, 64, 200, 255]);
        let output = processor.process_image(&image).unwrap().unwrap();

        assert_eq!(processor.state().stage, PipelineStage::Done);
        assert_eq!(processor.state().progress, 100);
        assert!(processor.state().last_error.is_none());
        assert_eq!(output.original_dimensions, (100, 80));
        assert_eq!(output.image.dimensions(), (100, 80));
        assert!(processor.last_output().is_some());
    }

    #[test]
    fn test_identity_round_trip_preserves_solid_color() {
        // Solid color through stretch, identity "network", decode, and
        // composite must come back within rounding tolerance everywhere.
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("lama_fp32.onnx", 1))
            .model_input_size(64)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let color = [120u8, 64, 200];
        let image = solid_image(100, 80, [color[0], color[1], color[2], 255]);
        let output = processor.process_image(&image).unwrap().unwrap();

        for (_, _, pixel) in output.image.enumerate_pixels() {
            for c in 0..3 {
                let diff = i16::from(pixel[c]) - i16::from(color[c]);
                assert!(diff.abs() <= 1, "channel {c} off by {diff}");
            }
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_all_ones_output_patches_white() {
        let factory = MockBackendFactory::new(MockBehavior::SolidNormalized(1.0));
        let config = ProcessorConfig::builder()
            .model(memory_model("lama_fp32.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(200, 200, [0, 0, 0, 255]);
        let output = processor.process_image(&image).unwrap().unwrap();

        // Extended region at 0.16 on 200x200 is {x: 168, y: 168, 32x32}
        assert_eq!(output.image.get_pixel(199, 199).0, [255, 255, 255, 255]);
        assert_eq!(output.image.get_pixel(168, 168).0, [255, 255, 255, 255]);
        // Untouched outside the blend region
        assert_eq!(output.image.get_pixel(167, 167).0, [0, 0, 0, 255]);
        assert_eq!(output.image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_busy_pipeline_ignores_new_run() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("lama_fp32.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        // Simulate an in-flight run
        processor.state.stage = PipelineStage::Inference;
        processor.state.progress = 85;
        processor.state.status_message = "Running AI inpainting".to_string();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        let result = processor.process_image(&image).unwrap();
        assert!(result.is_none());

        // First run's state is unaffected by the rejected request
        assert_eq!(processor.state().stage, PipelineStage::Inference);
        assert_eq!(processor.state().progress, 85);
        assert_eq!(processor.state().status_message, "Running AI inpainting");
    }

    #[test]
    fn test_missing_model_fails_run() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder().model_input_size(32).build().unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        let err = processor.process_image(&image).unwrap_err();
        assert!(matches!(err, InpaintError::ModelMissing));
        assert_eq!(processor.state().stage, PipelineStage::Error);
        assert_eq!(processor.state().progress, 0);
        assert!(processor.state().last_error.is_some());
    }

    #[test]
    fn test_inference_failure_resets_progress() {
        let factory = MockBackendFactory::new(MockBehavior::FailInference);
        let config = ProcessorConfig::builder()
            .model(memory_model("lama_fp32.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        let err = processor.process_image(&image).unwrap_err();
        assert!(matches!(err, InpaintError::Inference(_)));
        assert_eq!(processor.state().stage, PipelineStage::Error);
        assert_eq!(processor.state().progress, 0);
        assert!(processor.last_output().is_none());
    }

    #[test]
    fn test_failing_run_clears_previous_result() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("lama_fp32.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        processor.process_image(&image).unwrap();
        assert!(processor.last_output().is_some());

        // Point the processor at a model that cannot be read; the next run
        // fails during model loading and must not retain the stale success.
        processor
            .set_model(ModelSource::File(PathBuf::from("/nonexistent/b.onnx")))
            .unwrap();
        let err = processor.process_image(&image).unwrap_err();
        assert!(matches!(err, InpaintError::ModelLoad(_)));
        assert!(processor.last_output().is_none());
        assert_eq!(processor.state().progress, 0);
    }

    #[test]
    fn test_session_reused_across_runs() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let stats = factory.stats();
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        processor.process_image(&image).unwrap();
        processor.process_image(&image).unwrap();

        assert_eq!(stats.initializations(), 1);
        assert_eq!(stats.inferences(), 2);
    }

    #[test]
    fn test_model_swap_invalidates_session() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let stats = factory.stats();
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        processor.process_image(&image).unwrap();
        assert_eq!(stats.initializations(), 1);

        // Swapping to model B drops A's session; the next run fully reloads
        processor.set_model(memory_model("model-b.onnx", 2)).unwrap();
        processor.process_image(&image).unwrap();
        assert_eq!(stats.initializations(), 2);
    }

    #[test]
    fn test_preload_warms_session() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let stats = factory.stats();
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        processor.preload_model().unwrap();
        assert_eq!(stats.initializations(), 1);
        assert_eq!(processor.state().stage, PipelineStage::Idle);
        assert_eq!(processor.state().status_message, "Model ready");

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        processor.process_image(&image).unwrap();
        assert_eq!(stats.initializations(), 1);
    }

    #[test]
    fn test_clear_resets_state_and_output() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        processor.process_image(&image).unwrap();
        processor.clear();

        assert!(processor.last_output().is_none());
        assert_eq!(processor.state().stage, PipelineStage::Idle);
        assert_eq!(processor.state().progress, 0);
    }

    #[test]
    fn test_process_bytes_decodes_input() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(40, 30, [10, 20, 30, 255]);
        let bytes = ImageIOService::encode_png(&image.to_rgba8()).unwrap();
        let output = processor.process_bytes(&bytes).unwrap().unwrap();
        assert_eq!(output.original_dimensions, (40, 30));

        let err = processor.process_bytes(b"garbage").unwrap_err();
        assert!(matches!(err, InpaintError::Decode(_)));
        assert_eq!(processor.state().stage, PipelineStage::Error);
    }

    #[test]
    fn test_progress_is_monotonic_during_run() {
        use std::sync::{Arc, Mutex as StdMutex};

        struct RecordingReporter {
            seen: Arc<StdMutex<Vec<u8>>>,
        }
        impl ProgressReporter for RecordingReporter {
            fn report_progress(&self, update: ProgressUpdate) {
                self.seen.lock().unwrap().push(update.progress);
            }
            fn report_error(&self, _stage: PipelineStage, _error: &str) {}
        }

        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        processor.set_progress_reporter(Box::new(RecordingReporter {
            seen: Arc::clone(&seen),
        }));

        let image = solid_image(50, 50, [1, 2, 3, 255]);
        processor.process_image(&image).unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]), "{seen:?}");
        assert_eq!(*seen.last().unwrap(), 100);
    }

    #[test]
    fn test_custom_ratios_flow_through() {
        let factory = MockBackendFactory::new(MockBehavior::SolidNormalized(1.0));
        let ratios = RegionRatios {
            width_ratio: 0.25,
            height_ratio: 0.25,
            extended_ratio: 0.5,
        };
        let config = ProcessorConfig::builder()
            .model(memory_model("model-a.onnx", 1))
            .model_input_size(32)
            .ratios(ratios)
            .build()
            .unwrap();
        let mut processor =
            WatermarkRemovalProcessor::with_factory(config, Box::new(factory)).unwrap();

        let image = solid_image(100, 100, [0, 0, 0, 255]);
        let output = processor.process_image(&image).unwrap().unwrap();

        // Extended region at 0.5 covers the bottom-right quadrant
        assert_eq!(output.image.get_pixel(50, 50).0, [255, 255, 255, 255]);
        assert_eq!(output.image.get_pixel(49, 49).0, [0, 0, 0, 255]);
    }
}
