//! ONNX Runtime backend for LaMa-class inpainting models
//!
//! Builds an `ort` session from the user-supplied model bytes and runs it
//! with the named `image`/`mask` inputs the exported graphs expect. Supports
//! CPU, CUDA and CoreML execution providers with availability probing.

use crate::config::{ExecutionProvider, ProcessorConfig};
use crate::error::{InpaintError, Result};
use crate::inference::InferenceBackend;
use crate::models::ModelArtifact;
use crate::utils::ModelInputs;
use ndarray::Array4;
use ort::execution_providers::{
    CUDA as CUDAExecutionProvider, CoreML as CoreMLExecutionProvider,
    ExecutionProvider as OrtExecutionProvider,
};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;

/// ONNX Runtime backend holding one live session
#[derive(Debug, Default)]
pub struct OnnxBackend {
    session: Option<Session>,
    initialized: bool,
}

impl OnnxBackend {
    /// Create a new, uninitialized ONNX backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: None,
            initialized: false,
        }
    }

    /// Configure execution providers on the session builder per the
    /// requested provider, falling back to CPU when unavailable.
    fn apply_execution_providers(
        session_builder: ort::session::builder::SessionBuilder,
        requested: ExecutionProvider,
    ) -> Result<ort::session::builder::SessionBuilder> {
        let cuda_available =
            OrtExecutionProvider::is_available(&CUDAExecutionProvider::default()).unwrap_or(false);
        let coreml_available =
            OrtExecutionProvider::is_available(&CoreMLExecutionProvider::default())
                .unwrap_or(false);

        let providers = match requested {
            ExecutionProvider::Auto => {
                // Priority order: CUDA > CoreML > CPU
                let mut providers = Vec::new();
                if cuda_available {
                    log::info!("CUDA execution provider is available and will be used");
                    providers.push(CUDAExecutionProvider::default().build());
                }
                if coreml_available {
                    log::info!("CoreML execution provider is available and will be used");
                    providers.push(
                        CoreMLExecutionProvider::default()
                            .with_subgraphs(true)
                            .build(),
                    );
                }
                if providers.is_empty() {
                    log::warn!("No hardware acceleration available, falling back to CPU");
                }
                providers
            },
            ExecutionProvider::Cpu => {
                log::info!("Using CPU execution provider");
                Vec::new()
            },
            ExecutionProvider::Cuda => {
                if cuda_available {
                    log::info!("Using CUDA execution provider");
                    vec![CUDAExecutionProvider::default().build()]
                } else {
                    log::warn!("CUDA requested but not available, falling back to CPU");
                    Vec::new()
                }
            },
            ExecutionProvider::CoreMl => {
                if coreml_available {
                    log::info!("Using CoreML execution provider");
                    vec![CoreMLExecutionProvider::default()
                        .with_subgraphs(true)
                        .build()]
                } else {
                    log::warn!("CoreML requested but not available, falling back to CPU");
                    Vec::new()
                }
            },
        };

        if providers.is_empty() {
            Ok(session_builder)
        } else {
            session_builder
                .with_execution_providers(providers)
                .map_err(|e| {
                    InpaintError::model_load(format!("Failed to set execution providers: {e}"))
                })
        }
    }
}

impl InferenceBackend for OnnxBackend {
    fn initialize(
        &mut self,
        artifact: &ModelArtifact,
        config: &ProcessorConfig,
    ) -> Result<Option<instant::Duration>> {
        if self.initialized {
            return Ok(None);
        }

        let model_load_start = instant::Instant::now();

        let session_builder = Session::builder()
            .map_err(|e| {
                InpaintError::model_load(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                InpaintError::model_load(format!("Failed to set optimization level: {e}"))
            })?;

        let session_builder =
            Self::apply_execution_providers(session_builder, config.execution_provider)?;

        // Auto-detected threading: all cores within ops, a few across ops
        let cores = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(8);
        let intra_threads = if config.intra_threads > 0 {
            config.intra_threads
        } else {
            cores
        };
        let inter_threads = if config.inter_threads > 0 {
            config.inter_threads
        } else {
            (cores / 4).max(1)
        };

        let session = session_builder
            .with_parallel_execution(true)
            .map_err(|e| {
                InpaintError::model_load(format!("Failed to enable parallel execution: {e}"))
            })?
            .with_intra_threads(intra_threads)
            .map_err(|e| InpaintError::model_load(format!("Failed to set intra threads: {e}")))?
            .with_inter_threads(inter_threads)
            .map_err(|e| InpaintError::model_load(format!("Failed to set inter threads: {e}")))?
            .commit_from_memory(&artifact.data)
            .map_err(|e| {
                InpaintError::model_load(format!(
                    "Failed to create session from model data: {e}"
                ))
            })?;

        self.session = Some(session);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        log::info!(
            "Model session ready: {} ({:.0}ms, {intra_threads} intra / {inter_threads} inter threads)",
            artifact.identity,
            model_load_time.as_secs_f64() * 1000.0
        );

        Ok(Some(model_load_time))
    }

    fn infer(&mut self, inputs: &ModelInputs) -> Result<Array4<f32>> {
        if !self.initialized {
            return Err(InpaintError::runtime_unavailable(
                "ONNX backend not initialized",
            ));
        }
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| InpaintError::runtime_unavailable("ONNX session not initialized"))?;

        let inference_start = instant::Instant::now();
        log::debug!(
            "Starting inference with image {:?} and mask {:?}",
            inputs.image.dim(),
            inputs.mask.dim()
        );

        let image_value = Value::from_array(inputs.image.clone()).map_err(|e| {
            InpaintError::inference(format!("Failed to convert image tensor: {e}"))
        })?;
        let mask_value = Value::from_array(inputs.mask.clone())
            .map_err(|e| InpaintError::inference(format!("Failed to convert mask tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs!["image" => image_value, "mask" => mask_value])
            .map_err(|e| InpaintError::inference(format!("ONNX inference failed: {e}")))?;

        // Take the first output entry as the result tensor; multi-output
        // models are not distinguishable through this convention.
        let output_tensor = {
            let keys: Vec<_> = outputs.keys().collect();
            let first_key = keys.first().ok_or_else(|| {
                InpaintError::inference("Model returned no output tensors")
            })?;
            log::debug!("Using first output entry: {first_key}");
            outputs
                .get(first_key)
                .ok_or_else(|| InpaintError::inference("First output tensor not found"))?
                .try_extract_array::<f32>()
                .map_err(|e| {
                    InpaintError::inference(format!("Failed to extract output tensor: {e}"))
                })?
        };

        let output_shape = output_tensor.shape().to_vec();
        if output_shape.len() != 4 {
            return Err(InpaintError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        }
        let output_data = output_tensor.view().to_owned();
        let result = Array4::from_shape_vec(
            (
                output_shape.first().copied().unwrap_or(1),
                output_shape.get(1).copied().unwrap_or(1),
                output_shape.get(2).copied().unwrap_or(1),
                output_shape.get(3).copied().unwrap_or(1),
            ),
            output_data.into_raw_vec_and_offset().0,
        )
        .map_err(|e| InpaintError::inference(format!("Failed to reshape output tensor: {e}")))?;

        log::debug!(
            "Inference complete: {:.2}ms",
            inference_start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(result)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}
