//! Configuration types for watermark removal operations

use crate::error::{InpaintError, Result};
use crate::models::ModelSource;
use crate::services::progress::StageCeilings;
use serde::{Deserialize, Serialize};

/// Default width ratio of the strict inference mask region
pub const DEFAULT_WIDTH_RATIO: f32 = 0.15;
/// Default height ratio of the strict inference mask region
pub const DEFAULT_HEIGHT_RATIO: f32 = 0.15;
/// Default ratio of the extended blend region used at composite time
pub const DEFAULT_EXTENDED_RATIO: f32 = 0.16;

/// Default square model input size (LaMa-class exports)
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 512;

/// Execution provider options for ONNX Runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionProvider {
    /// Auto-detect best available provider (CUDA > `CoreML` > CPU)
    Auto,
    /// CPU execution (always available)
    Cpu,
    /// NVIDIA CUDA GPU acceleration
    Cuda,
    /// Apple Silicon GPU acceleration (Metal Performance Shaders)
    CoreMl,
}

impl Default for ExecutionProvider {
    fn default() -> Self {
        // Default to auto-detection for best performance
        Self::Auto
    }
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

impl std::str::FromStr for ExecutionProvider {
    type Err = InpaintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda),
            "coreml" => Ok(Self::CoreMl),
            other => Err(InpaintError::invalid_config(format!(
                "Unknown execution provider '{other}' (expected auto, cpu, cuda, coreml)"
            ))),
        }
    }
}

/// The three ratios driving watermark region geometry.
///
/// `width_ratio` and `height_ratio` define the strict inference mask region;
/// `extended_ratio` defines the larger blend region used at composite time
/// and should be >= the base ratios so the patch edge lands on untouched
/// pixels. The usable range in practice is about `[0.05, 0.4]`; values are
/// not hard-validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionRatios {
    /// Fraction of the image width covered by the inference mask
    pub width_ratio: f32,
    /// Fraction of the image height covered by the inference mask
    pub height_ratio: f32,
    /// Fraction used for the extended blend region at composite time
    pub extended_ratio: f32,
}

impl Default for RegionRatios {
    fn default() -> Self {
        Self {
            width_ratio: DEFAULT_WIDTH_RATIO,
            height_ratio: DEFAULT_HEIGHT_RATIO,
            extended_ratio: DEFAULT_EXTENDED_RATIO,
        }
    }
}

impl RegionRatios {
    /// Build ratios from optional string overrides.
    ///
    /// Each override that is empty or does not parse as a finite number falls
    /// back to its default; no error is raised. This mirrors how the ratios
    /// arrive from freeform UI/CLI inputs.
    #[must_use]
    pub fn from_overrides(
        width_ratio: Option<&str>,
        height_ratio: Option<&str>,
        extended_ratio: Option<&str>,
    ) -> Self {
        Self {
            width_ratio: parse_ratio_or(width_ratio, DEFAULT_WIDTH_RATIO),
            height_ratio: parse_ratio_or(height_ratio, DEFAULT_HEIGHT_RATIO),
            extended_ratio: parse_ratio_or(extended_ratio, DEFAULT_EXTENDED_RATIO),
        }
    }
}

fn parse_ratio_or(value: Option<&str>, default: f32) -> f32 {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Configuration for the watermark removal processor
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Model artifact source (no bundled default; `None` fails runs with `ModelMissing`)
    pub model: Option<ModelSource>,
    /// Region ratio configuration
    pub ratios: RegionRatios,
    /// Square model input resolution
    pub model_input_size: u32,
    /// Execution provider for the inference backend
    pub execution_provider: ExecutionProvider,
    /// Number of intra-op threads for inference (0 = auto)
    pub intra_threads: usize,
    /// Number of inter-op threads for inference (0 = auto)
    pub inter_threads: usize,
    /// Enable debug mode (additional logging and validation)
    pub debug: bool,
    /// Per-stage progress ceilings (cosmetic, decoupled from control flow)
    pub ceilings: StageCeilings,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            model: None,
            ratios: RegionRatios::default(),
            model_input_size: DEFAULT_MODEL_INPUT_SIZE,
            execution_provider: ExecutionProvider::default(),
            intra_threads: 0,
            inter_threads: 0,
            debug: false,
            ceilings: StageCeilings::default(),
        }
    }
}

impl ProcessorConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::new()
    }
}

/// Builder for [`ProcessorConfig`]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ProcessorConfig::default(),
        }
    }

    #[must_use]
    pub fn model(mut self, model: ModelSource) -> Self {
        self.config.model = Some(model);
        self
    }

    #[must_use]
    pub fn ratios(mut self, ratios: RegionRatios) -> Self {
        self.config.ratios = ratios;
        self
    }

    #[must_use]
    pub fn model_input_size(mut self, size: u32) -> Self {
        self.config.model_input_size = size;
        self
    }

    #[must_use]
    pub fn execution_provider(mut self, provider: ExecutionProvider) -> Self {
        self.config.execution_provider = provider;
        self
    }

    #[must_use]
    pub fn intra_threads(mut self, threads: usize) -> Self {
        self.config.intra_threads = threads;
        self
    }

    #[must_use]
    pub fn inter_threads(mut self, threads: usize) -> Self {
        self.config.inter_threads = threads;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    #[must_use]
    pub fn ceilings(mut self, ceilings: StageCeilings) -> Self {
        self.config.ceilings = ceilings;
        self
    }

    /// Build the processor configuration
    ///
    /// # Errors
    ///
    /// Returns [`InpaintError::InvalidConfig`] for:
    /// - A zero model input size
    /// - A ceilings table that is not monotonically non-decreasing
    pub fn build(self) -> Result<ProcessorConfig> {
        if self.config.model_input_size == 0 {
            return Err(InpaintError::invalid_config(
                "Model input size must be greater than zero",
            ));
        }
        self.config.ceilings.validate()?;
        Ok(self.config)
    }
}

impl Default for ProcessorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
