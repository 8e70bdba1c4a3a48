//! Test utilities and mock backends
//!
//! Mock implementations of the `InferenceBackend` trait so pipeline behavior
//! can be tested without model files or ONNX Runtime. The mock factory shares
//! its statistics with every backend it creates, letting tests observe how
//! often sessions are rebuilt.

use crate::config::ProcessorConfig;
use crate::error::{InpaintError, Result};
use crate::inference::{BackendFactory, InferenceBackend};
use crate::models::ModelArtifact;
use crate::utils::ModelInputs;
use instant::Duration;
use ndarray::Array4;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a mock backend should do when asked to infer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Return the image tensor unchanged (identity transform)
    Identity,
    /// Return a tensor filled with one normalized value
    SolidNormalized(f32),
    /// Return a tensor filled with one byte-range value
    SolidByteRange(f32),
    /// Fail during initialization
    FailInitialize,
    /// Fail during inference
    FailInference,
}

/// Shared call counters for mock backends
#[derive(Debug, Default)]
pub struct MockStats {
    initializations: AtomicUsize,
    inferences: AtomicUsize,
}

impl MockStats {
    /// Number of successful backend initializations so far
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Number of inference calls so far
    pub fn inferences(&self) -> usize {
        self.inferences.load(Ordering::SeqCst)
    }
}

/// Mock inference backend for tests
#[derive(Debug)]
pub struct MockInpaintBackend {
    behavior: MockBehavior,
    initialized: bool,
    stats: Arc<MockStats>,
}

impl MockInpaintBackend {
    /// Create a standalone mock with its own statistics
    #[must_use]
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            initialized: false,
            stats: Arc::new(MockStats::default()),
        }
    }

    fn with_stats(behavior: MockBehavior, stats: Arc<MockStats>) -> Self {
        Self {
            behavior,
            initialized: false,
            stats,
        }
    }
}

impl InferenceBackend for MockInpaintBackend {
    fn initialize(
        &mut self,
        artifact: &ModelArtifact,
        _config: &ProcessorConfig,
    ) -> Result<Option<Duration>> {
        if self.behavior == MockBehavior::FailInitialize {
            return Err(InpaintError::model_load(format!(
                "Mock refused to build a session for {}",
                artifact.identity
            )));
        }
        self.initialized = true;
        self.stats.initializations.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Duration::from_millis(1)))
    }

    fn infer(&mut self, inputs: &ModelInputs) -> Result<Array4<f32>> {
        if !self.initialized {
            return Err(InpaintError::runtime_unavailable(
                "Mock backend not initialized",
            ));
        }
        self.stats.inferences.fetch_add(1, Ordering::SeqCst);

        let shape = inputs.image.dim();
        match self.behavior {
            MockBehavior::Identity => Ok(inputs.image.clone()),
            MockBehavior::SolidNormalized(value) => Ok(Array4::from_elem(shape, value)),
            MockBehavior::SolidByteRange(value) => Ok(Array4::from_elem(shape, value)),
            MockBehavior::FailInference => {
                Err(InpaintError::inference("Mock engine rejected the run"))
            },
            MockBehavior::FailInitialize => unreachable!("initialize would have failed"),
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Factory producing mock backends that share one statistics block
pub struct MockBackendFactory {
    behavior: MockBehavior,
    stats: Arc<MockStats>,
}

impl MockBackendFactory {
    /// Create a factory producing backends with the given behavior
    #[must_use]
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Statistics shared across all backends this factory created
    #[must_use]
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl BackendFactory for MockBackendFactory {
    fn create_backend(&self) -> Result<Box<dyn InferenceBackend>> {
        Ok(Box::new(MockInpaintBackend::with_stats(
            self.behavior,
            Arc::clone(&self.stats),
        )))
    }
}
