//! Inference backend abstraction
//!
//! The neural engine is an external collaborator: the pipeline hands it an
//! image tensor and a mask tensor and takes back the first named output. The
//! trait seam keeps the orchestrator testable and lets frontends inject
//! their own backend.

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::models::ModelArtifact;
use crate::utils::ModelInputs;
use instant::Duration;
use ndarray::Array4;

/// Trait for inpainting inference backends
pub trait InferenceBackend: Send {
    /// Initialize the backend by building a session from the model artifact
    ///
    /// Returns the model load time when a session was actually built.
    ///
    /// # Errors
    /// - Session-creation failures
    /// - Invalid configuration parameters
    fn initialize(
        &mut self,
        artifact: &ModelArtifact,
        config: &ProcessorConfig,
    ) -> Result<Option<Duration>>;

    /// Run inference over the image and mask tensors.
    ///
    /// The request carries two named inputs, `image` (`[1,3,S,S]`) and `mask`
    /// (`[1,1,S,S]`); the response is a named-tensor mapping of which the
    /// *first* entry is taken as the result. That convention cannot tell
    /// multi-output models apart; prefer an explicit output-name contract
    /// where the model description allows one.
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Engine rejecting the run request
    /// - Output tensor conversion failures
    fn infer(&mut self, inputs: &ModelInputs) -> Result<Array4<f32>>;

    /// Check if the backend holds a ready session
    fn is_initialized(&self) -> bool;
}

/// Factory trait for creating inference backends
pub trait BackendFactory: Send + Sync {
    /// Create a fresh, uninitialized backend instance
    ///
    /// # Errors
    /// - No backend compiled in (feature gating)
    fn create_backend(&self) -> Result<Box<dyn InferenceBackend>>;
}

/// Default backend factory: ONNX Runtime when the `onnx` feature is enabled
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create_backend(&self) -> Result<Box<dyn InferenceBackend>> {
        #[cfg(feature = "onnx")]
        {
            Ok(Box::new(crate::backends::OnnxBackend::new()))
        }
        #[cfg(not(feature = "onnx"))]
        {
            Err(crate::error::InpaintError::runtime_unavailable(
                "No inference backend compiled in; enable the 'onnx' feature",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::{MockBackendFactory, MockBehavior};
    use crate::config::RegionRatios;
    use crate::models::ModelSource;
    use crate::utils::ModelInputAdapter;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn test_mock_backend_through_factory_seam() {
        let factory = MockBackendFactory::new(MockBehavior::Identity);
        let mut backend = factory.create_backend().unwrap();
        assert!(!backend.is_initialized());

        let artifact = ModelSource::Memory {
            name: "mock.onnx".to_string(),
            bytes: vec![0u8; 8],
        }
        .load()
        .unwrap();
        let config = ProcessorConfig::default();
        backend.initialize(&artifact, &config).unwrap();
        assert!(backend.is_initialized());

        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            16,
            16,
            Rgba([100, 150, 200, 255]),
        ));
        let inputs = ModelInputAdapter::prepare(&image, 16, &RegionRatios::default()).unwrap();
        let output = backend.infer(&inputs).unwrap();
        assert_eq!(output.shape(), inputs.image.shape());
        assert_eq!(factory.stats().inferences(), 1);
    }
}
