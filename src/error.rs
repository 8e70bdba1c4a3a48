//! Error types for watermark removal operations

use thiserror::Error;

/// Result type alias for watermark removal operations
pub type Result<T> = std::result::Result<T, InpaintError>;

/// Error kinds surfaced by the watermark removal pipeline
#[derive(Error, Debug)]
pub enum InpaintError {
    /// Inference runtime is not available (backend feature disabled or not initialized)
    #[error("Inference runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// No model artifact has been selected
    #[error("No model selected")]
    ModelMissing,

    /// Model read or session-creation failure
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Cannot prepare an image surface (input decode or model input preparation)
    #[error("Decode error: {0}")]
    Decode(String),

    /// The inference engine rejected the run request
    #[error("Inference error: {0}")]
    Inference(String),

    /// Cannot prepare the output surface
    #[error("Composition error: {0}")]
    Composition(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or processing errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InpaintError {
    /// Create a new runtime-unavailable error
    pub fn runtime_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::RuntimeUnavailable(msg.into())
    }

    /// Create a new model load error
    pub fn model_load<S: Into<String>>(msg: S) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new composition error
    pub fn composition<S: Into<String>>(msg: S) -> Self {
        Self::Composition(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {operation} '{path_display}': {error}"),
        ))
    }

    /// Create a model load error with operation context
    pub fn model_load_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &str,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::ModelLoad(format!("Failed to {operation} '{path_display}': {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = InpaintError::invalid_config("test config error");
        assert!(matches!(err, InpaintError::InvalidConfig(_)));

        let err = InpaintError::composition("no surface");
        assert!(matches!(err, InpaintError::Composition(_)));

        let err = InpaintError::ModelMissing;
        assert_eq!(err.to_string(), "No model selected");
    }

    #[test]
    fn test_error_display() {
        let err = InpaintError::inference("engine rejected shapes");
        assert!(err.to_string().contains("engine rejected shapes"));

        let err = InpaintError::decode("cannot prepare surface");
        assert!(err.to_string().starts_with("Decode error"));
    }

    #[test]
    fn test_file_io_error_context() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = InpaintError::file_io_error("read model", Path::new("/tmp/lama.onnx"), io);
        let msg = err.to_string();
        assert!(msg.contains("read model"));
        assert!(msg.contains("lama.onnx"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: InpaintError = io.into();
        assert!(matches!(err, InpaintError::Io(_)));
    }
}
