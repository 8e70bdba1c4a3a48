//! Model artifact sources and identity
//!
//! The model is an opaque binary blob supplied by the user; nothing here
//! inspects its internal format. For caching purposes an artifact is
//! identified by its name and byte length, which is cheap to compute for
//! file-backed sources (a metadata call, no read).

use crate::error::{InpaintError, Result};
use std::fmt;
use std::path::PathBuf;

/// Identity of a model artifact, used to decide session reuse.
///
/// Two artifacts with equal identity are assumed to be the same model. The
/// name + byte-length pair is a deliberate shortcut: it avoids hashing
/// multi-hundred-megabyte files on every run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentity {
    /// Artifact name (file name for file-backed sources)
    pub name: String,
    /// Artifact size in bytes
    pub byte_length: u64,
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file:{}:{}", self.name, self.byte_length)
    }
}

/// Source of a model artifact
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Model file on disk
    File(PathBuf),
    /// Model bytes already in memory (tests, embedders)
    Memory {
        /// Name used for identity and display
        name: String,
        /// Raw model bytes
        bytes: Vec<u8>,
    },
}

impl ModelSource {
    /// Human-readable name of the source
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::File(path) => path.file_name().map_or_else(
                || path.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            ),
            Self::Memory { name, .. } => name.clone(),
        }
    }

    /// Compute the artifact identity without loading the full contents.
    ///
    /// # Errors
    /// - [`InpaintError::ModelLoad`] if a file-backed source cannot be stat'ed
    pub fn identity(&self) -> Result<ModelIdentity> {
        match self {
            Self::File(path) => {
                let metadata = std::fs::metadata(path)
                    .map_err(|e| InpaintError::model_load_error("stat", path, &e.to_string()))?;
                Ok(ModelIdentity {
                    name: self.display_name(),
                    byte_length: metadata.len(),
                })
            },
            Self::Memory { name, bytes } => Ok(ModelIdentity {
                name: name.clone(),
                byte_length: bytes.len() as u64,
            }),
        }
    }

    /// Load the artifact bytes.
    ///
    /// # Errors
    /// - [`InpaintError::ModelLoad`] if a file-backed source cannot be read
    pub fn load(&self) -> Result<ModelArtifact> {
        let identity = self.identity()?;
        let data = match self {
            Self::File(path) => std::fs::read(path)
                .map_err(|e| InpaintError::model_load_error("read", path, &e.to_string()))?,
            Self::Memory { bytes, .. } => bytes.clone(),
        };
        Ok(ModelArtifact { identity, data })
    }
}

/// A loaded model artifact: identity plus raw bytes
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    /// Identity computed at load time
    pub identity: ModelIdentity,
    /// Raw model bytes, handed to the inference backend as-is
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn memory_source(name: &str, len: usize) -> ModelSource {
        ModelSource::Memory {
            name: name.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn test_memory_identity() {
        let source = memory_source("lama_fp32.onnx", 1234);
        let identity = source.identity().unwrap();
        assert_eq!(identity.name, "lama_fp32.onnx");
        assert_eq!(identity.byte_length, 1234);
        assert_eq!(identity.to_string(), "file:lama_fp32.onnx:1234");
    }

    #[test]
    fn test_identity_distinguishes_name_and_length() {
        let a = memory_source("model-a.onnx", 100).identity().unwrap();
        let b = memory_source("model-b.onnx", 100).identity().unwrap();
        let a_longer = memory_source("model-a.onnx", 101).identity().unwrap();
        assert_ne!(a, b);
        assert_ne!(a, a_longer);
        assert_eq!(a, memory_source("model-a.onnx", 100).identity().unwrap());
    }

    #[test]
    fn test_file_identity_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.onnx");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not a real graph").unwrap();
        drop(file);

        let source = ModelSource::File(path);
        let identity = source.identity().unwrap();
        assert_eq!(identity.name, "tiny.onnx");
        assert_eq!(identity.byte_length, 16);

        let artifact = source.load().unwrap();
        assert_eq!(artifact.data, b"not a real graph");
        assert_eq!(artifact.identity, identity);
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let source = ModelSource::File(PathBuf::from("/nonexistent/model.onnx"));
        let err = source.identity().unwrap_err();
        assert!(matches!(err, InpaintError::ModelLoad(_)));
    }
}
