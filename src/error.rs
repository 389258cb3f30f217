//! Error types for the stool classification service.
//!
//! Uses thiserror for ergonomic error definitions. Startup errors
//! (`ModelLoad`, `Labels`) are fatal; per-request errors
//! (`Decode`, `Inference`) are translated into HTTP responses at the
//! route boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for stool classification operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Uploaded bytes could not be decoded as an image
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Model weights could not be loaded into the constructed architecture
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Class label vocabulary is missing, empty, or the wrong size
    #[error("Label error: {0}")]
    Labels(String),

    /// Error during the forward pass or probability extraction
    #[error("Inference error: {0}")]
    Inference(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Labels(err.to_string())
    }
}

/// Specialized Result type for stool classification operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ModelLoad("shape mismatch".to_string());
        assert_eq!(err.to_string(), "Model load error: shape mismatch");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_image_error_maps_to_decode() {
        let result = image::load_from_memory(b"definitely not an image");
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
