//! Unified error handling for SceneFBX
//!
//! Errors raised while building or loading scene input: malformed mesh
//! buffers, unreadable texture files, bad scene descriptions. The exporter
//! wraps these in its own error type.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for scene input operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Data Errors ====================

    /// Invalid magic bytes at file start
    #[error("Invalid magic bytes: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    /// Buffer shorter than its declared contents
    #[error("Unexpected end of data: needed {needed} bytes, found {available}")]
    UnexpectedEof {
        needed: usize,
        available: usize,
    },

    /// Structurally invalid mesh, texture or tree data
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    /// Texture description lacks a value needed to read raw bytes
    #[error("Missing required field: {field}")]
    MissingField {
        field: String,
    },

    /// Pixel format or container variant that cannot be loaded
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    // ==================== Scene Errors ====================

    /// Scene description JSON did not match the expected schema
    #[error("Invalid scene description: {message}")]
    Description {
        message: String,
    },

    /// An image file could not be decoded
    #[error("Cannot decode image {path}: {message}")]
    ImageDecode {
        path: PathBuf,
        message: String,
    },

    /// Tree node handle does not belong to the tree
    #[error("Invalid scene node handle: {index}")]
    InvalidNode {
        index: usize,
    },

    /// Error wrapped with the object, material or file being processed
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap with the name of what was being processed
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// [`Error::InvalidData`] with `message`
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// [`Error::MissingField`] naming `field`
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::MissingField {
            field: field.into(),
        }
    }

    /// [`Error::UnsupportedFormat`] naming `format`
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Innermost error beneath any context wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True for missing files, at any context depth
    pub fn is_not_found(&self) -> bool {
        match self.root_cause() {
            Error::FileNotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context built lazily, only on error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::FileNotFound(PathBuf::from("/textures/wood.png"));
        let contextualized = err.with_context("material 'Wood' slot 'albedo'");

        let message = contextualized.to_string();
        assert!(message.contains("slot 'albedo'"));
        assert!(message.contains("wood.png"));
    }

    #[test]
    fn test_root_cause_through_nested_context() {
        let err = Error::invalid_data("index out of range")
            .with_context("mesh 'Cube'")
            .with_context("object 'Crate'");

        assert!(matches!(err.root_cause(), Error::InvalidData { .. }));
        assert!(!err.is_not_found());
        assert!(Error::FileNotFound(PathBuf::from("/x"))
            .with_context("outer")
            .is_not_found());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::missing_field("width"));
        let with_context = result.context("texture 'raw.bin'");

        assert!(with_context.unwrap_err().to_string().contains("texture 'raw.bin'"));
    }
}
