//! Export pipeline errors

use thiserror::Error;

use crate::textures::TextureError;

/// Errors raised while exporting a scene
#[derive(Error, Debug)]
pub enum ExportError {
    /// Output file, staging directory or staged texture I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Texture decompression or PNG encoding failed
    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    /// Scene input violated its structural invariants
    #[error("Scene error: {0}")]
    Scene(#[from] scenefbx_core::Error),

    /// A mesh object carries no materials while material export is enabled
    #[error("Object '{object}' has a mesh but no materials")]
    MissingMaterial {
        /// Name of the offending scene object
        object: String,
    },

    /// FBX record encoding failed
    #[error("FBX encoding error: {message}")]
    Encode {
        /// Encoder error description
        message: String,
    },

    /// Mesh data cannot be encoded
    #[error("Invalid mesh '{mesh}': {message}")]
    InvalidMesh {
        /// Name of the mesh
        mesh: String,
        /// What made it unencodable
        message: String,
    },
}

impl ExportError {
    /// [`ExportError::InvalidMesh`] for the mesh named `mesh`
    pub fn invalid_mesh(mesh: impl Into<String>, message: impl Into<String>) -> Self {
        ExportError::InvalidMesh {
            mesh: mesh.into(),
            message: message.into(),
        }
    }
}

/// Result of an export operation
pub type ExportResult<T> = Result<T, ExportError>;
