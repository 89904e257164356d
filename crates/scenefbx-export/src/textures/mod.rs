//! Texture decompression and staging
//!
//! Block-compressed textures cannot be embedded in FBX directly. They are
//! decompressed to 8-bit RGB(A), optionally re-derived as tangent-space
//! normal maps, then written as PNG into a staging directory.

mod converter;
mod decompressor;
mod pixels;

pub use converter::{quantize, reconstruct_normal, StagedTexture, TextureCodec};
pub use decompressor::decompress_bc;
pub use pixels::sample_rgba;

use thiserror::Error;

/// Texture conversion errors
#[derive(Error, Debug)]
pub enum TextureError {
    /// Staging directory or file I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Pixel format the codec cannot handle
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Block decoder rejected the data
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    /// Zero or inconsistent texture dimensions
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result of a texture operation
pub type TextureResult<T> = Result<T, TextureError>;
