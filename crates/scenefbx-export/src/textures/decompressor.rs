//! Block-compressed texture decompression
//!
//! Decompresses BC1-BC5 textures using the texpresso library.

use scenefbx_scene::TextureFormat;

use crate::textures::{TextureError, TextureResult};

/// Decompress block-compressed texture data to RGBA8
pub fn decompress_bc(
    format: TextureFormat,
    data: &[u8],
    width: u32,
    height: u32,
) -> TextureResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }

    let needed = format.surface_size(width, height);
    if data.len() < needed {
        return Err(TextureError::DecompressionFailed(format!(
            "{:?} data too short: expected {} bytes, got {}",
            format,
            needed,
            data.len()
        )));
    }

    let pixel_count = width as usize * height as usize;
    let mut output = vec![0u8; pixel_count * 4]; // RGBA8

    let codec = match format {
        TextureFormat::Bc1 => texpresso::Format::Bc1,
        TextureFormat::Bc2 => texpresso::Format::Bc2,
        TextureFormat::Bc3 => texpresso::Format::Bc3,
        TextureFormat::Bc4 => texpresso::Format::Bc4,
        TextureFormat::Bc5 => texpresso::Format::Bc5,
        TextureFormat::Bc6h => {
            return Err(TextureError::UnsupportedFormat(
                "BC6H decompression not supported".to_string(),
            ))
        }
        TextureFormat::Bc7 => {
            return Err(TextureError::UnsupportedFormat(
                "BC7 decompression not supported".to_string(),
            ))
        }
        other => {
            return Err(TextureError::UnsupportedFormat(format!(
                "{:?} is not block-compressed",
                other
            )))
        }
    };

    codec.decompress(data, width as usize, height as usize, &mut output);
    Ok(output)
}
