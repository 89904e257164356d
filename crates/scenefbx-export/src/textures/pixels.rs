//! Per-format pixel sampling
//!
//! Reads any supported texture surface as linear RGBA floats. Block formats
//! go through [`decompress_bc`]; uncompressed formats are decoded here.
//! Channels a format does not store read as 0, alpha reads as 1.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use scenefbx_scene::{RawTexture, TextureFormat};

use crate::textures::{decompress_bc, TextureError, TextureResult};

/// Sample every pixel of `texture` as RGBA floats, row-major
pub fn sample_rgba(texture: &RawTexture) -> TextureResult<Vec<[f32; 4]>> {
    let (width, height) = (texture.width, texture.height);
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }

    if texture.is_compressed() {
        let rgba = decompress_bc(texture.format, &texture.data, width, height)?;
        return Ok(rgba
            .chunks_exact(4)
            .map(|p| [unorm8(p[0]), unorm8(p[1]), unorm8(p[2]), unorm8(p[3])])
            .collect());
    }

    let bpp = texture.format.bytes_per_pixel().ok_or_else(|| {
        TextureError::UnsupportedFormat(format!("{:?} has no pixel size", texture.format))
    })?;
    let needed = texture.pixel_count() * bpp;
    if texture.data.len() < needed {
        return Err(TextureError::DecompressionFailed(format!(
            "texture '{}' data too short: expected {} bytes, got {}",
            texture.name,
            needed,
            texture.data.len()
        )));
    }

    Ok(texture.data[..needed]
        .chunks_exact(bpp)
        .map(|px| decode_pixel(texture.format, px))
        .collect())
}

fn unorm8(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn unorm16(px: &[u8]) -> f32 {
    f32::from(LittleEndian::read_u16(px)) / 65535.0
}

fn unorm4(v: u16) -> f32 {
    f32::from(v & 0xF) / 15.0
}

fn half(px: &[u8]) -> f32 {
    f16::from_bits(LittleEndian::read_u16(px)).to_f32()
}

fn float(px: &[u8]) -> f32 {
    LittleEndian::read_f32(px)
}

fn decode_pixel(format: TextureFormat, px: &[u8]) -> [f32; 4] {
    match format {
        TextureFormat::Alpha8 => [1.0, 1.0, 1.0, unorm8(px[0])],
        TextureFormat::R8 => [unorm8(px[0]), 0.0, 0.0, 1.0],
        TextureFormat::R16 => [unorm16(px), 0.0, 0.0, 1.0],
        TextureFormat::Rg16 => [unorm8(px[0]), unorm8(px[1]), 0.0, 1.0],
        TextureFormat::Rg32 => [unorm16(&px[0..]), unorm16(&px[2..]), 0.0, 1.0],
        TextureFormat::Rgb24 => [unorm8(px[0]), unorm8(px[1]), unorm8(px[2]), 1.0],
        TextureFormat::Rgba32 => [unorm8(px[0]), unorm8(px[1]), unorm8(px[2]), unorm8(px[3])],
        TextureFormat::Argb32 => [unorm8(px[1]), unorm8(px[2]), unorm8(px[3]), unorm8(px[0])],
        TextureFormat::Bgra32 => [unorm8(px[2]), unorm8(px[1]), unorm8(px[0]), unorm8(px[3])],
        TextureFormat::Rgb565 => {
            let v = LittleEndian::read_u16(px);
            [
                f32::from((v >> 11) & 0x1F) / 31.0,
                f32::from((v >> 5) & 0x3F) / 63.0,
                f32::from(v & 0x1F) / 31.0,
                1.0,
            ]
        }
        TextureFormat::Rgba4444 => {
            let v = LittleEndian::read_u16(px);
            [unorm4(v >> 12), unorm4(v >> 8), unorm4(v >> 4), unorm4(v)]
        }
        TextureFormat::Argb4444 => {
            let v = LittleEndian::read_u16(px);
            [unorm4(v >> 8), unorm4(v >> 4), unorm4(v), unorm4(v >> 12)]
        }
        TextureFormat::RHalf => [half(px), 0.0, 0.0, 1.0],
        TextureFormat::RgHalf => [half(&px[0..]), half(&px[2..]), 0.0, 1.0],
        TextureFormat::RgbaHalf => [
            half(&px[0..]),
            half(&px[2..]),
            half(&px[4..]),
            half(&px[6..]),
        ],
        TextureFormat::RFloat => [float(px), 0.0, 0.0, 1.0],
        TextureFormat::RgFloat => [float(&px[0..]), float(&px[4..]), 0.0, 1.0],
        TextureFormat::RgbaFloat => [
            float(&px[0..]),
            float(&px[4..]),
            float(&px[8..]),
            float(&px[12..]),
        ],
        TextureFormat::Rgb9e5Float => {
            let v = LittleEndian::read_u32(px);
            let scale = 2f32.powi((v >> 27) as i32 - 15 - 9);
            [
                (v & 0x1FF) as f32 * scale,
                ((v >> 9) & 0x1FF) as f32 * scale,
                ((v >> 18) & 0x1FF) as f32 * scale,
                1.0,
            ]
        }
        TextureFormat::Rgb48 => [unorm16(&px[0..]), unorm16(&px[2..]), unorm16(&px[4..]), 1.0],
        TextureFormat::Rgba64 => [
            unorm16(&px[0..]),
            unorm16(&px[2..]),
            unorm16(&px[4..]),
            unorm16(&px[6..]),
        ],
        // Block formats never reach the per-pixel path
        TextureFormat::Bc1
        | TextureFormat::Bc2
        | TextureFormat::Bc3
        | TextureFormat::Bc4
        | TextureFormat::Bc5
        | TextureFormat::Bc6h
        | TextureFormat::Bc7 => [0.0, 0.0, 0.0, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(format: TextureFormat, data: Vec<u8>) -> RawTexture {
        RawTexture::new("t", 1, 1, format, data).unwrap()
    }

    #[test]
    fn test_bgra_swizzle() {
        let px = sample_rgba(&texture(TextureFormat::Bgra32, vec![0, 128, 255, 255])).unwrap();
        assert_eq!(px[0][0], 1.0);
        assert_eq!(px[0][2], 0.0);
    }

    #[test]
    fn test_argb_swizzle() {
        let px = sample_rgba(&texture(TextureFormat::Argb32, vec![51, 255, 0, 0])).unwrap();
        assert_eq!(px[0], [1.0, 0.0, 0.0, 0.2]);
    }

    #[test]
    fn test_rgb565() {
        let px = sample_rgba(&texture(TextureFormat::Rgb565, vec![0x1F, 0x00])).unwrap();
        assert_eq!(px[0], [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_half_float() {
        let bits = f16::from_f32(0.5).to_bits().to_le_bytes();
        let px = sample_rgba(&texture(TextureFormat::RHalf, bits.to_vec())).unwrap();
        assert_eq!(px[0], [0.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rgba_float() {
        let data: Vec<u8> = [0.25f32, 0.5, 0.75, 1.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let px = sample_rgba(&texture(TextureFormat::RgbaFloat, data)).unwrap();
        assert_eq!(px[0], [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_rgb9e5_one() {
        // mantissa 256 with exponent 16: 256 * 2^(16 - 24) = 1.0
        let v: u32 = 256 | (256 << 9) | (256 << 18) | (16 << 27);
        let px = sample_rgba(&texture(TextureFormat::Rgb9e5Float, v.to_le_bytes().to_vec())).unwrap();
        assert_eq!(px[0], [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_bc1_samples() {
        let tex = RawTexture::new(
            "red",
            4,
            4,
            TextureFormat::Bc1,
            vec![0x00, 0xF8, 0x00, 0x00, 0, 0, 0, 0],
        )
        .unwrap();
        let px = sample_rgba(&tex).unwrap();
        assert_eq!(px.len(), 16);
        assert_eq!(px[0], [1.0, 0.0, 0.0, 1.0]);
    }
}
