//! Texture codec
//!
//! Turns host textures into PNG files the FBX document can reference or
//! embed.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use scenefbx_scene::{RawTexture, TextureFormat};
use tracing::debug;

use crate::textures::{sample_rgba, TextureError, TextureResult};

/// A PNG written into the staging directory
#[derive(Debug, Clone)]
pub struct StagedTexture {
    /// Absolute path of the staged file
    pub path: PathBuf,
    /// Encoded PNG bytes
    pub bytes: Vec<u8>,
}

/// Quantize a float channel to 8 bits: `round(clamp01(c) * 255)`
pub fn quantize(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rebuild a tangent-space normal from a two-channel encoding.
///
/// X is read from alpha and Y from green, both remapped to [-1, 1]; Z is
/// recomputed so the normal has unit length (clamped at 0 when X and Y
/// already exceed it). The result is remapped back to [0, 1] with alpha 1.
pub fn reconstruct_normal(pixel: [f32; 4]) -> [f32; 4] {
    let x = pixel[3] * 2.0 - 1.0;
    let y = pixel[1] * 2.0 - 1.0;
    let z = (1.0 - x * x - y * y).max(0.0).sqrt();
    [(x + 1.0) / 2.0, (y + 1.0) / 2.0, (z + 1.0) / 2.0, 1.0]
}

/// Decompresses and stages textures into one staging directory
#[derive(Debug, Clone)]
pub struct TextureCodec {
    staging_dir: PathBuf,
}

impl TextureCodec {
    /// Codec staging into `staging_dir`; nothing is created until [`prepare`]
    ///
    /// [`prepare`]: TextureCodec::prepare
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    /// Directory receiving staged PNG files
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Create the staging directory if it does not exist
    pub fn prepare(&self) -> TextureResult<()> {
        std::fs::create_dir_all(&self.staging_dir)?;
        Ok(())
    }

    /// Produce an uncompressed copy of `texture`.
    ///
    /// Uncompressed formats are returned unchanged. Block formats are
    /// decoded to RGB24 (`drop_alpha`) or RGBA32 of the same size and name;
    /// normal maps are re-derived with [`reconstruct_normal`] first.
    pub fn decompress<'a>(
        &self,
        texture: &'a RawTexture,
        is_normal_map: bool,
        drop_alpha: bool,
    ) -> TextureResult<Cow<'a, RawTexture>> {
        if !texture.is_compressed() {
            return Ok(Cow::Borrowed(texture));
        }

        let mut pixels = sample_rgba(texture)?;
        if is_normal_map {
            pixels.iter_mut().for_each(|p| *p = reconstruct_normal(*p));
        }

        let quantized: Vec<[u8; 4]> = pixels
            .iter()
            .map(|p| [quantize(p[0]), quantize(p[1]), quantize(p[2]), quantize(p[3])])
            .collect();

        let (format, data) = if drop_alpha {
            let rgb: Vec<u8> = quantized.iter().flat_map(|p| [p[0], p[1], p[2]]).collect();
            (TextureFormat::Rgb24, rgb)
        } else {
            (TextureFormat::Rgba32, bytemuck::cast_slice::<[u8; 4], u8>(&quantized).to_vec())
        };

        debug!(
            texture = %texture.name,
            from = ?texture.format,
            to = ?format,
            normal_map = is_normal_map,
            "Decompressed texture"
        );

        RawTexture::new(texture.name.clone(), texture.width, texture.height, format, data)
            .map(Cow::Owned)
            .map_err(|e| TextureError::DecompressionFailed(e.to_string()))
    }

    /// Encode `texture` as PNG. 8-bit RGB and RGBA surfaces are written
    /// as-is; every other format is sampled and quantized to RGBA8.
    pub fn encode_png(&self, texture: &RawTexture) -> TextureResult<Vec<u8>> {
        let (width, height) = (texture.width, texture.height);
        let invalid = || TextureError::InvalidDimensions { width, height };

        let image = match texture.format {
            TextureFormat::Rgb24 => DynamicImage::ImageRgb8(
                RgbImage::from_raw(width, height, texture.data.clone()).ok_or_else(invalid)?,
            ),
            TextureFormat::Rgba32 => DynamicImage::ImageRgba8(
                RgbaImage::from_raw(width, height, texture.data.clone()).ok_or_else(invalid)?,
            ),
            _ => {
                let rgba: Vec<u8> = sample_rgba(texture)?
                    .iter()
                    .flat_map(|p| p.map(quantize))
                    .collect();
                DynamicImage::ImageRgba8(
                    RgbaImage::from_raw(width, height, rgba).ok_or_else(invalid)?,
                )
            }
        };

        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Write `texture` as `<staging_dir>/<name>.png`, replacing any file of
    /// the same name.
    pub fn stage(&self, texture: &RawTexture) -> TextureResult<StagedTexture> {
        self.prepare()?;
        let bytes = self.encode_png(texture)?;
        let path = self.staging_dir.join(format!("{}.png", texture.name));
        std::fs::write(&path, &bytes)?;
        let path = std::fs::canonicalize(&path)?;

        debug!(
            texture = %texture.name,
            path = %path.display(),
            bytes = bytes.len(),
            "Staged texture"
        );
        Ok(StagedTexture { path, bytes })
    }
}
