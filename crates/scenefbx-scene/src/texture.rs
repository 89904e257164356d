//! Raw texture buffers as delivered by the host
//!
//! A texture is a named pixel buffer plus a format tag. Block-compressed
//! formats cannot be embedded in FBX as-is and must go through the
//! exporter's codec; everything in the uncompressed allow-list is passed
//! through untouched.

use scenefbx_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Pixel storage format of a [`RawTexture`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    /// Single 8-bit alpha channel
    Alpha8,
    /// Single 8-bit red channel
    R8,
    /// Single 16-bit red channel
    R16,
    /// Two 8-bit channels
    Rg16,
    /// Two 16-bit channels
    Rg32,
    /// 8-bit RGB
    Rgb24,
    /// 8-bit RGBA
    Rgba32,
    /// 8-bit ARGB
    Argb32,
    /// 8-bit BGRA
    Bgra32,
    /// Packed 5-6-5 RGB
    Rgb565,
    /// Packed 4-bit RGBA
    Rgba4444,
    /// Packed 4-bit ARGB
    Argb4444,
    /// Half-float red
    RHalf,
    /// Half-float RG
    RgHalf,
    /// Half-float RGBA
    RgbaHalf,
    /// Float red
    RFloat,
    /// Float RG
    RgFloat,
    /// Float RGBA
    RgbaFloat,
    /// Shared-exponent packed float RGB
    Rgb9e5Float,
    /// 16-bit RGB
    Rgb48,
    /// 16-bit RGBA
    Rgba64,
    /// Block Compressed 1 (DXT1)
    Bc1,
    /// Block Compressed 2 (DXT3)
    Bc2,
    /// Block Compressed 3 (DXT5)
    Bc3,
    /// Block Compressed 4
    Bc4,
    /// Block Compressed 5
    Bc5,
    /// Block Compressed 6 (HDR)
    Bc6h,
    /// Block Compressed 7
    Bc7,
}

impl TextureFormat {
    /// Formats that are stored uncompressed and can be written out directly
    pub const UNCOMPRESSED: [TextureFormat; 21] = [
        TextureFormat::Alpha8,
        TextureFormat::R8,
        TextureFormat::R16,
        TextureFormat::Rg16,
        TextureFormat::Rg32,
        TextureFormat::Rgb24,
        TextureFormat::Rgba32,
        TextureFormat::Argb32,
        TextureFormat::Bgra32,
        TextureFormat::Rgb565,
        TextureFormat::Rgba4444,
        TextureFormat::Argb4444,
        TextureFormat::RHalf,
        TextureFormat::RgHalf,
        TextureFormat::RgbaHalf,
        TextureFormat::RFloat,
        TextureFormat::RgFloat,
        TextureFormat::RgbaFloat,
        TextureFormat::Rgb9e5Float,
        TextureFormat::Rgb48,
        TextureFormat::Rgba64,
    ];

    /// Check if format is block-compressed (not on the uncompressed allow-list)
    pub fn is_compressed(&self) -> bool {
        !Self::UNCOMPRESSED.contains(self)
    }

    /// Bytes per pixel for uncompressed formats
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            TextureFormat::Alpha8 | TextureFormat::R8 => Some(1),
            TextureFormat::R16
            | TextureFormat::Rg16
            | TextureFormat::Rgb565
            | TextureFormat::Rgba4444
            | TextureFormat::Argb4444
            | TextureFormat::RHalf => Some(2),
            TextureFormat::Rgb24 => Some(3),
            TextureFormat::Rg32
            | TextureFormat::Rgba32
            | TextureFormat::Argb32
            | TextureFormat::Bgra32
            | TextureFormat::RgHalf
            | TextureFormat::RFloat
            | TextureFormat::Rgb9e5Float => Some(4),
            TextureFormat::Rgb48 => Some(6),
            TextureFormat::RgbaHalf | TextureFormat::RgFloat | TextureFormat::Rgba64 => Some(8),
            TextureFormat::RgbaFloat => Some(16),
            _ => None,
        }
    }

    /// Get block size for compressed formats
    pub fn block_size(&self) -> Option<usize> {
        match self {
            TextureFormat::Bc1 | TextureFormat::Bc4 => Some(8),
            TextureFormat::Bc2
            | TextureFormat::Bc3
            | TextureFormat::Bc5
            | TextureFormat::Bc6h
            | TextureFormat::Bc7 => Some(16),
            _ => None,
        }
    }

    /// Size in bytes of a single surface of the given dimensions
    pub fn surface_size(&self, width: u32, height: u32) -> usize {
        let (width, height) = (width as usize, height as usize);
        match (self.block_size(), self.bytes_per_pixel()) {
            (Some(block), _) => width.div_ceil(4) * height.div_ceil(4) * block,
            (None, Some(bpp)) => width * height * bpp,
            (None, None) => 0,
        }
    }

    /// Parse a format tag as written in scene descriptions (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name.to_ascii_lowercase().as_str() {
            "alpha8" => TextureFormat::Alpha8,
            "r8" => TextureFormat::R8,
            "r16" => TextureFormat::R16,
            "rg16" => TextureFormat::Rg16,
            "rg32" => TextureFormat::Rg32,
            "rgb24" => TextureFormat::Rgb24,
            "rgba32" => TextureFormat::Rgba32,
            "argb32" => TextureFormat::Argb32,
            "bgra32" => TextureFormat::Bgra32,
            "rgb565" => TextureFormat::Rgb565,
            "rgba4444" => TextureFormat::Rgba4444,
            "argb4444" => TextureFormat::Argb4444,
            "rhalf" => TextureFormat::RHalf,
            "rghalf" => TextureFormat::RgHalf,
            "rgbahalf" => TextureFormat::RgbaHalf,
            "rfloat" => TextureFormat::RFloat,
            "rgfloat" => TextureFormat::RgFloat,
            "rgbafloat" => TextureFormat::RgbaFloat,
            "rgb9e5float" => TextureFormat::Rgb9e5Float,
            "rgb48" => TextureFormat::Rgb48,
            "rgba64" => TextureFormat::Rgba64,
            "bc1" | "dxt1" => TextureFormat::Bc1,
            "bc2" | "dxt3" => TextureFormat::Bc2,
            "bc3" | "dxt5" => TextureFormat::Bc3,
            "bc4" => TextureFormat::Bc4,
            "bc5" => TextureFormat::Bc5,
            "bc6h" => TextureFormat::Bc6h,
            "bc7" => TextureFormat::Bc7,
            _ => return None,
        };
        Some(format)
    }
}

/// A host texture: name, dimensions, format tag and the raw surface bytes
#[derive(Debug, Clone, PartialEq)]
pub struct RawTexture {
    /// Texture name, used as the staged file stem
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel or block format of `data`
    pub format: TextureFormat,
    /// Top-level surface only, no mipmaps
    pub data: Vec<u8>,
}

impl RawTexture {
    /// Create a texture, checking that `data` holds at least one full surface.
    /// Trailing bytes (e.g. mip chains) are truncated.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
        mut data: Vec<u8>,
    ) -> Result<Self> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(Error::invalid_data(format!(
                "texture '{}' has invalid dimensions {}x{}",
                name, width, height
            )));
        }

        let needed = format.surface_size(width, height);
        if data.len() < needed {
            return Err(Error::UnexpectedEof {
                needed,
                available: data.len(),
            }
            .with_context(format!("texture '{}' ({:?})", name, format)));
        }
        data.truncate(needed);

        Ok(Self {
            name,
            width,
            height,
            format,
            data,
        })
    }

    /// Number of pixels in the surface
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True for block-compressed formats
    pub fn is_compressed(&self) -> bool {
        self.format.is_compressed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_is_uncompressed() {
        for format in TextureFormat::UNCOMPRESSED {
            assert!(!format.is_compressed(), "{:?}", format);
            assert!(format.bytes_per_pixel().is_some(), "{:?}", format);
        }
        assert!(TextureFormat::Bc3.is_compressed());
        assert!(TextureFormat::Bc7.is_compressed());
    }

    #[test]
    fn test_surface_size() {
        assert_eq!(TextureFormat::Bc1.surface_size(4, 4), 8);
        assert_eq!(TextureFormat::Bc3.surface_size(5, 5), 64);
        assert_eq!(TextureFormat::Rgb24.surface_size(2, 2), 12);
        assert_eq!(TextureFormat::RgbaFloat.surface_size(1, 1), 16);
    }

    #[test]
    fn test_new_truncates_mip_chain() {
        let tex = RawTexture::new("t", 4, 4, TextureFormat::Bc1, vec![0; 8 + 8]).unwrap();
        assert_eq!(tex.data.len(), 8);
    }

    #[test]
    fn test_new_rejects_short_data() {
        let err = RawTexture::new("t", 4, 4, TextureFormat::Rgba32, vec![0; 10]).unwrap_err();
        assert!(err.to_string().contains("texture 't'"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(TextureFormat::from_name("DXT5"), Some(TextureFormat::Bc3));
        assert_eq!(TextureFormat::from_name("rgba32"), Some(TextureFormat::Rgba32));
        assert_eq!(TextureFormat::from_name("yuy2"), None);
    }
}
