//! DDS texture format detection

use super::header::{pf_flags, DX10Header, DdsHeader, PixelFormat};
use crate::texture::TextureFormat;

/// DXGI formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxgiFormat {
    Unknown = 0,
    R8G8B8A8Unorm = 28,
    R8G8B8A8UnormSrgb = 29,
    BC1Unorm = 71,
    BC1UnormSrgb = 72,
    BC2Unorm = 74,
    BC2UnormSrgb = 75,
    BC3Unorm = 77,
    BC3UnormSrgb = 78,
    BC4Unorm = 80,
    BC5Unorm = 83,
    B8G8R8A8Unorm = 87,
    B8G8R8A8UnormSrgb = 91,
    BC6HUf16 = 95,
    BC6HSf16 = 96,
    BC7Unorm = 98,
    BC7UnormSrgb = 99,
}

impl DxgiFormat {
    /// Create from u32 value
    pub fn from_u32(value: u32) -> Self {
        match value {
            28 => DxgiFormat::R8G8B8A8Unorm,
            29 => DxgiFormat::R8G8B8A8UnormSrgb,
            71 => DxgiFormat::BC1Unorm,
            72 => DxgiFormat::BC1UnormSrgb,
            74 => DxgiFormat::BC2Unorm,
            75 => DxgiFormat::BC2UnormSrgb,
            77 => DxgiFormat::BC3Unorm,
            78 => DxgiFormat::BC3UnormSrgb,
            80 => DxgiFormat::BC4Unorm,
            83 => DxgiFormat::BC5Unorm,
            87 => DxgiFormat::B8G8R8A8Unorm,
            91 => DxgiFormat::B8G8R8A8UnormSrgb,
            95 => DxgiFormat::BC6HUf16,
            96 => DxgiFormat::BC6HSf16,
            98 => DxgiFormat::BC7Unorm,
            99 => DxgiFormat::BC7UnormSrgb,
            _ => DxgiFormat::Unknown,
        }
    }

    fn texture_format(self) -> Option<TextureFormat> {
        match self {
            DxgiFormat::BC1Unorm | DxgiFormat::BC1UnormSrgb => Some(TextureFormat::Bc1),
            DxgiFormat::BC2Unorm | DxgiFormat::BC2UnormSrgb => Some(TextureFormat::Bc2),
            DxgiFormat::BC3Unorm | DxgiFormat::BC3UnormSrgb => Some(TextureFormat::Bc3),
            DxgiFormat::BC4Unorm => Some(TextureFormat::Bc4),
            DxgiFormat::BC5Unorm => Some(TextureFormat::Bc5),
            DxgiFormat::BC6HUf16 | DxgiFormat::BC6HSf16 => Some(TextureFormat::Bc6h),
            DxgiFormat::BC7Unorm | DxgiFormat::BC7UnormSrgb => Some(TextureFormat::Bc7),
            DxgiFormat::R8G8B8A8Unorm | DxgiFormat::R8G8B8A8UnormSrgb => Some(TextureFormat::Rgba32),
            DxgiFormat::B8G8R8A8Unorm | DxgiFormat::B8G8R8A8UnormSrgb => Some(TextureFormat::Bgra32),
            DxgiFormat::Unknown => None,
        }
    }
}

/// Detect the texture format from the DDS headers, `None` if unsupported
pub fn detect_format(header: &DdsHeader, dx10: Option<&DX10Header>) -> Option<TextureFormat> {
    // DX10 header takes precedence over FourCC
    if let Some(dx10_hdr) = dx10 {
        return DxgiFormat::from_u32(dx10_hdr.dxgi_format).texture_format();
    }
    from_pixel_format(&header.pixel_format)
}

fn from_pixel_format(pf: &PixelFormat) -> Option<TextureFormat> {
    if pf.flags & pf_flags::FOURCC != 0 {
        return match &pf.fourcc {
            b"DXT1" => Some(TextureFormat::Bc1),
            b"DXT2" | b"DXT3" => Some(TextureFormat::Bc2),
            b"DXT4" | b"DXT5" => Some(TextureFormat::Bc3),
            b"ATI1" | b"BC4U" => Some(TextureFormat::Bc4),
            b"ATI2" | b"BC5U" => Some(TextureFormat::Bc5),
            _ => None,
        };
    }

    if pf.flags & pf_flags::RGB != 0 {
        return match pf.rgb_bit_count {
            32 if pf.r_bit_mask == 0x0000_00FF => Some(TextureFormat::Rgba32),
            32 if pf.r_bit_mask == 0x00FF_0000 => Some(TextureFormat::Bgra32),
            24 if pf.r_bit_mask == 0x0000_00FF => Some(TextureFormat::Rgb24),
            16 if pf.r_bit_mask == 0xF800 => Some(TextureFormat::Rgb565),
            _ => None,
        };
    }

    if pf.flags & pf_flags::LUMINANCE != 0 && pf.rgb_bit_count == 8 {
        return Some(TextureFormat::R8);
    }

    if pf.flags & pf_flags::ALPHA != 0 && pf.rgb_bit_count == 8 {
        return Some(TextureFormat::Alpha8);
    }

    None
}
