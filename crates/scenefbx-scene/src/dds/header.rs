//! DDS header structures

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use scenefbx_core::{Error, Result};

/// DDS pixel format flags
pub mod pf_flags {
    /// Alpha channel present
    pub const ALPHA: u32 = 0x2;
    /// Compressed, format given by `fourcc`
    pub const FOURCC: u32 = 0x4;
    /// Uncompressed RGB
    pub const RGB: u32 = 0x40;
    /// Single luminance channel
    pub const LUMINANCE: u32 = 0x20000;
}

/// DDS header (124 bytes, after the magic)
#[derive(Debug, Clone)]
pub struct DdsHeader {
    /// `DDSD_*` flags
    pub flags: u32,
    /// Height in pixels
    pub height: u32,
    /// Width in pixels
    pub width: u32,
    /// Number of mip levels
    pub mipmap_count: u32,
    /// Pixel format block
    pub pixel_format: PixelFormat,
    /// Cube map and volume flags
    pub caps2: u32,
}

impl DdsHeader {
    /// Parse DDS header from reader
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let size = reader.read_u32::<LittleEndian>()?;
        if size != 124 {
            return Err(Error::invalid_data(format!(
                "Invalid DDS header size: expected 124, got {}",
                size
            )));
        }

        let flags = reader.read_u32::<LittleEndian>()?;
        let height = reader.read_u32::<LittleEndian>()?;
        let width = reader.read_u32::<LittleEndian>()?;
        let _pitch_or_linear_size = reader.read_u32::<LittleEndian>()?;
        let _depth = reader.read_u32::<LittleEndian>()?;
        let mipmap_count = reader.read_u32::<LittleEndian>()?;

        let mut reserved1 = [0u8; 44];
        reader.read_exact(&mut reserved1)?;

        let pixel_format = PixelFormat::parse(reader)?;

        let _caps = reader.read_u32::<LittleEndian>()?;
        let caps2 = reader.read_u32::<LittleEndian>()?;
        let mut tail = [0u8; 12]; // caps3, caps4, reserved2
        reader.read_exact(&mut tail)?;

        Ok(DdsHeader {
            flags,
            height,
            width,
            mipmap_count,
            pixel_format,
            caps2,
        })
    }

    /// Check if this DDS has a DX10 extended header
    pub fn has_dx10_header(&self) -> bool {
        self.pixel_format.flags & pf_flags::FOURCC != 0 && self.pixel_format.fourcc == *b"DX10"
    }

    /// Check if this is a cubemap
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & 0x200 != 0
    }
}

/// DDS pixel format (32 bytes)
#[derive(Debug, Clone)]
pub struct PixelFormat {
    /// `DDPF_*` flags
    pub flags: u32,
    /// Four-character compression code
    pub fourcc: [u8; 4],
    /// Bits per pixel of uncompressed data
    pub rgb_bit_count: u32,
    /// Red channel mask
    pub r_bit_mask: u32,
    /// Green channel mask
    pub g_bit_mask: u32,
    /// Blue channel mask
    pub b_bit_mask: u32,
    /// Alpha channel mask
    pub a_bit_mask: u32,
}

impl PixelFormat {
    /// Parse pixel format block
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let size = reader.read_u32::<LittleEndian>()?;
        if size != 32 {
            return Err(Error::invalid_data(format!(
                "Invalid DDS pixel format size: expected 32, got {}",
                size
            )));
        }

        let flags = reader.read_u32::<LittleEndian>()?;
        let mut fourcc = [0u8; 4];
        reader.read_exact(&mut fourcc)?;

        Ok(PixelFormat {
            flags,
            fourcc,
            rgb_bit_count: reader.read_u32::<LittleEndian>()?,
            r_bit_mask: reader.read_u32::<LittleEndian>()?,
            g_bit_mask: reader.read_u32::<LittleEndian>()?,
            b_bit_mask: reader.read_u32::<LittleEndian>()?,
            a_bit_mask: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Get FourCC as string
    pub fn fourcc_string(&self) -> String {
        String::from_utf8_lossy(&self.fourcc).to_string()
    }
}

/// DX10 extended header
#[derive(Debug, Clone)]
pub struct DX10Header {
    /// `DXGI_FORMAT` value
    pub dxgi_format: u32,
    /// Texture dimension
    pub resource_dimension: u32,
    /// Miscellaneous flags
    pub misc_flag: u32,
    /// Number of array elements
    pub array_size: u32,
}

impl DX10Header {
    /// Parse DX10 header from reader
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let header = DX10Header {
            dxgi_format: reader.read_u32::<LittleEndian>()?,
            resource_dimension: reader.read_u32::<LittleEndian>()?,
            misc_flag: reader.read_u32::<LittleEndian>()?,
            array_size: reader.read_u32::<LittleEndian>()?,
        };
        let _misc_flags2 = reader.read_u32::<LittleEndian>()?;
        Ok(header)
    }
}
