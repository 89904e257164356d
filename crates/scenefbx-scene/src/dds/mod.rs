//! DDS (DirectDraw Surface) texture loader
//!
//! Reads the top-level surface of a DDS file into a [`RawTexture`]. Mipmaps,
//! cubemap faces and array slices beyond the first surface are ignored.

mod format;
mod header;

pub use format::{detect_format, DxgiFormat};
pub use header::{DX10Header, DdsHeader, PixelFormat};

use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use scenefbx_core::{Error, Result, ResultExt};
use tracing::debug;

use crate::texture::RawTexture;

/// DDS file magic number "DDS "
const DDS_MAGIC: u32 = 0x2053_4444;

/// Parse a DDS file held in memory
pub fn parse_dds(name: impl Into<String>, bytes: &[u8]) -> Result<RawTexture> {
    let name = name.into();
    let mut reader = Cursor::new(bytes);

    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != DDS_MAGIC {
        return Err(Error::InvalidMagic {
            expected: DDS_MAGIC.to_le_bytes().to_vec(),
            found: magic.to_le_bytes().to_vec(),
        });
    }

    let header = DdsHeader::parse(&mut reader)?;
    let dx10 = if header.has_dx10_header() {
        Some(DX10Header::parse(&mut reader)?)
    } else {
        None
    };

    let format = detect_format(&header, dx10.as_ref()).ok_or_else(|| {
        Error::unsupported_format(match &dx10 {
            Some(dx10) => format!("DDS DXGI format {}", dx10.dxgi_format),
            None => format!("DDS pixel format '{}'", header.pixel_format.fourcc_string()),
        })
    })?;

    debug!(
        texture = %name,
        width = header.width,
        height = header.height,
        mips = header.mipmap_count,
        cubemap = header.is_cubemap(),
        ?format,
        "Parsed DDS header"
    );

    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    RawTexture::new(name, header.width, header.height, format, data)
}

/// Load a DDS file from disk; the texture is named after the file stem
pub fn load_dds(path: impl AsRef<Path>) -> Result<RawTexture> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("texture")
        .to_string();
    let bytes = std::fs::read(path)?;
    parse_dds(name, &bytes).with_context(|| format!("loading {}", path.display()))
}
