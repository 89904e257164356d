//! Binary FBX 7.4 encoder
//!
//! Walks a laid-out record [`Tree`] and emits it through fbxcel's v7.4
//! binary writer, which patches record end offsets and writes the footer.
//! Offsets are patched by seeking, so the document is encoded into memory
//! first.

use std::io::{Cursor, Seek, Write};

use fbxcel::low::v7400::{ArrayAttributeEncoding, AttributeValue};
use fbxcel::low::FbxVersion;
use fbxcel::tree::v7400::{NodeHandle, Tree};
use fbxcel::writer::v7400::binary::{self, AttributesWriter, FbxFooter, Writer};

use crate::error::{ExportError, ExportResult};

/// FBX file format version written
pub const FBX_VERSION: u32 = 7400;

/// Arrays at least this many bytes long are zlib-compressed
pub const COMPRESSION_THRESHOLD: usize = 128;

/// Encode the records under the root of `tree` as a complete binary FBX file
pub fn encode(tree: &Tree) -> ExportResult<Vec<u8>> {
    encode_records(tree).map_err(encode_error)
}

/// Encode `tree` and write it to `out`, returning the file size
pub fn write_fbx<W: Write>(mut out: W, tree: &Tree) -> ExportResult<usize> {
    let bytes = encode(tree)?;
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(bytes.len())
}

fn encode_records(tree: &Tree) -> binary::Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()), FbxVersion::V7_4)?;
    for record in tree.root().children() {
        write_record(&mut writer, record)?;
    }
    let sink = writer.finalize_and_flush(&FbxFooter::default())?;
    Ok(sink.into_inner())
}

fn encode_error(error: binary::Error) -> ExportError {
    match error {
        binary::Error::Io(e) => ExportError::Io(e),
        other => ExportError::Encode {
            message: other.to_string(),
        },
    }
}

fn write_record<W: Write + Seek>(writer: &mut Writer<W>, record: NodeHandle<'_>) -> binary::Result<()> {
    let mut attributes = writer.new_node(record.name())?;
    for value in record.attributes() {
        append(&mut attributes, value)?;
    }
    for child in record.children() {
        write_record(writer, child)?;
    }
    writer.close_node()
}

fn encoding(byte_len: usize) -> ArrayAttributeEncoding {
    if byte_len >= COMPRESSION_THRESHOLD {
        ArrayAttributeEncoding::Zlib
    } else {
        ArrayAttributeEncoding::Direct
    }
}

fn append<W: Write + Seek>(
    attributes: &mut AttributesWriter<'_, W>,
    value: &AttributeValue,
) -> binary::Result<()> {
    match value {
        AttributeValue::Bool(v) => attributes.append_bool(*v),
        AttributeValue::I16(v) => attributes.append_i16(*v),
        AttributeValue::I32(v) => attributes.append_i32(*v),
        AttributeValue::I64(v) => attributes.append_i64(*v),
        AttributeValue::F32(v) => attributes.append_f32(*v),
        AttributeValue::F64(v) => attributes.append_f64(*v),
        AttributeValue::ArrBool(v) => {
            attributes.append_arr_bool_from_iter(encoding(v.len()), v.iter().copied())
        }
        AttributeValue::ArrI32(v) => {
            attributes.append_arr_i32_from_iter(encoding(v.len() * 4), v.iter().copied())
        }
        AttributeValue::ArrI64(v) => {
            attributes.append_arr_i64_from_iter(encoding(v.len() * 8), v.iter().copied())
        }
        AttributeValue::ArrF32(v) => {
            attributes.append_arr_f32_from_iter(encoding(v.len() * 4), v.iter().copied())
        }
        AttributeValue::ArrF64(v) => {
            attributes.append_arr_f64_from_iter(encoding(v.len() * 8), v.iter().copied())
        }
        AttributeValue::Binary(v) => attributes.append_binary_direct(v),
        AttributeValue::String(v) => attributes.append_string_direct(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fbx::node::{string, RecordTree};
    use fbxcel::tree::any::AnyTree;

    const MAGIC: &[u8] = b"Kaydara FBX Binary  \x00\x1a\x00";

    fn sample() -> Tree {
        let mut tree = Tree::default();
        let root = tree.root().node_id();

        let header = tree.group(root, "Header");
        tree.leaf(header, "Version", 1003);
        tree.leaf(header, "Creator", string("test"));
        tree.group(root, "Empty");
        let geometry = tree.record(root, "Geometry", vec![42i64.into(), string("Mesh")]);
        tree.leaf(geometry, "Vertices", vec![0.5f64; 300]);
        tree.leaf(geometry, "Indices", vec![0i32, 1, -3]);
        tree.leaf(geometry, "Content", vec![0x89u8, b'P', b'N', b'G']);
        tree
    }

    fn decode(bytes: Vec<u8>) -> Tree {
        match AnyTree::from_seekable_reader(Cursor::new(bytes)).unwrap() {
            AnyTree::V7400(version, tree, footer) => {
                assert_eq!(version, FbxVersion::V7_4);
                assert!(footer.is_ok());
                tree
            }
            _ => panic!("unexpected FBX version"),
        }
    }

    #[test]
    fn test_header() {
        let bytes = encode(&Tree::default()).unwrap();
        assert_eq!(&bytes[..MAGIC.len()], MAGIC);
        assert_eq!(
            u32::from_le_bytes([bytes[23], bytes[24], bytes[25], bytes[26]]),
            FBX_VERSION
        );
    }

    #[test]
    fn test_records_read_back() {
        let tree = sample();
        let decoded = decode(encode(&tree).unwrap());
        assert!(decoded.strict_eq(&tree));

        let names: Vec<_> = decoded.root().children().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Header", "Empty", "Geometry"]);
    }

    #[test]
    fn test_large_arrays_are_compressed() {
        let mut tree = Tree::default();
        let root = tree.root().node_id();
        tree.leaf(root, "A", vec![0.0f64; 1000]);

        let bytes = encode(&tree).unwrap();
        assert!(bytes.len() < 1000 * 8);
        assert!(decode(bytes).strict_eq(&tree));
    }

    #[test]
    fn test_write_reports_size() {
        let mut out = Vec::new();
        let written = write_fbx(&mut out, &sample()).unwrap();
        assert_eq!(written, out.len());
    }

    #[test]
    fn test_long_name_rejected() {
        let mut tree = Tree::default();
        let root = tree.root().node_id();
        tree.group(root, &"x".repeat(300));
        assert!(matches!(encode(&tree), Err(ExportError::Encode { .. })));
    }
}
