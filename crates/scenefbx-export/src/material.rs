//! Material binding
//!
//! A mesh node gets either one material for the whole geometry or one
//! material per submesh:
//!
//! | Case                                   | Mapping     | Indices                   |
//! |----------------------------------------|-------------|---------------------------|
//! | one submesh, or counts differ          | `AllSame`   | `[0]`                     |
//! | several submeshes, one material each   | `ByPolygon` | submesh index per polygon |
//!
//! Texture slots are decompressed when needed, staged as PNG and connected
//! to the material's diffuse or normal-map channel.

use scenefbx_scene::{Material, RawTexture, SubMesh};
use tracing::debug;

use crate::error::{ExportError, ExportResult};
use crate::fbx::{
    FileTexture, GeometryId, MappingMode, MaterialChannel, MaterialId, MaterialLayer, NodeId,
    PhongMaterial, ReferenceMode, Scene, TextureId, TextureUsage,
};
use crate::textures::TextureCodec;

/// Texture name of the albedo slot
pub const ALBEDO_TEXTURE: &str = "MainTex";
/// Texture name of the normal-map slot
pub const NORMAL_TEXTURE: &str = "BumpMap";
/// Material layer name used for per-submesh assignment
pub const MATERIALS_LAYER: &str = "Materials";

/// How textures are produced while binding materials
#[derive(Debug, Clone, Copy)]
pub struct TextureSettings<'a> {
    /// Codec decoding and staging textures
    pub codec: &'a TextureCodec,
    /// Decompress block formats to RGB24 instead of RGBA32
    pub drop_alpha: bool,
    /// Embed the PNG bytes into the document
    pub embed: bool,
}

/// Bind `materials` to `node` and write the material layer of `geometry`.
///
/// Returns the number of materials added to the node.
pub fn bind_materials(
    scene: &mut Scene,
    node: NodeId,
    geometry: GeometryId,
    materials: &[Material],
    submeshes: &[SubMesh],
    textures: &TextureSettings<'_>,
) -> ExportResult<usize> {
    let per_submesh = submeshes.len() > 1 && submeshes.len() == materials.len();

    let (layer, bound) = if per_submesh {
        let indices: Vec<i32> = submeshes
            .iter()
            .enumerate()
            .flat_map(|(i, submesh)| {
                std::iter::repeat(i as i32).take(submesh.primitive_count() as usize)
            })
            .collect();

        let geometry_ref = scene.geometry(geometry);
        if indices.len() != geometry_ref.polygon_count() {
            return Err(ExportError::invalid_mesh(
                geometry_ref.name.clone(),
                format!(
                    "submeshes cover {} polygons, geometry has {}",
                    indices.len(),
                    geometry_ref.polygon_count()
                ),
            ));
        }

        let layer = MaterialLayer {
            name: MATERIALS_LAYER.to_string(),
            mapping: MappingMode::ByPolygon,
            reference: ReferenceMode::IndexToDirect,
            indices,
        };
        (layer, materials)
    } else {
        let first = materials.first().ok_or_else(|| ExportError::MissingMaterial {
            object: scene.node(node).name.clone(),
        })?;

        let layer = MaterialLayer {
            name: first.name.clone(),
            mapping: MappingMode::AllSame,
            reference: ReferenceMode::IndexToDirect,
            indices: vec![0],
        };
        (layer, &materials[..1])
    };

    for material in bound {
        let id = encode_material(scene, material, textures)?;
        scene.node_mut(node).materials.push(id);
    }

    debug!(
        "Bound {} material(s) to '{}' ({})",
        bound.len(),
        scene.node(node).name,
        layer.mapping.as_str()
    );
    scene.geometry_mut(geometry).materials = Some(layer);
    Ok(bound.len())
}

/// Convert one host material, staging its textures
fn encode_material(
    scene: &mut Scene,
    material: &Material,
    textures: &TextureSettings<'_>,
) -> ExportResult<MaterialId> {
    let mut phong = PhongMaterial::new(material.name.clone());
    phong.emissive = material.emissive_color.to_rgb_f64();
    phong.ambient = material.ambient_color.to_rgb_f64();
    phong.ambient_factor = f64::from(material.ambient_factor);
    phong.diffuse = material.diffuse_color.to_rgb_f64();
    phong.diffuse_factor = f64::from(material.diffuse_factor);
    phong.specular_factor = f64::from(material.specular_factor);
    phong.transparency_factor = f64::from(material.transparency_factor.clamp(0.0, 1.0));

    if let Some(albedo) = material.albedo() {
        let id = stage_texture(scene, albedo, ALBEDO_TEXTURE, TextureUsage::Standard, textures)?;
        phong.textures.push((MaterialChannel::DiffuseColor, id));
    }
    if let Some(normal) = material.normal_map() {
        let id = stage_texture(
            scene,
            normal,
            NORMAL_TEXTURE,
            TextureUsage::BumpNormalMap,
            textures,
        )?;
        phong.textures.push((MaterialChannel::NormalMap, id));
    }

    Ok(scene.add_material(phong))
}

fn stage_texture(
    scene: &mut Scene,
    texture: &RawTexture,
    name: &str,
    usage: TextureUsage,
    settings: &TextureSettings<'_>,
) -> ExportResult<TextureId> {
    let is_normal_map = usage == TextureUsage::BumpNormalMap;
    let decoded = settings
        .codec
        .decompress(texture, is_normal_map, settings.drop_alpha)?;
    let staged = settings.codec.stage(&decoded)?;

    let mut file_texture = FileTexture::new(name, staged.path, usage);
    if settings.embed {
        file_texture.content = Some(staged.bytes);
    }
    Ok(scene.add_texture(file_texture))
}
