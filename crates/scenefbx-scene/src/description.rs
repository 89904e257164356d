//! JSON scene descriptions
//!
//! A small host stand-in: a JSON document listing objects with world poses,
//! inline mesh arrays, materials referencing texture files, lights and
//! nested children. Poses are world-space, exactly as a host engine would
//! report them; the hierarchy only controls parent/child structure.
//!
//! ```json
//! {
//!   "objects": [{
//!     "name": "Crate",
//!     "position": [0, 1, 0],
//!     "rotation": [0, 45, 0],
//!     "mesh": { "name": "CrateMesh", "vertices": [[0,0,0],[1,0,0],[0,1,0]], "indices": [0,1,2] },
//!     "materials": [{ "name": "Wood", "textures": { "albedo": { "path": "wood.png" } } }],
//!     "children": [{ "name": "Bulb", "light": { "type": "point", "intensity": 2.0 } }]
//!   }]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use scenefbx_core::{Color, Error, Quat, Result, ResultExt, Vec2, Vec3};
use serde::Deserialize;
use tracing::{debug, info};

use crate::dds;
use crate::light::{Light, LightType};
use crate::material::Material;
use crate::mesh::{Mesh, SubMesh};
use crate::object::{Pose, SceneObject};
use crate::texture::{RawTexture, TextureFormat};
use crate::tree::{NodeId, SceneTree};

/// Root of a scene description document
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    /// Top-level objects; each one roots its own tree
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
}

/// One object and its children
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDesc {
    /// Object name
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: Option<RotationDesc>,
    /// Effective world scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Scale relative to the host parent; defaults to `scale`
    #[serde(default)]
    pub local_scale: Option<[f32; 3]>,
    #[serde(default)]
    pub mesh: Option<MeshDesc>,
    #[serde(default)]
    pub light: Option<LightDesc>,
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
    #[serde(default)]
    pub children: Vec<ObjectDesc>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Rotation as host Euler degrees `[x, y, z]` or quaternion `[x, y, z, w]`
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RotationDesc {
    Euler([f32; 3]),
    Quaternion([f32; 4]),
}

impl RotationDesc {
    fn to_quat(self) -> Quat {
        match self {
            RotationDesc::Euler(e) => Quat::from_euler_degrees(Vec3::from(e)),
            RotationDesc::Quaternion([x, y, z, w]) => Quat::new(x, y, z, w),
        }
    }
}

/// Color as `[r, g, b]` or `[r, g, b, a]`
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum ColorDesc {
    Rgb([f32; 3]),
    Rgba([f32; 4]),
}

impl ColorDesc {
    fn to_color(self) -> Color {
        match self {
            ColorDesc::Rgb([r, g, b]) => Color::rgb(r, g, b),
            ColorDesc::Rgba(c) => Color::from(c),
        }
    }
}

/// Inline mesh arrays
#[derive(Debug, Clone, Deserialize)]
pub struct MeshDesc {
    /// Mesh name; defaults to the object name
    pub name: Option<String>,
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    pub colors: Option<Vec<ColorDesc>>,
    #[serde(default)]
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Triangle indices
    pub indices: Vec<u32>,
    #[serde(default)]
    pub submeshes: Vec<SubMesh>,
}

/// Light type given either as a host code or as a name
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LightTypeDesc {
    Code(i64),
    Name(String),
}

impl LightTypeDesc {
    fn normalize(&self) -> LightType {
        match self {
            LightTypeDesc::Code(code) => LightType::from_host_code(*code),
            LightTypeDesc::Name(name) => LightType::from_name(name),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightDesc {
    #[serde(rename = "type")]
    pub kind: LightTypeDesc,
    #[serde(default = "unit_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub color: Option<ColorDesc>,
}

fn unit_intensity() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDesc {
    /// Material name
    pub name: String,
    #[serde(default)]
    pub color: Option<ColorDesc>,
    #[serde(default)]
    pub emission: Option<ColorDesc>,
    #[serde(default)]
    pub ambient_factor: Option<f32>,
    #[serde(default)]
    pub diffuse_factor: Option<f32>,
    #[serde(default)]
    pub specular_factor: Option<f32>,
    #[serde(default)]
    pub transparency_factor: Option<f32>,
    /// Slot name ("albedo", "normal") to texture file
    #[serde(default)]
    pub textures: BTreeMap<String, TextureDesc>,
}

/// A texture file. DDS files carry their own format; other image files are
/// decoded to RGBA32. Raw dumps need an explicit `format`, `width` and
/// `height`.
#[derive(Debug, Clone, Deserialize)]
pub struct TextureDesc {
    /// Texture file, relative to the description file
    pub path: PathBuf,
    /// Texture name; defaults to the file stem
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl SceneDescription {
    /// Parse a description from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Description {
                message: e.to_string(),
            })
    }

    /// Read and parse a description file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).with_context(|| format!("loading {}", path.display()))
    }

    /// Total number of objects including nested children
    pub fn object_count(&self) -> usize {
        fn count(desc: &ObjectDesc) -> usize {
            1 + desc.children.iter().map(count).sum::<usize>()
        }
        self.objects.iter().map(count).sum()
    }

    /// Build one tree per top-level object. Relative texture paths resolve
    /// against `base_dir`.
    pub fn build_trees(&self, base_dir: impl AsRef<Path>) -> Result<Vec<SceneTree>> {
        let mut loader = TextureLoader::new(base_dir.as_ref());
        let trees = self
            .objects
            .iter()
            .map(|desc| {
                let mut tree = SceneTree::new(build_object(desc, &mut loader)?);
                let root = tree.root();
                add_children(&mut tree, root, desc, &mut loader)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            trees = trees.len(),
            objects = self.object_count(),
            textures = loader.cache.len(),
            "Built scene from description"
        );
        Ok(trees)
    }

    /// Build every object in pre-order, ignoring the hierarchy
    pub fn build_objects(&self, base_dir: impl AsRef<Path>) -> Result<Vec<SceneObject>> {
        Ok(self
            .build_trees(base_dir)?
            .iter()
            .flat_map(SceneTree::flatten)
            .collect())
    }
}

fn add_children(
    tree: &mut SceneTree,
    parent: NodeId,
    desc: &ObjectDesc,
    loader: &mut TextureLoader,
) -> Result<()> {
    for child in &desc.children {
        let id = tree.add_child(parent, build_object(child, loader)?)?;
        add_children(tree, id, child, loader)?;
    }
    Ok(())
}

fn build_object(desc: &ObjectDesc, loader: &mut TextureLoader) -> Result<SceneObject> {
    let scale = Vec3::from(desc.scale);
    let pose = Pose {
        position: Vec3::from(desc.position),
        rotation: desc.rotation.map(RotationDesc::to_quat).unwrap_or_default(),
        lossy_scale: scale,
        local_scale: desc.local_scale.map(Vec3::from).unwrap_or(scale),
    };

    let mesh = desc
        .mesh
        .as_ref()
        .map(|m| build_mesh(&desc.name, m))
        .transpose()
        .with_context(|| format!("object '{}'", desc.name))?;

    let light = desc.light.as_ref().map(|l| {
        Light::new(
            l.kind.normalize(),
            l.intensity,
            l.color.map(ColorDesc::to_color).unwrap_or(Color::WHITE),
        )
    });

    let materials = desc
        .materials
        .iter()
        .map(|m| build_material(m, loader))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("object '{}'", desc.name))?;

    Ok(SceneObject {
        name: desc.name.clone(),
        pose,
        mesh,
        light,
        materials,
    })
}

fn build_mesh(object_name: &str, desc: &MeshDesc) -> Result<Mesh> {
    let mesh = Mesh {
        name: desc.name.clone().unwrap_or_else(|| object_name.to_string()),
        vertices: desc.vertices.iter().copied().map(Vec3::from).collect(),
        normals: desc
            .normals
            .as_ref()
            .map(|n| n.iter().copied().map(Vec3::from).collect()),
        colors: desc
            .colors
            .as_ref()
            .map(|c| c.iter().copied().map(ColorDesc::to_color).collect()),
        uvs: desc
            .uvs
            .as_ref()
            .map(|uv| uv.iter().copied().map(Vec2::from).collect()),
        indices: desc.indices.clone(),
        submeshes: desc.submeshes.clone(),
    };
    mesh.validate()?;
    Ok(mesh)
}

fn build_material(desc: &MaterialDesc, loader: &mut TextureLoader) -> Result<Material> {
    let mut material = Material::new(&desc.name);
    if let Some(color) = desc.color {
        material.diffuse_color = color.to_color();
    }
    if let Some(emission) = desc.emission {
        material.emissive_color = emission.to_color();
    }
    if let Some(f) = desc.ambient_factor {
        material.ambient_factor = f;
    }
    if let Some(f) = desc.diffuse_factor {
        material.diffuse_factor = f;
    }
    if let Some(f) = desc.specular_factor {
        material.specular_factor = f;
    }
    if let Some(f) = desc.transparency_factor {
        material.transparency_factor = f;
    }

    for (slot, tex) in &desc.textures {
        let texture = loader
            .load(tex)
            .with_context(|| format!("material '{}' slot '{}'", desc.name, slot))?;
        material.set_texture(slot.clone(), texture);
    }
    Ok(material)
}

/// Loads texture files, reusing already decoded files
struct TextureLoader {
    base_dir: PathBuf,
    cache: HashMap<PathBuf, RawTexture>,
}

impl TextureLoader {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    fn load(&mut self, desc: &TextureDesc) -> Result<RawTexture> {
        let path = self.base_dir.join(&desc.path);
        let mut texture = match self.cache.get(&path) {
            Some(cached) => cached.clone(),
            None => {
                let loaded = self.read(&path, desc)?;
                self.cache.insert(path.clone(), loaded.clone());
                loaded
            }
        };
        if let Some(name) = &desc.name {
            texture.name = name.clone();
        }
        Ok(texture)
    }

    fn read(&self, path: &Path, desc: &TextureDesc) -> Result<RawTexture> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("texture")
            .to_string();
        debug!(path = %path.display(), "Loading texture");

        if let Some(format_name) = &desc.format {
            let format = TextureFormat::from_name(format_name)
                .ok_or_else(|| Error::unsupported_format(format_name.clone()))?;
            let width = desc.width.ok_or_else(|| Error::missing_field("width"))?;
            let height = desc.height.ok_or_else(|| Error::missing_field("height"))?;
            return RawTexture::new(stem, width, height, format, std::fs::read(path)?);
        }

        let is_dds = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("dds"));
        if is_dds {
            return dds::load_dds(path);
        }

        let image = image::open(path)
            .map_err(|e| Error::ImageDecode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        RawTexture::new(stem, width, height, TextureFormat::Rgba32, image.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ALBEDO_SLOT;

    const SCENE: &str = r#"{
        "objects": [{
            "name": "Table",
            "position": [1, 0, 0],
            "rotation": [0, 90, 0],
            "mesh": {
                "vertices": [[0,0,0],[1,0,0],[0,1,0]],
                "uvs": [[0,0],[1,0],[0,1]],
                "indices": [0,1,2]
            },
            "materials": [{ "name": "Oak", "color": [0.5, 0.4, 0.3] }],
            "children": [
                { "name": "Lamp", "light": { "type": "spot", "intensity": 3.0 } },
                { "name": "Glow", "light": { "type": 4 } }
            ]
        }]
    }"#;

    #[test]
    fn test_build_trees() {
        let desc = SceneDescription::from_json(SCENE).unwrap();
        assert_eq!(desc.object_count(), 3);

        let trees = desc.build_trees(".").unwrap();
        assert_eq!(trees.len(), 1);

        let tree = &trees[0];
        let root = tree.object(tree.root()).unwrap();
        assert_eq!(root.name, "Table");
        assert_eq!(root.mesh.as_ref().unwrap().name, "Table");
        assert_eq!(root.materials[0].diffuse_color, Color::rgb(0.5, 0.4, 0.3));

        let children = tree.children(tree.root());
        assert_eq!(children.len(), 2);
        let lamp = tree.object(children[0]).unwrap().light.unwrap();
        assert_eq!(lamp.kind, LightType::Spot);
        let glow = tree.object(children[1]).unwrap().light.unwrap();
        assert_eq!(glow.kind, LightType::Point);
        assert_eq!(glow.intensity, 1.0);
    }

    #[test]
    fn test_build_objects_flattens() {
        let desc = SceneDescription::from_json(SCENE).unwrap();
        let names: Vec<_> = desc
            .build_objects(".")
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["Table", "Lamp", "Glow"]);
    }

    #[test]
    fn test_invalid_mesh_is_rejected() {
        let json = r#"{ "objects": [{ "name": "Bad", "mesh": { "vertices": [[0,0,0]], "indices": [0,1,2] } }] }"#;
        let err = SceneDescription::from_json(json)
            .unwrap()
            .build_trees(".")
            .unwrap_err();
        assert!(err.to_string().contains("object 'Bad'"));
    }

    #[test]
    fn test_png_texture_loading() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        img.save(dir.path().join("checker.png")).unwrap();

        let json = r#"{ "objects": [{
            "name": "Box",
            "materials": [{ "name": "M", "textures": { "albedo": { "path": "checker.png" } } }]
        }] }"#;
        let objects = SceneDescription::from_json(json)
            .unwrap()
            .build_objects(dir.path())
            .unwrap();

        let tex = objects[0].materials[0].texture(ALBEDO_SLOT).unwrap();
        assert_eq!(tex.name, "checker");
        assert_eq!(tex.format, TextureFormat::Rgba32);
        assert_eq!(&tex.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_texture_file() {
        let json = r#"{ "objects": [{
            "name": "Box",
            "materials": [{ "name": "M", "textures": { "albedo": { "path": "nope.png" } } }]
        }] }"#;
        let err = SceneDescription::from_json(json)
            .unwrap()
            .build_trees("/nonexistent")
            .unwrap_err();
        assert!(err.to_string().contains("slot 'albedo'"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_json() {
        let err = SceneDescription::from_json(r#"{ "objects": [{ "position": [1, 2] }] }"#).unwrap_err();
        assert!(matches!(err, Error::Description { .. }));
    }
}
