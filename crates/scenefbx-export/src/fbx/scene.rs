//! In-memory FBX document
//!
//! Objects live in typed arenas and are addressed by ids. Nodes form a tree
//! under an implicit root; every other object is owned by the node or
//! material it is attached to.

use std::path::PathBuf;

use scenefbx_core::{Color, Vec2, Vec3};

use crate::transform::Transform;

macro_rules! define_id {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(usize);

            impl $name {
                /// Position in the owning arena
                pub fn index(self) -> usize {
                    self.0
                }
            }
        )*
    };
}

define_id!(
    /// Handle of a [`Node`]
    NodeId,
    /// Handle of a [`Geometry`]
    GeometryId,
    /// Handle of a [`PhongMaterial`]
    MaterialId,
    /// Handle of a [`FileTexture`]
    TextureId,
    /// Handle of a [`LightAttribute`]
    LightId,
);

/// How a layer element's values map onto the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMode {
    /// One value per control point
    ByControlPoint,
    /// One value per polygon
    ByPolygon,
    /// One value for the whole mesh
    AllSame,
}

impl MappingMode {
    /// Name written to `MappingInformationType`
    pub fn as_str(self) -> &'static str {
        match self {
            MappingMode::ByControlPoint => "ByVertice",
            MappingMode::ByPolygon => "ByPolygon",
            MappingMode::AllSame => "AllSame",
        }
    }
}

/// How a layer element's values are addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Values are stored in mapping order
    Direct,
    /// An index array selects values from the direct array
    IndexToDirect,
}

impl ReferenceMode {
    /// Name written to `ReferenceInformationType`
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceMode::Direct => "Direct",
            ReferenceMode::IndexToDirect => "IndexToDirect",
        }
    }
}

/// A per-mesh attribute layer (normals, colors, UVs)
#[derive(Debug, Clone, PartialEq)]
pub struct LayerElement<T> {
    /// Layer name, e.g. `Normals`
    pub name: String,
    /// How values map onto the mesh
    pub mapping: MappingMode,
    /// How values are addressed
    pub reference: ReferenceMode,
    /// Values in mapping order
    pub direct: Vec<T>,
    /// Indices into `direct`, used with [`ReferenceMode::IndexToDirect`]
    pub index: Vec<i32>,
}

impl<T> LayerElement<T> {
    /// By-control-point, direct layer
    pub fn by_control_point(name: impl Into<String>, direct: Vec<T>) -> Self {
        Self {
            name: name.into(),
            mapping: MappingMode::ByControlPoint,
            reference: ReferenceMode::Direct,
            direct,
            index: Vec::new(),
        }
    }
}

/// Material assignment layer: indices into the owning node's material list
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLayer {
    /// Layer name
    pub name: String,
    /// How indices map onto the mesh
    pub mapping: MappingMode,
    /// Always [`ReferenceMode::IndexToDirect`] for written layers
    pub reference: ReferenceMode,
    /// Material slot per polygon, or a single slot for `AllSame`
    pub indices: Vec<i32>,
}

/// Polygon mesh geometry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    /// Geometry name, taken from the source mesh
    pub name: String,
    /// Vertex positions in output units
    pub control_points: Vec<Vec3>,
    /// Polygons as control-point index lists
    pub polygons: Vec<Vec<u32>>,
    /// Per-vertex normals
    pub normals: Option<LayerElement<Vec3>>,
    /// Per-vertex colors
    pub colors: Option<LayerElement<Color>>,
    /// Per-vertex texture coordinates
    pub uvs: Option<LayerElement<Vec2>>,
    /// Polygon material assignment
    pub materials: Option<MaterialLayer>,
}

impl Geometry {
    /// Empty geometry named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of polygons
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// True if no attribute or material layer is present
    pub fn has_no_layers(&self) -> bool {
        self.normals.is_none() && self.colors.is_none() && self.uvs.is_none() && self.materials.is_none()
    }
}

/// Texture usage recorded on a file texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Color texture
    Standard,
    /// Tangent-space normal map
    BumpNormalMap,
}

impl TextureUsage {
    /// FBX `TextureTypeUse` enum value
    pub fn code(self) -> i32 {
        match self {
            TextureUsage::Standard => 0,
            TextureUsage::BumpNormalMap => 6,
        }
    }
}

/// Material channel a texture is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialChannel {
    /// Albedo
    DiffuseColor,
    /// Normal map
    NormalMap,
}

impl MaterialChannel {
    /// Property name the texture connection targets
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialChannel::DiffuseColor => "DiffuseColor",
            MaterialChannel::NormalMap => "NormalMap",
        }
    }
}

/// A texture referencing an image file, optionally with embedded content
#[derive(Debug, Clone, PartialEq)]
pub struct FileTexture {
    /// Texture name, the material slot it was staged from
    pub name: String,
    /// Absolute path of the staged image
    pub file_name: PathBuf,
    /// Usage flag written to `TextureTypeUse`
    pub usage: TextureUsage,
    /// UV set the texture samples
    pub uv_set: String,
    /// Swap U and V when sampling
    pub swap_uv: bool,
    /// UV translation
    pub translation: [f64; 2],
    /// UV scale
    pub scale: [f64; 2],
    /// UV rotation in degrees
    pub rotation: [f64; 2],
    /// Encoded image bytes embedded into the file
    pub content: Option<Vec<u8>>,
}

impl FileTexture {
    /// UV-mapped model-material texture with identity placement
    pub fn new(name: impl Into<String>, file_name: impl Into<PathBuf>, usage: TextureUsage) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            usage,
            uv_set: "UVs".to_string(),
            swap_uv: false,
            translation: [0.0, 0.0],
            scale: [1.0, 1.0],
            rotation: [0.0, 0.0],
            content: None,
        }
    }
}

/// Phong surface material
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    /// Material name
    pub name: String,
    /// Emissive color
    pub emissive: [f64; 3],
    /// Ambient color
    pub ambient: [f64; 3],
    /// Ambient multiplier
    pub ambient_factor: f64,
    /// Diffuse color
    pub diffuse: [f64; 3],
    /// Diffuse multiplier
    pub diffuse_factor: f64,
    /// Specular multiplier
    pub specular_factor: f64,
    /// 0 for opaque, 1 for fully transparent
    pub transparency_factor: f64,
    /// Transparent color
    pub transparent_color: [f64; 3],
    /// Textures connected to material channels, in connection order
    pub textures: Vec<(MaterialChannel, TextureId)>,
}

impl PhongMaterial {
    /// Opaque white material with default factors
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emissive: [0.0; 3],
            ambient: [0.0; 3],
            ambient_factor: 1.0,
            diffuse: [1.0; 3],
            diffuse_factor: 1.0,
            specular_factor: 0.5,
            transparency_factor: 0.0,
            transparent_color: [0.0; 3],
            textures: Vec::new(),
        }
    }

    /// Texture connected to `channel`, if any
    pub fn texture(&self, channel: MaterialChannel) -> Option<TextureId> {
        self.textures
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, id)| *id)
    }
}

/// FBX light type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Omnidirectional point light
    Point,
    /// Infinitely distant light
    Directional,
    /// Cone light
    Spot,
    /// Rectangle area light
    Area,
}

impl LightKind {
    /// FBX `LightType` enum value
    pub fn code(self) -> i32 {
        match self {
            LightKind::Point => 0,
            LightKind::Directional => 1,
            LightKind::Spot => 2,
            LightKind::Area => 3,
        }
    }
}

/// Light node attribute
#[derive(Debug, Clone, PartialEq)]
pub struct LightAttribute {
    /// Attribute name
    pub name: String,
    /// Light type
    pub kind: LightKind,
    /// Linear RGB color
    pub color: [f64; 3],
    /// Scaled intensity
    pub intensity: f64,
    /// Whether the light casts shadows
    pub cast_shadows: bool,
    /// Shadow color
    pub shadow_color: [f64; 3],
}

/// What a node carries besides its transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAttribute {
    /// Polygon mesh
    Mesh(GeometryId),
    /// Light source
    Light(LightId),
}

/// A transform node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node name
    pub name: String,
    /// Parent-relative transform
    pub transform: Transform,
    /// Mesh or light carried by the node
    pub attribute: Option<NodeAttribute>,
    /// Materials indexed by the geometry's material layer
    pub materials: Vec<MaterialId>,
    /// Render with texture shading
    pub texture_shading: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Parent node, `None` for the root and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The document being assembled
#[derive(Debug, Clone)]
pub struct Scene {
    /// Document name
    pub name: String,
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<PhongMaterial>,
    textures: Vec<FileTexture>,
    lights: Vec<LightAttribute>,
}

impl Scene {
    /// Create an empty document; node 0 is the root
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: vec![Node {
                name: "RootNode".to_string(),
                transform: Transform::IDENTITY,
                attribute: None,
                materials: Vec::new(),
                texture_shading: false,
                parent: None,
                children: Vec::new(),
            }],
            geometries: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// The implicit root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Create a detached node
    pub fn create_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            transform,
            attribute: None,
            materials: Vec::new(),
            texture_shading: false,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` to `parent`'s children.
    ///
    /// A node is attached at most once; attaching an already attached node,
    /// the root, or a node to itself is ignored and returns `false`.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if child == parent
            || child == self.root()
            || child.0 >= self.nodes.len()
            || parent.0 >= self.nodes.len()
            || self.nodes[child.0].parent.is_some()
        {
            return false;
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    /// Node `id`. Panics if `id` came from another scene
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutable node `id`
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// All nodes in creation order, the root first
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// First node named `name` directly under `parent`
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)
            .children()
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// Store `geometry`, returning its handle
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    /// Geometry `id`
    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    /// Mutable geometry `id`
    pub fn geometry_mut(&mut self, id: GeometryId) -> &mut Geometry {
        &mut self.geometries[id.0]
    }

    /// All geometries in creation order
    pub fn geometries(&self) -> impl Iterator<Item = (GeometryId, &Geometry)> {
        self.geometries.iter().enumerate().map(|(i, g)| (GeometryId(i), g))
    }

    /// Store `material`, returning its handle
    pub fn add_material(&mut self, material: PhongMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Material `id`
    pub fn material(&self, id: MaterialId) -> &PhongMaterial {
        &self.materials[id.0]
    }

    /// All materials in creation order
    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &PhongMaterial)> {
        self.materials.iter().enumerate().map(|(i, m)| (MaterialId(i), m))
    }

    /// Store `texture`, returning its handle
    pub fn add_texture(&mut self, texture: FileTexture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    /// Texture `id`
    pub fn texture(&self, id: TextureId) -> &FileTexture {
        &self.textures[id.0]
    }

    /// All textures in creation order
    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &FileTexture)> {
        self.textures.iter().enumerate().map(|(i, t)| (TextureId(i), t))
    }

    /// Store `light`, returning its handle
    pub fn add_light(&mut self, light: LightAttribute) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    /// Light `id`
    pub fn light(&self, id: LightId) -> &LightAttribute {
        &self.lights[id.0]
    }

    /// All lights in creation order
    pub fn lights(&self) -> impl Iterator<Item = (LightId, &LightAttribute)> {
        self.lights.iter().enumerate().map(|(i, l)| (LightId(i), l))
    }

    /// Number of nodes excluding the root
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Number of geometries
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of materials
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Number of textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_once() {
        let mut scene = Scene::new("s");
        let a = scene.create_node("a", Transform::IDENTITY);
        let b = scene.create_node("b", Transform::IDENTITY);

        assert!(scene.attach(a, scene.root()));
        assert!(scene.attach(b, a));
        assert!(!scene.attach(b, scene.root()));
        assert!(!scene.attach(a, a));

        assert_eq!(scene.node(b).parent(), Some(a));
        assert_eq!(scene.node(scene.root()).children(), &[a]);
        assert_eq!(scene.find_child(a, "b"), Some(b));
        assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(MappingMode::ByControlPoint.as_str(), "ByVertice");
        assert_eq!(MappingMode::AllSame.as_str(), "AllSame");
        assert_eq!(ReferenceMode::IndexToDirect.as_str(), "IndexToDirect");
    }

    #[test]
    fn test_texture_defaults() {
        let tex = FileTexture::new("MainTex", "/tmp/a.png", TextureUsage::Standard);
        assert_eq!(tex.uv_set, "UVs");
        assert_eq!(tex.scale, [1.0, 1.0]);
        assert!(!tex.swap_uv);
    }
}
