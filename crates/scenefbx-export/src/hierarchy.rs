//! Hierarchy traversal
//!
//! Walks a [`SceneTree`] depth-first, pre-order, creating one output node
//! per source node with a transform relative to its immediate parent.

use scenefbx_scene::{NodeId as TreeNodeId, SceneObject, SceneTree};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::fbx::{NodeAttribute, NodeId, Scene};
use crate::light::encode_light;
use crate::material::{bind_materials, TextureSettings};
use crate::mesh::encode_mesh_geometry;
use crate::textures::TextureCodec;
use crate::transform::{resolve_local_transform_approx, Transform};

/// Suffix of the synthetic child carrying the light of a mesh node
pub const LIGHT_CHILD_SUFFIX: &str = "_light";

/// Builds output nodes for scene objects
#[derive(Debug, Clone, Copy)]
pub struct NodeEncoder<'a> {
    /// Export options
    pub config: &'a ExportConfig,
    /// Codec staging material textures
    pub codec: &'a TextureCodec,
}

impl<'a> NodeEncoder<'a> {
    /// Encoder sharing `config` and `codec` across every node of an export
    pub fn new(config: &'a ExportConfig, codec: &'a TextureCodec) -> Self {
        Self { config, codec }
    }

    /// Give `node` the geometry of `object`'s mesh and, when enabled, its
    /// materials. Does nothing for objects without a mesh; a mesh breaking
    /// its buffer invariants fails with [`ExportError::Scene`].
    ///
    /// [`ExportError::Scene`]: crate::ExportError::Scene
    pub fn add_mesh(&self, scene: &mut Scene, node: NodeId, object: &SceneObject) -> ExportResult<()> {
        let Some(mesh) = &object.mesh else {
            return Ok(());
        };
        mesh.validate()
            .map_err(|e| e.with_context(format!("object '{}'", object.name)))?;

        let geometry = encode_mesh_geometry(scene, mesh, &object.name, self.config.vertex_scale);
        let output = scene.node_mut(node);
        output.attribute = Some(NodeAttribute::Mesh(geometry));
        output.texture_shading = true;

        if self.config.export_materials {
            let textures = TextureSettings {
                codec: self.codec,
                drop_alpha: self.config.drop_alpha,
                embed: self.config.export_embedded,
            };
            bind_materials(scene, node, geometry, &object.materials, &mesh.submeshes, &textures)?;
        }
        Ok(())
    }

    /// Create a node carrying `object`'s light, if it has one
    pub fn light_node(
        &self,
        scene: &mut Scene,
        name: String,
        object: &SceneObject,
        transform: Transform,
    ) -> Option<NodeId> {
        let light = object.light.as_ref()?;
        let attribute = encode_light(scene, &name, light, self.config.intensity_scale);
        let node = scene.create_node(name, transform);
        scene.node_mut(node).attribute = Some(NodeAttribute::Light(attribute));
        Some(node)
    }
}

/// Export `id` and its subtree under `parent_output`, or under the document
/// root when `parent_output` is `None`.
pub fn traverse(
    scene: &mut Scene,
    tree: &SceneTree,
    id: TreeNodeId,
    parent_output: Option<NodeId>,
    encoder: &NodeEncoder<'_>,
) -> ExportResult<()> {
    let Some(object) = tree.object(id) else {
        return Ok(());
    };

    let parent_pose = tree
        .parent(id)
        .and_then(|parent| tree.object(parent))
        .map(|parent| &parent.pose);
    let transform =
        resolve_local_transform_approx(parent_pose, &object.pose, encoder.config.distance_scale);

    let node = if object.has_mesh() {
        let node = scene.create_node(object.name.clone(), transform);
        encoder.add_mesh(scene, node, object)?;

        let light_name = format!("{}{}", object.name, LIGHT_CHILD_SUFFIX);
        if let Some(light) = encoder.light_node(scene, light_name, object, Transform::IDENTITY) {
            scene.attach(light, node);
        }
        node
    } else {
        encoder
            .light_node(scene, object.name.clone(), object, transform)
            .unwrap_or_else(|| scene.create_node(object.name.clone(), transform))
    };

    let parent = parent_output.unwrap_or_else(|| scene.root());
    scene.attach(node, parent);
    debug!("Exported node '{}'", object.name);

    for &child in tree.children(id) {
        traverse(scene, tree, child, Some(node), encoder)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenefbx_core::{Color, Quat, Vec3};
    use scenefbx_scene::{Light, LightType, Material, Mesh, Pose};
    use tempfile::TempDir;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new("tri");
        mesh.vertices = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        mesh.indices = vec![0, 1, 2];
        mesh
    }

    fn export(tree: &SceneTree, config: &ExportConfig) -> Scene {
        let codec = TextureCodec::new(&config.staging_dir);
        let encoder = NodeEncoder::new(config, &codec);
        let mut scene = Scene::new("test");
        traverse(&mut scene, tree, tree.root(), None, &encoder).unwrap();
        scene
    }

    #[test]
    fn test_child_attaches_under_parent() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::default().with_data_root(dir.path());

        let parent = SceneObject::new("Parent")
            .with_pose(Pose::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .with_mesh(triangle())
            .with_material(Material::new("M"));
        let child = SceneObject::new("Child").with_pose(Pose::from_position(Vec3::new(1.0, 2.0, 0.0)));

        let mut tree = SceneTree::new(parent);
        tree.add_child(tree.root(), child).unwrap();

        let scene = export(&tree, &config);
        let parent = scene.find_child(scene.root(), "Parent").unwrap();
        let child = scene.find_child(parent, "Child").unwrap();

        assert_eq!(scene.node(parent).transform.translation, Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(scene.node(child).transform.translation, Vec3::new(0.0, 200.0, 0.0));
        assert!(scene.node(parent).texture_shading);
        assert_eq!(scene.node(parent).materials.len(), 1);
        assert!(scene.node(child).attribute.is_none());
    }

    #[test]
    fn test_mesh_light_gets_light_child_first() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::default()
            .with_data_root(dir.path())
            .with_materials(false);

        let lamp = SceneObject::new("Lamp")
            .with_pose(Pose::new(
                Vec3::new(0.0, 1.0, 0.0),
                Quat::from_euler_degrees(Vec3::new(0.0, 45.0, 0.0)),
                Vec3::ONE,
            ))
            .with_mesh(triangle())
            .with_light(Light::new(LightType::Point, 1.0, Color::WHITE));
        let mut tree = SceneTree::new(lamp);
        tree.add_child(tree.root(), SceneObject::new("Shade")).unwrap();

        let scene = export(&tree, &config);
        let lamp = scene.find_child(scene.root(), "Lamp").unwrap();
        let children: Vec<_> = scene
            .node(lamp)
            .children()
            .iter()
            .map(|&c| scene.node(c).name.as_str())
            .collect();
        assert_eq!(children, vec!["Lamp_light", "Shade"]);

        let light = scene.find_child(lamp, "Lamp_light").unwrap();
        assert_eq!(scene.node(light).transform, Transform::IDENTITY);
        assert!(matches!(scene.node(light).attribute, Some(NodeAttribute::Light(_))));
        assert!(scene.node(lamp).materials.is_empty());
    }

    #[test]
    fn test_light_only_node() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::default().with_data_root(dir.path());
        let tree = SceneTree::new(
            SceneObject::new("Sun").with_light(Light::new(LightType::Directional, 2.0, Color::WHITE)),
        );

        let scene = export(&tree, &config);
        let sun = scene.find_child(scene.root(), "Sun").unwrap();
        let Some(NodeAttribute::Light(light)) = scene.node(sun).attribute else {
            panic!("expected a light attribute");
        };
        assert_eq!(scene.light(light).intensity, 2.0);
        assert!(scene.node(sun).children().is_empty());
    }

    #[test]
    fn test_missing_material_aborts() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::default().with_data_root(dir.path());
        let tree = SceneTree::new(SceneObject::new("Bare").with_mesh(triangle()));

        let codec = TextureCodec::new(&config.staging_dir);
        let encoder = NodeEncoder::new(&config, &codec);
        let mut scene = Scene::new("test");
        assert!(traverse(&mut scene, &tree, tree.root(), None, &encoder).is_err());
    }

    #[test]
    fn test_invalid_mesh_rejected() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::default()
            .with_data_root(dir.path())
            .with_materials(false);

        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 7, 2];
        mesh.normals = Some(vec![Vec3::new(0.0, 0.0, 1.0)]);
        let tree = SceneTree::new(SceneObject::new("Broken").with_mesh(mesh));

        let codec = TextureCodec::new(&config.staging_dir);
        let encoder = NodeEncoder::new(&config, &codec);
        let mut scene = Scene::new("test");
        let result = traverse(&mut scene, &tree, tree.root(), None, &encoder);
        assert!(matches!(result, Err(crate::ExportError::Scene(_))));
    }
}
