//! FBX scene exporter
//!
//! Two entry points share one pipeline: initialize the output file and the
//! staging directory, build an FBX document, lay it out and write it.
//!
//! - [`FbxExporter::export_flat`]: every mesh object directly under the
//!   root with its world transform, lights gathered under a `Lights` group.
//! - [`FbxExporter::export_hierarchy`]: the source trees are reproduced
//!   with parent-relative transforms.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use scenefbx_scene::{SceneObject, SceneTree};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::fbx::{self, Scene};
use crate::hierarchy::{traverse, NodeEncoder};
use crate::textures::TextureCodec;
use crate::transform::Transform;

/// Name of the group node holding lights in flat exports
pub const LIGHTS_GROUP: &str = "Lights";
/// Suffix of light nodes in flat exports
pub const LIGHT_NODE_SUFFIX: &str = "_node";

/// What an export produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Path of the written file
    pub path: PathBuf,
    /// Size of the written file
    pub bytes: usize,
    /// Output nodes, excluding the document root
    pub nodes: usize,
    /// Geometry objects written
    pub meshes: usize,
    /// Material objects
    pub materials: usize,
    /// Staged textures
    pub textures: usize,
    /// Light attributes
    pub lights: usize,
}

impl ExportSummary {
    fn new(scene: &Scene, path: &Path, bytes: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            bytes,
            nodes: scene.node_count(),
            meshes: scene.geometry_count(),
            materials: scene.material_count(),
            textures: scene.texture_count(),
            lights: scene.light_count(),
        }
    }
}

/// FBX exporter
pub struct FbxExporter {
    config: ExportConfig,
    codec: TextureCodec,
}

impl FbxExporter {
    /// Create a new FBX exporter
    pub fn new(config: ExportConfig) -> Self {
        let codec = TextureCodec::new(&config.staging_dir);
        Self { config, codec }
    }

    /// Settings this exporter was created with
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export `objects` without hierarchy.
    ///
    /// Mesh objects become root children named after the object. A `Lights`
    /// group is always created; each light object adds a `<name>_node`
    /// child with its world position, world rotation and local scale.
    pub fn export_flat(
        &self,
        objects: &[SceneObject],
        output_path: impl AsRef<Path>,
    ) -> ExportResult<ExportSummary> {
        let output_path = output_path.as_ref();
        info!("Exporting {} objects (flat) to {}", objects.len(), output_path.display());

        let file = self.initialize(output_path)?;
        let mut scene = Scene::new(scene_name(output_path));
        let encoder = NodeEncoder::new(&self.config, &self.codec);
        let root = scene.root();

        for object in objects.iter().filter(|o| o.has_mesh()) {
            let transform = Transform::world(&object.pose, self.config.distance_scale);
            let node = scene.create_node(object.name.clone(), transform);
            encoder.add_mesh(&mut scene, node, object)?;
            scene.attach(node, root);
            debug!("Exported mesh object '{}'", object.name);
        }

        let group = scene.create_node(LIGHTS_GROUP, Transform::IDENTITY);
        scene.attach(group, root);
        for object in objects {
            let pose = &object.pose;
            let transform = Transform::new(
                pose.position * self.config.distance_scale,
                pose.euler_degrees(),
                pose.local_scale,
            );
            let name = format!("{}{}", object.name, LIGHT_NODE_SUFFIX);
            if let Some(node) = encoder.light_node(&mut scene, name, object, transform) {
                scene.attach(node, group);
            }
        }

        self.finish(&scene, file, output_path)
    }

    /// Export each tree under the document root, preserving hierarchy
    pub fn export_hierarchy(
        &self,
        trees: &[SceneTree],
        output_path: impl AsRef<Path>,
    ) -> ExportResult<ExportSummary> {
        let output_path = output_path.as_ref();
        info!(
            "Exporting {} trees (hierarchical) to {}",
            trees.len(),
            output_path.display()
        );

        let file = self.initialize(output_path)?;
        let mut scene = Scene::new(scene_name(output_path));
        let encoder = NodeEncoder::new(&self.config, &self.codec);

        for tree in trees {
            traverse(&mut scene, tree, tree.root(), None, &encoder)?;
        }

        self.finish(&scene, file, output_path)
    }

    /// Create the output file and the staging directory
    fn initialize(&self, output_path: &Path) -> ExportResult<File> {
        let file = File::create(output_path)?;
        self.codec.prepare()?;
        debug!("Staging textures in {}", self.codec.staging_dir().display());
        Ok(file)
    }

    fn finish(&self, scene: &Scene, file: File, output_path: &Path) -> ExportResult<ExportSummary> {
        let created = chrono::Local::now().naive_local();
        let records = fbx::layout(scene, created);
        let bytes = fbx::write_fbx(BufWriter::new(file), &records)?;

        let summary = ExportSummary::new(scene, output_path, bytes);
        info!(
            "Wrote {} ({} bytes, {} nodes, {} meshes, {} materials, {} lights)",
            output_path.display(),
            summary.bytes,
            summary.nodes,
            summary.meshes,
            summary.materials,
            summary.lights
        );
        Ok(summary)
    }
}

impl Default for FbxExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

fn scene_name(output_path: &Path) -> String {
    output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Scene".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenefbx_core::{Color, Vec3};
    use scenefbx_scene::{Light, LightType, Material, Mesh, Pose};
    use tempfile::TempDir;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new("tri");
        mesh.vertices = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        mesh.indices = vec![0, 1, 2];
        mesh
    }

    fn exporter(dir: &TempDir) -> FbxExporter {
        FbxExporter::new(ExportConfig::default().with_data_root(dir.path()))
    }

    #[test]
    fn test_flat_export_counts() {
        let dir = TempDir::new().unwrap();
        let objects = vec![
            SceneObject::new("A")
                .with_mesh(triangle())
                .with_material(Material::new("M")),
            SceneObject::new("B")
                .with_mesh(triangle())
                .with_material(Material::new("M")),
            SceneObject::new("Lamp")
                .with_pose(Pose::from_position(Vec3::new(0.0, 3.0, 0.0)))
                .with_light(Light::new(LightType::Point, 1.0, Color::WHITE)),
        ];

        let output = dir.path().join("flat.fbx");
        let summary = exporter(&dir).export_flat(&objects, &output).unwrap();

        assert_eq!(summary.meshes, 2);
        assert_eq!(summary.lights, 1);
        // A, B, Lights, Lamp_node
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.bytes as u64, std::fs::metadata(&output).unwrap().len());
        assert!(dir.path().join(crate::config::STAGING_DIR_NAME).is_dir());
    }

    #[test]
    fn test_flat_export_without_lights_keeps_group() {
        let dir = TempDir::new().unwrap();
        let objects = vec![SceneObject::new("A")
            .with_mesh(triangle())
            .with_material(Material::new("M"))];

        let summary = exporter(&dir)
            .export_flat(&objects, dir.path().join("no_lights.fbx"))
            .unwrap();
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.lights, 0);
    }

    #[test]
    fn test_hierarchy_export() {
        let dir = TempDir::new().unwrap();
        let mut tree = SceneTree::new(SceneObject::new("Parent"));
        tree.add_child(
            tree.root(),
            SceneObject::new("Child")
                .with_mesh(triangle())
                .with_material(Material::new("M")),
        )
        .unwrap();

        let summary = exporter(&dir)
            .export_hierarchy(&[tree], dir.path().join("tree.fbx"))
            .unwrap();
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.materials, 1);
    }

    #[test]
    fn test_missing_material_fails_export() {
        let dir = TempDir::new().unwrap();
        let objects = vec![SceneObject::new("Bare").with_mesh(triangle())];
        let result = exporter(&dir).export_flat(&objects, dir.path().join("bad.fbx"));
        assert!(matches!(
            result,
            Err(crate::ExportError::MissingMaterial { .. })
        ));
    }

    #[test]
    fn test_unwritable_output_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing").join("out.fbx");
        assert!(exporter(&dir).export_flat(&[], output).is_err());
    }

    #[test]
    fn test_scene_name() {
        assert_eq!(scene_name(Path::new("/tmp/level.fbx")), "level");
    }
}
