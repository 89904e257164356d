//! Mesh geometry encoding
//!
//! Host meshes become FBX geometry with one control point per vertex and one
//! polygon per triangle. Normals, colors and UVs are stored by control point
//! and only when the source mesh has them.

use scenefbx_scene::Mesh;
use tracing::debug;

use crate::fbx::{Geometry, GeometryId, LayerElement, Scene};

/// Layer element name of the per-vertex normals
pub const NORMALS_LAYER: &str = "Normals";
/// Layer element name of the per-vertex colors
pub const COLORS_LAYER: &str = "Colors";
/// Layer element name of the first UV channel, also the textures' UV set
pub const UV_LAYER: &str = "UVs";

/// Encode `mesh` into a new geometry of `scene`.
///
/// Positions are multiplied by `vertex_scale`. Triangles keep the source
/// winding; degenerate triangles are passed through.
pub fn encode_mesh_geometry(
    scene: &mut Scene,
    mesh: &Mesh,
    name_hint: &str,
    vertex_scale: f32,
) -> GeometryId {
    let name = if mesh.name.is_empty() { name_hint } else { &mesh.name };
    let mut geometry = Geometry::new(name);

    geometry.control_points = mesh.vertices.iter().map(|v| *v * vertex_scale).collect();
    geometry.polygons = mesh
        .indices
        .chunks_exact(3)
        .map(<[u32]>::to_vec)
        .collect();

    if let Some(normals) = &mesh.normals {
        geometry.normals = Some(LayerElement::by_control_point(NORMALS_LAYER, normals.clone()));
    }
    if let Some(colors) = &mesh.colors {
        geometry.colors = Some(LayerElement::by_control_point(COLORS_LAYER, colors.clone()));
    }
    if let Some(uvs) = &mesh.uvs {
        geometry.uvs = Some(LayerElement::by_control_point(UV_LAYER, uvs.clone()));
    }

    debug!(
        "Encoded mesh '{}': {} control points, {} polygons",
        name,
        geometry.control_points.len(),
        geometry.polygon_count()
    );
    scene.add_geometry(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fbx::{MappingMode, ReferenceMode};
    use scenefbx_core::{Color, Vec2, Vec3};

    fn quad() -> Mesh {
        let mut mesh = Mesh::new("Quad");
        mesh.vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        mesh.indices = vec![0, 1, 2, 0, 2, 3];
        mesh
    }

    #[test]
    fn test_plain_mesh_has_no_layers() {
        let mut scene = Scene::new("s");
        let id = encode_mesh_geometry(&mut scene, &quad(), "Object", 100.0);
        let geometry = scene.geometry(id);

        assert_eq!(geometry.control_points.len(), 4);
        assert_eq!(geometry.polygon_count(), 2);
        assert_eq!(geometry.polygons[1], vec![0, 2, 3]);
        assert_eq!(geometry.control_points[2], Vec3::new(100.0, 100.0, 0.0));
        assert!(geometry.has_no_layers());
    }

    #[test]
    fn test_attribute_layers() {
        let mut mesh = quad();
        mesh.normals = Some(vec![Vec3::new(0.0, 0.0, 1.0); 4]);
        mesh.uvs = Some(vec![Vec2::new(0.5, 0.5); 4]);

        let mut scene = Scene::new("s");
        let id = encode_mesh_geometry(&mut scene, &mesh, "Object", 1.0);
        let geometry = scene.geometry(id);

        let normals = geometry.normals.as_ref().unwrap();
        assert_eq!(normals.name, NORMALS_LAYER);
        assert_eq!(normals.mapping, MappingMode::ByControlPoint);
        assert_eq!(normals.reference, ReferenceMode::Direct);
        assert_eq!(normals.direct.len(), 4);

        assert_eq!(geometry.uvs.as_ref().unwrap().name, UV_LAYER);
        assert!(geometry.colors.is_none());
    }

    #[test]
    fn test_colors_and_name_fallback() {
        let mut mesh = quad();
        mesh.name.clear();
        mesh.colors = Some(vec![Color::new(1.0, 0.0, 0.0, 0.5); 4]);

        let mut scene = Scene::new("s");
        let id = encode_mesh_geometry(&mut scene, &mesh, "Crate", 1.0);
        let geometry = scene.geometry(id);
        assert_eq!(geometry.name, "Crate");
        assert_eq!(geometry.colors.as_ref().unwrap().direct[0].a, 0.5);
    }

    #[test]
    fn test_degenerate_triangle_passes_through() {
        let mut mesh = quad();
        mesh.indices = vec![0, 0, 0];

        let mut scene = Scene::new("s");
        let id = encode_mesh_geometry(&mut scene, &mesh, "Object", 1.0);
        assert_eq!(scene.geometry(id).polygons, vec![vec![0, 0, 0]]);
    }
}
