//! Scene objects: a named world pose with optional mesh, light and materials

use scenefbx_core::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::light::Light;
use crate::material::Material;
use crate::mesh::Mesh;

/// World-space pose of an object as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position in host distance units
    pub position: Vec3,
    /// World rotation
    pub rotation: Quat,
    /// Effective world scale (product of the scale chain)
    pub lossy_scale: Vec3,
    /// Scale relative to the host parent
    pub local_scale: Vec3,
}

impl Pose {
    /// Origin, no rotation, unit scale
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        lossy_scale: Vec3::ONE,
        local_scale: Vec3::ONE,
    };

    /// Pose with a uniform-in-chain scale (local and lossy scale equal)
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            lossy_scale: scale,
            local_scale: scale,
        }
    }

    /// Identity pose moved to `position`
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// World rotation as host Euler angles in degrees
    pub fn euler_degrees(&self) -> Vec3 {
        self.rotation.to_euler_degrees()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A renderable object of the host scene
#[derive(Debug, Clone, Default)]
pub struct SceneObject {
    /// Stable object name, used for output node names
    pub name: String,
    /// World pose
    pub pose: Pose,
    /// Triangle mesh, if the object renders one
    pub mesh: Option<Mesh>,
    /// Light component, if any
    pub light: Option<Light>,
    /// One material per submesh, or a single material for the whole mesh
    pub materials: Vec<Material>,
}

impl SceneObject {
    /// Object named `name` at the identity pose
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the world pose
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Attach a mesh
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Attach a light
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    /// Append a material; order matches submesh order
    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    /// True if the object carries a mesh
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// True if the object carries a light
    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightType;
    use scenefbx_core::Color;

    #[test]
    fn test_builder() {
        let obj = SceneObject::new("Lamp")
            .with_pose(Pose::from_position(Vec3::new(1.0, 2.0, 3.0)))
            .with_light(Light::new(LightType::Spot, 2.0, Color::WHITE));

        assert!(obj.has_light());
        assert!(!obj.has_mesh());
        assert_eq!(obj.pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(obj.pose.lossy_scale, Vec3::ONE);
    }
}
