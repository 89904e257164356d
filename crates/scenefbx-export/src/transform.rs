//! Parent-relative transforms
//!
//! Host poses are world-space. The hierarchical exporter needs transforms
//! relative to the parent node, expressed as translation, Euler rotation in
//! degrees (host convention, each angle in `[0, 360)`) and scale.

use scenefbx_core::Vec3;
use scenefbx_scene::Pose;

/// Translation, rotation and scale of one output node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation in output units (host units times the distance scale)
    pub translation: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Transform {
    /// No translation or rotation, unit scale
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Transform from its three components
    pub fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// World transform of `pose`: scaled position, world Euler rotation and
    /// lossy scale
    pub fn world(pose: &Pose, distance_scale: f32) -> Self {
        Self::new(
            pose.position * distance_scale,
            pose.euler_degrees(),
            pose.lossy_scale,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compute `child`'s transform relative to `parent`.
///
/// Translation is the world-space position difference scaled by
/// `distance_scale`; it is not rotated into the parent frame, so it is only
/// exact for unrotated, unit-scale parents. Rotation is
/// `inverse(parent) * child`. Scale is the component-wise ratio of lossy
/// scales; a zero parent component yields a non-finite value.
///
/// Without a parent the world transform is returned.
pub fn resolve_local_transform_approx(
    parent: Option<&Pose>,
    child: &Pose,
    distance_scale: f32,
) -> Transform {
    let Some(parent) = parent else {
        return Transform::world(child, distance_scale);
    };

    let translation = (child.position - parent.position) * distance_scale;
    let rotation = (parent.rotation.inverse() * child.rotation).to_euler_degrees();
    let scale = child.lossy_scale.div_components(&parent.lossy_scale);

    Transform::new(translation, rotation, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scenefbx_core::Quat;

    fn assert_angle_eq(actual: f32, expected: f32) {
        let diff = (actual - expected).rem_euclid(360.0);
        assert!(diff < 1e-2 || diff > 360.0 - 1e-2, "{actual} != {expected}");
    }

    fn pose(position: [f32; 3], euler: [f32; 3], scale: [f32; 3]) -> Pose {
        Pose::new(
            Vec3::from(position),
            Quat::from_euler_degrees(Vec3::from(euler)),
            Vec3::from(scale),
        )
    }

    #[test]
    fn test_root_uses_world_values() {
        let child = pose([1.0, 2.0, 3.0], [0.0, 90.0, 0.0], [2.0, 2.0, 2.0]);
        let t = resolve_local_transform_approx(None, &child, 100.0);

        assert_eq!(t.translation, Vec3::new(100.0, 200.0, 300.0));
        assert_angle_eq(t.rotation.y, 90.0);
        assert_eq!(t.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_identical_rotations_give_zero() {
        let parent = pose([0.0; 3], [30.0, 45.0, 60.0], [1.0; 3]);
        let child = pose([1.0; 3], [30.0, 45.0, 60.0], [1.0; 3]);
        let t = resolve_local_transform_approx(Some(&parent), &child, 1.0);

        assert_angle_eq(t.rotation.x, 0.0);
        assert_angle_eq(t.rotation.y, 0.0);
        assert_angle_eq(t.rotation.z, 0.0);
    }

    #[test]
    fn test_relative_rotation() {
        let parent = pose([0.0; 3], [0.0, 30.0, 0.0], [1.0; 3]);
        let child = pose([0.0; 3], [0.0, 75.0, 0.0], [1.0; 3]);
        let t = resolve_local_transform_approx(Some(&parent), &child, 1.0);
        assert_angle_eq(t.rotation.y, 45.0);
    }

    #[test]
    fn test_scale_ratio() {
        let parent = pose([0.0; 3], [0.0; 3], [1.0, 2.0, 3.0]);
        let child = pose([0.0; 3], [0.0; 3], [2.0, 6.0, 12.0]);
        let t = resolve_local_transform_approx(Some(&parent), &child, 100.0);
        assert_eq!(t.scale, Vec3::new(2.0, 3.0, 4.0));

        let parent = pose([0.0; 3], [0.0; 3], [2.0, 2.0, 2.0]);
        let child = pose([0.0; 3], [0.0; 3], [4.0, 6.0, 8.0]);
        let t = resolve_local_transform_approx(Some(&parent), &child, 100.0);
        assert_eq!(t.scale, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_zero_parent_scale_is_unguarded() {
        let parent = pose([0.0; 3], [0.0; 3], [0.0, 1.0, 1.0]);
        let child = pose([0.0; 3], [0.0; 3], [1.0, 1.0, 1.0]);
        let t = resolve_local_transform_approx(Some(&parent), &child, 1.0);
        assert!(!t.scale.is_finite());
    }

    #[test]
    fn test_angles_in_range() {
        let child = pose([0.0; 3], [-10.0, -20.0, -30.0], [1.0; 3]);
        let t = resolve_local_transform_approx(None, &child, 1.0);
        for angle in t.rotation.to_array() {
            assert!((0.0..360.0).contains(&angle), "{angle}");
        }
    }

    proptest! {
        #[test]
        fn prop_translation_is_scaled_difference(
            p in prop::array::uniform3(-1000.0f32..1000.0),
            c in prop::array::uniform3(-1000.0f32..1000.0),
            s in 0.01f32..1000.0,
        ) {
            let parent = Pose::from_position(Vec3::from(p));
            let child = Pose::from_position(Vec3::from(c));
            let t = resolve_local_transform_approx(Some(&parent), &child, s);

            let expected = (Vec3::from(c) - Vec3::from(p)) * s;
            prop_assert_eq!(t.translation, expected);
        }

        #[test]
        fn prop_root_translation_is_scaled_position(
            c in prop::array::uniform3(-1000.0f32..1000.0),
            s in 0.01f32..1000.0,
        ) {
            let child = Pose::from_position(Vec3::from(c));
            let t = resolve_local_transform_approx(None, &child, s);
            prop_assert_eq!(t.translation, Vec3::from(c) * s);
        }
    }
}
