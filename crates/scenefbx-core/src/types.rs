//! Common types used across SceneFBX
//!
//! Plain math and color values shared by the scene model and the exporter.
//! Heavy lifting (quaternion products, Euler decomposition) is delegated to
//! `glam`; these types are the serializable boundary representation.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 3D vector (position, normal, scale, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// All zeros
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    /// All ones
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    /// Vector from components
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Component-wise division. A zero component in `other` yields a
    /// non-finite result, which is passed through unchanged.
    pub fn div_components(&self, other: &Self) -> Self {
        Self {
            x: self.x / other.x,
            y: self.y / other.y,
            z: self.z / other.z,
        }
    }

    /// True if no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Components as `[x, y, z]`
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Widen to the double precision used by FBX properties
    pub fn to_f64(self) -> [f64; 3] {
        [self.x as f64, self.y as f64, self.z as f64]
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<glam::Vec3> for Vec3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for glam::Vec3 {
    fn from(v: Vec3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

/// 2D vector (UV coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// U component
    pub x: f32,
    /// V component
    pub y: f32,
}

impl Vec2 {
    /// All zeros
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Vector from components
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Rotation quaternion stored as (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W (scalar) component
    pub w: f32,
}

impl Quat {
    /// No rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Quaternion from raw components
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Build a rotation from host-convention Euler angles in degrees.
    ///
    /// The host applies Z first, then X, then Y, so the quaternion is
    /// `Ry * Rx * Rz`.
    pub fn from_euler_degrees(euler: Vec3) -> Self {
        glam::Quat::from_euler(
            glam::EulerRot::YXZ,
            euler.y.to_radians(),
            euler.x.to_radians(),
            euler.z.to_radians(),
        )
        .into()
    }

    /// Inverse rotation (conjugate of the normalized quaternion)
    pub fn inverse(self) -> Self {
        glam::Quat::from(self).normalize().inverse().into()
    }

    /// Decompose into host-convention Euler angles in degrees, each wrapped
    /// into `[0, 360)`.
    pub fn to_euler_degrees(self) -> Vec3 {
        let (y, x, z) = glam::Quat::from(self).to_euler(glam::EulerRot::YXZ);
        Vec3::new(
            wrap_degrees(x.to_degrees()),
            wrap_degrees(y.to_degrees()),
            wrap_degrees(z.to_degrees()),
        )
    }
}

impl Mul for Quat {
    type Output = Self;

    /// Hamilton product: `self * rhs` applies `rhs` first
    fn mul(self, rhs: Self) -> Self {
        (glam::Quat::from(self) * glam::Quat::from(rhs)).into()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<glam::Quat> for Quat {
    fn from(q: glam::Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quat> for glam::Quat {
    fn from(q: Quat) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Linear RGBA color with float channels (0.0-1.0 nominal)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    /// Opaque black
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Color from RGBA components
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// RGB channels only, alpha dropped
    pub fn to_rgb_f64(&self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }

    /// Components widened to `f64`
    pub fn to_rgba_f64(&self) -> [f64; 4] {
        [self.r as f64, self.g as f64, self.b as f64, self.a as f64]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_angle_eq(actual: f32, expected: f32) {
        let diff = (actual - expected).rem_euclid(360.0);
        assert!(diff < 1e-3 || diff > 360.0 - 1e-3, "{actual} != {expected}");
    }

    #[test]
    fn test_vec3_operations() {
        let v1 = Vec3::new(1.0, 2.0, 3.0);
        let v2 = Vec3::new(4.0, 5.0, 6.0);

        assert!((v1.dot(&v2) - 32.0).abs() < 0.001);
        assert_eq!(v2 - v1, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(v1 * 2.0, Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_div_components_zero_is_not_finite() {
        let v = Vec3::new(1.0, 2.0, 3.0).div_components(&Vec3::new(0.0, 1.0, 1.0));
        assert!(!v.is_finite());
    }

    #[test]
    fn test_euler_roundtrip_single_axis() {
        let q = Quat::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let e = q.to_euler_degrees();
        assert_angle_eq(e.x, 0.0);
        assert_angle_eq(e.y, 90.0);
        assert_angle_eq(e.z, 0.0);
    }

    #[test]
    fn test_euler_negative_angles_wrap() {
        let q = Quat::from_euler_degrees(Vec3::new(0.0, 0.0, -30.0));
        let e = q.to_euler_degrees();
        assert_angle_eq(e.z, 330.0);
        assert!(e.z >= 0.0 && e.z < 360.0);
    }

    #[test]
    fn test_inverse_product_is_identity() {
        let q = Quat::from_euler_degrees(Vec3::new(10.0, 20.0, 30.0));
        let e = (q.inverse() * q).to_euler_degrees();
        assert_angle_eq(e.x, 0.0);
        assert_angle_eq(e.y, 0.0);
        assert_angle_eq(e.z, 0.0);
    }
}
