//! Light sources
//!
//! Host light kinds are normalized into the closed [`LightType`] set here
//! and nowhere else: anything the exporter does not know becomes a point
//! light.

use scenefbx_core::Color;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Supported light kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    Directional,
    #[default]
    Point,
    Spot,
    Area,
}

impl LightType {
    /// Normalize a host light-type code (0 = spot, 1 = directional,
    /// 2 = point, 3 = area). Unknown codes fall back to [`LightType::Point`].
    pub fn from_host_code(code: i64) -> Self {
        match code {
            0 => LightType::Spot,
            1 => LightType::Directional,
            2 => LightType::Point,
            3 => LightType::Area,
            other => {
                warn!(code = other, "Unknown light type code, exporting as point light");
                LightType::Point
            }
        }
    }

    /// Normalize a light-type name (case-insensitive). Unknown names fall
    /// back to [`LightType::Point`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "directional" => LightType::Directional,
            "point" => LightType::Point,
            "spot" => LightType::Spot,
            "area" | "rectangle" => LightType::Area,
            _ => {
                warn!(name, "Unknown light type, exporting as point light");
                LightType::Point
            }
        }
    }
}

/// A light component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Light type
    pub kind: LightType,
    /// Intensity in host units
    pub intensity: f32,
    /// Light color; alpha is ignored on export
    pub color: Color,
}

impl Light {
    /// Light of `kind` with host intensity and color
    pub fn new(kind: LightType, intensity: f32, color: Color) -> Self {
        Self {
            kind,
            intensity,
            color,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(LightType::Point, 1.0, Color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_codes() {
        assert_eq!(LightType::from_host_code(0), LightType::Spot);
        assert_eq!(LightType::from_host_code(1), LightType::Directional);
        assert_eq!(LightType::from_host_code(2), LightType::Point);
        assert_eq!(LightType::from_host_code(3), LightType::Area);
    }

    #[test]
    fn test_unknown_falls_back_to_point() {
        assert_eq!(LightType::from_host_code(4), LightType::Point);
        assert_eq!(LightType::from_host_code(-1), LightType::Point);
        assert_eq!(LightType::from_name("disc"), LightType::Point);
        assert_eq!(LightType::from_name("Directional"), LightType::Directional);
    }
}
