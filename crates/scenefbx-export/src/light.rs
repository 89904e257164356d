//! Light encoding

use scenefbx_scene::{Light, LightType};
use tracing::debug;

use crate::fbx::{LightAttribute, LightId, LightKind, Scene};

impl From<LightType> for LightKind {
    fn from(kind: LightType) -> Self {
        match kind {
            LightType::Directional => LightKind::Directional,
            LightType::Point => LightKind::Point,
            LightType::Spot => LightKind::Spot,
            LightType::Area => LightKind::Area,
        }
    }
}

/// Add a light attribute for `light` to `scene`.
///
/// Directional intensities are copied as-is; every other kind is multiplied
/// by `intensity_scale`. Shadows are always cast, with a black shadow color.
pub fn encode_light(scene: &mut Scene, name: &str, light: &Light, intensity_scale: f32) -> LightId {
    let factor = match light.kind {
        LightType::Directional => 1.0,
        _ => f64::from(intensity_scale),
    };

    let attribute = LightAttribute {
        name: name.to_string(),
        kind: light.kind.into(),
        color: light.color.to_rgb_f64(),
        intensity: f64::from(light.intensity) * factor,
        cast_shadows: true,
        shadow_color: [0.0; 3],
    };

    debug!(
        "Encoded {:?} light '{}' with intensity {}",
        attribute.kind, name, attribute.intensity
    );
    scene.add_light(attribute)
}
