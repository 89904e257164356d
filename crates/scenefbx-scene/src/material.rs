//! Surface materials and their texture slots

use std::collections::BTreeMap;

use scenefbx_core::Color;

use crate::texture::RawTexture;

/// Slot holding the base color texture, bound to the diffuse channel
pub const ALBEDO_SLOT: &str = "albedo";
/// Slot holding the tangent-space normal map, bound to the normal-map channel
pub const NORMAL_SLOT: &str = "normal";

/// A host material: colors, scalar factors and named texture slots
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Base (diffuse) color
    pub diffuse_color: Color,
    /// Emissive color
    pub emissive_color: Color,
    /// Ambient color
    pub ambient_color: Color,
    /// Ambient multiplier
    pub ambient_factor: f32,
    /// Diffuse multiplier
    pub diffuse_factor: f32,
    /// Specular multiplier
    pub specular_factor: f32,
    /// 0 for opaque, 1 for fully transparent
    pub transparency_factor: f32,
    textures: BTreeMap<String, RawTexture>,
}

impl Material {
    /// White opaque material without textures
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_color: Color::WHITE,
            emissive_color: Color::new(0.0, 0.0, 0.0, 1.0),
            ambient_color: Color::new(0.0, 0.0, 0.0, 1.0),
            ambient_factor: 1.0,
            diffuse_factor: 1.0,
            specular_factor: 0.5,
            transparency_factor: 0.0,
            textures: BTreeMap::new(),
        }
    }

    /// Set the base color
    pub fn with_diffuse_color(mut self, color: Color) -> Self {
        self.diffuse_color = color;
        self
    }

    /// Set the emissive color
    pub fn with_emissive_color(mut self, color: Color) -> Self {
        self.emissive_color = color;
        self
    }

    /// Bind a texture to a named slot, replacing any previous binding
    pub fn with_texture(mut self, slot: impl Into<String>, texture: RawTexture) -> Self {
        self.set_texture(slot, texture);
        self
    }

    /// Bind a texture to a named slot in place
    pub fn set_texture(&mut self, slot: impl Into<String>, texture: RawTexture) {
        self.textures.insert(slot.into(), texture);
    }

    /// Look up the texture bound to `slot`
    pub fn texture(&self, slot: &str) -> Option<&RawTexture> {
        self.textures.get(slot)
    }

    /// Texture bound to the albedo slot
    pub fn albedo(&self) -> Option<&RawTexture> {
        self.texture(ALBEDO_SLOT)
    }

    /// Texture bound to the normal-map slot
    pub fn normal_map(&self) -> Option<&RawTexture> {
        self.texture(NORMAL_SLOT)
    }

    /// All bound slots in name order
    pub fn textures(&self) -> impl Iterator<Item = (&str, &RawTexture)> {
        self.textures.iter().map(|(slot, tex)| (slot.as_str(), tex))
    }
}
