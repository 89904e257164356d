//! Export configuration

use std::path::{Path, PathBuf};

/// Name of the texture staging directory under the data root
pub const STAGING_DIR_NAME: &str = "temp_fbx_exporter";

/// FBX export options
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Bind materials and textures to mesh nodes
    pub export_materials: bool,
    /// Embed staged PNG bytes into the FBX file
    pub export_embedded: bool,
    /// Multiplier applied to node translations
    pub distance_scale: f32,
    /// Multiplier applied to non-directional light intensities
    pub intensity_scale: f32,
    /// Multiplier applied to mesh vertex positions
    pub vertex_scale: f32,
    /// Decompress block-compressed textures to RGB24 instead of RGBA32
    pub drop_alpha: bool,
    /// Directory receiving staged PNG textures
    pub staging_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_materials: true,
            export_embedded: true,
            distance_scale: 100.0,
            intensity_scale: 10_000.0,
            vertex_scale: 100.0,
            drop_alpha: true,
            staging_dir: std::env::temp_dir().join(STAGING_DIR_NAME),
        }
    }
}

impl ExportConfig {
    /// Stage textures under `<data_root>/temp_fbx_exporter`
    pub fn with_data_root(mut self, data_root: impl AsRef<Path>) -> Self {
        self.staging_dir = data_root.as_ref().join(STAGING_DIR_NAME);
        self
    }

    /// Enable or disable binding materials and textures
    pub fn with_materials(mut self, enabled: bool) -> Self {
        self.export_materials = enabled;
        self
    }

    /// Embed staged textures into the file, or reference them by path
    pub fn with_embedded(mut self, enabled: bool) -> Self {
        self.export_embedded = enabled;
        self
    }

    /// Set the node translation multiplier
    pub fn with_distance_scale(mut self, scale: f32) -> Self {
        self.distance_scale = scale;
        self
    }

    /// Set the light intensity multiplier
    pub fn with_intensity_scale(mut self, scale: f32) -> Self {
        self.intensity_scale = scale;
        self
    }

    /// Set the vertex position multiplier
    pub fn with_vertex_scale(mut self, scale: f32) -> Self {
        self.vertex_scale = scale;
        self
    }

    /// Drop alpha when decompressing block-compressed textures
    pub fn with_drop_alpha(mut self, drop: bool) -> Self {
        self.drop_alpha = drop;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert!(config.export_materials);
        assert!(config.export_embedded);
        assert!(config.drop_alpha);
        assert_eq!(config.distance_scale, 100.0);
        assert_eq!(config.intensity_scale, 10_000.0);
        assert_eq!(config.vertex_scale, 100.0);
        assert!(config.staging_dir.ends_with(STAGING_DIR_NAME));
    }

    #[test]
    fn test_data_root() {
        let config = ExportConfig::default().with_data_root("/data/project");
        assert_eq!(
            config.staging_dir,
            PathBuf::from("/data/project").join(STAGING_DIR_NAME)
        );
    }
}
