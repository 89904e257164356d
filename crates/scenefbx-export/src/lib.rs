//! SceneFBX Export Pipeline
//!
//! Converts scene objects and scene trees into binary FBX 7.4 files:
//! - transforms resolved relative to the parent node
//! - triangle meshes with normal, color and UV layers
//! - Phong materials with staged (and optionally embedded) PNG textures
//! - point, directional, spot and area lights

pub mod config;
pub mod error;
pub mod exporter;
pub mod fbx;
pub mod hierarchy;
pub mod light;
pub mod material;
pub mod mesh;
pub mod textures;
pub mod transform;

pub use config::{ExportConfig, STAGING_DIR_NAME};
pub use error::{ExportError, ExportResult};
pub use exporter::{ExportSummary, FbxExporter};
pub use light::encode_light;
pub use material::bind_materials;
pub use mesh::encode_mesh_geometry;
pub use textures::{StagedTexture, TextureCodec, TextureError};
pub use transform::{resolve_local_transform_approx, Transform};
