//! scenefbx-scene
//!
//! The in-memory scene model consumed by the FBX exporter.
//!
//! # Contents
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SceneObject`] | Named world pose with optional mesh, light and materials |
//! | [`SceneTree`]   | Arena-backed parent/child hierarchy of objects |
//! | [`Mesh`]        | Vertex/index buffers with submesh partition |
//! | [`Material`]    | Colors, factors and texture slots |
//! | [`Light`]       | Normalized light kind, intensity and color |
//! | [`RawTexture`]  | Named pixel buffer with a format tag |
//!
//! Scenes can be built in code or loaded from a JSON
//! [`SceneDescription`], whose textures may be DDS files or ordinary
//! images.
//!
//! # Example
//!
//! ```rust,ignore
//! use scenefbx_scene::SceneDescription;
//!
//! let desc = SceneDescription::load("scene.json")?;
//! let trees = desc.build_trees("assets")?;
//! println!("Loaded {} root objects", trees.len());
//! ```

pub mod dds;
pub mod description;
pub mod light;
pub mod material;
pub mod mesh;
pub mod object;
pub mod texture;
pub mod tree;

// Re-export main types
pub use dds::{load_dds, parse_dds};
pub use description::SceneDescription;
pub use light::{Light, LightType};
pub use material::{Material, ALBEDO_SLOT, NORMAL_SLOT};
pub use mesh::{Mesh, SubMesh, Topology};
pub use object::{Pose, SceneObject};
pub use texture::{RawTexture, TextureFormat};
pub use tree::{NodeId, SceneTree, TreeNode};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
