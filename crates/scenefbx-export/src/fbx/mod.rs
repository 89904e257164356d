//! Binary FBX document model and encoding
//!
//! [`scene`] holds the document being assembled, [`layout`] turns it into an
//! fbxcel record tree and [`writer`] encodes that tree as binary FBX 7.4.

pub mod layout;
pub mod node;
pub mod scene;
pub mod writer;

pub use layout::layout;
pub use node::{Properties70, RecordTree};
pub use scene::{
    FileTexture, Geometry, GeometryId, LayerElement, LightAttribute, LightId, LightKind,
    MappingMode, MaterialChannel, MaterialId, MaterialLayer, Node, NodeAttribute, NodeId,
    PhongMaterial, ReferenceMode, Scene, TextureId, TextureUsage,
};
pub use writer::{encode, write_fbx, FBX_VERSION};
