// scenefbx-scene/src/mesh.rs
//! Mesh geometry as exposed by the host

use scenefbx_core::{Color, Error, Result, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Primitive topology of a submesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Triangles,
    Quads,
    Lines,
    LineStrip,
    Points,
}

impl Topology {
    /// Number of indices consumed by one primitive when counting polygons
    /// for material assignment
    pub fn vertices_per_primitive(&self) -> u32 {
        match self {
            Topology::Triangles => 3,
            Topology::Quads | Topology::LineStrip => 4,
            Topology::Lines => 2,
            Topology::Points => 1,
        }
    }
}

/// Contiguous index range sharing one material.
/// Submesh `i` is drawn with material `i` of the owning object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMesh {
    /// First index in the mesh index buffer
    pub start_index: u32,
    /// Primitive topology
    #[serde(default)]
    pub topology: Topology,
    /// Index count
    pub index_count: u32,
}

impl SubMesh {
    /// Triangle-list submesh over `index_count` indices from `start_index`
    pub fn triangles(start_index: u32, index_count: u32) -> Self {
        Self {
            start_index,
            topology: Topology::Triangles,
            index_count,
        }
    }

    /// Number of primitives in this submesh
    pub fn primitive_count(&self) -> u32 {
        self.index_count / self.topology.vertices_per_primitive()
    }
}

/// A triangle mesh with optional per-vertex attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Mesh name
    pub name: String,
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Per-vertex normals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<Vec3>>,
    /// Per-vertex RGBA colors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
    /// Per-vertex UVs (first channel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvs: Option<Vec<Vec2>>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
    /// Mesh subsets (material groups)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check the structural invariants: parallel attribute lists match the
    /// vertex count, indices come in triples and stay in range, submesh
    /// ranges lie inside the index buffer.
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        let check = |attribute: &str, len: Option<usize>| -> Result<()> {
            match len {
                Some(len) if len != count => Err(Error::invalid_data(format!(
                    "mesh '{}': {} count {} does not match vertex count {}",
                    self.name, attribute, len, count
                ))),
                _ => Ok(()),
            }
        };
        check("normal", self.normals.as_ref().map(Vec::len))?;
        check("color", self.colors.as_ref().map(Vec::len))?;
        check("uv", self.uvs.as_ref().map(Vec::len))?;

        if self.indices.len() % 3 != 0 {
            return Err(Error::invalid_data(format!(
                "mesh '{}': index count {} is not a multiple of 3",
                self.name,
                self.indices.len()
            )));
        }

        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::invalid_data(format!(
                "mesh '{}': index {} out of range for {} vertices",
                self.name, bad, count
            )));
        }

        for (i, submesh) in self.submeshes.iter().enumerate() {
            let end = submesh.start_index as usize + submesh.index_count as usize;
            if end > self.indices.len() {
                return Err(Error::invalid_data(format!(
                    "mesh '{}': submesh {} ends at index {} past buffer of {}",
                    self.name,
                    i,
                    end,
                    self.indices.len()
                )));
            }
        }

        Ok(())
    }
}
