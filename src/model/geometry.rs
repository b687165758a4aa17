//! Mesh geometry: vertices, faces, models
//!
//! Faces reference vertices by index into their mesh. Each vertex keeps
//! three location snapshots — local, world and the working location the
//! shader stages overwrite — because lighting needs world-space values
//! after projection has already consumed the working copy.

use serde::{Deserialize, Serialize};

use super::material::Material;
use super::transform::{Transform, TransformDesc};
use crate::math::FixedVec3;

#[derive(Debug, Clone)]
pub struct Vertex {
    pub index: usize,
    pub local_location: FixedVec3,
    pub local_normal: FixedVec3,
    pub world_location: FixedVec3,
    pub world_normal: FixedVec3,
    /// Working location the pipeline transforms through clip and screen space
    pub location: FixedVec3,
    pub material: usize,
    /// Combined color of the lights reaching this vertex, written once per
    /// frame by the lighting model
    pub light_color: i32,
}

impl Vertex {
    pub fn new(index: usize, location: FixedVec3, normal: FixedVec3, material: usize) -> Self {
        Self {
            index,
            local_location: location,
            local_normal: normal,
            world_location: location,
            world_normal: normal,
            location,
            material,
            light_color: 0,
        }
    }

    /// Reset the working location back to the world-space snapshot, ready
    /// for the next pass to project it
    pub fn reset(&mut self) {
        self.location = self.world_location;
    }
}

/// Triangle face: three vertex indices, per-vertex UVs, a face normal
#[derive(Debug, Clone)]
pub struct Face {
    pub vertices: [usize; 3],
    pub uvs: [[i32; 2]; 3],
    pub local_normal: FixedVec3,
    pub world_normal: FixedVec3,
    pub material: usize,
}

impl Face {
    pub fn new(v0: usize, v1: usize, v2: usize, material: usize) -> Self {
        Self {
            vertices: [v0, v1, v2],
            uvs: [[0, 0]; 3],
            local_normal: FixedVec3::ZERO,
            world_normal: FixedVec3::ZERO,
            material,
        }
    }

    pub fn with_uvs(mut self, uvs: [[i32; 2]; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_normal(mut self, normal: FixedVec3) -> Self {
        self.local_normal = normal;
        self.world_normal = normal;
        self
    }
}

/// Vertex and face arrays sharing one material table
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }
}

/// A mesh placed in the world
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub transform: Transform,
    pub mesh: Mesh,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn new(name: &str, mesh: Mesh, materials: Vec<Material>) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::new(),
            mesh,
            materials,
        }
    }
}

/// Float-unit mesh description for scene files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshDesc {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<FaceDesc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceDesc {
    pub indices: [usize; 3],
    #[serde(default)]
    pub uvs: [[f32; 2]; 3],
    #[serde(default)]
    pub material: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDesc {
    pub name: String,
    pub transform: TransformDesc,
    pub mesh: MeshDesc,
    pub materials: Vec<super::material::MaterialDesc>,
}

impl MeshDesc {
    /// Convert float units to fixed point and wire up faces
    pub fn to_mesh(&self) -> Mesh {
        let vertices = self
            .positions
            .iter()
            .zip(self.normals.iter())
            .enumerate()
            .map(|(index, (p, n))| {
                Vertex::new(
                    index,
                    FixedVec3::from_floats(p[0], p[1], p[2]),
                    FixedVec3::from_floats(n[0], n[1], n[2]),
                    0,
                )
            })
            .collect();
        let faces = self
            .faces
            .iter()
            .map(|f| {
                let uvs = f.uvs.map(|uv| {
                    [
                        crate::math::fixed::to_fixed(uv[0]),
                        crate::math::fixed::to_fixed(uv[1]),
                    ]
                });
                let a = FixedVec3::from_floats(
                    self.positions[f.indices[0]][0],
                    self.positions[f.indices[0]][1],
                    self.positions[f.indices[0]][2],
                );
                let b = FixedVec3::from_floats(
                    self.positions[f.indices[1]][0],
                    self.positions[f.indices[1]][1],
                    self.positions[f.indices[1]][2],
                );
                let c = FixedVec3::from_floats(
                    self.positions[f.indices[2]][0],
                    self.positions[f.indices[2]][1],
                    self.positions[f.indices[2]][2],
                );
                let normal = (b - a).cross(c - a).normalize();
                Face::new(f.indices[0], f.indices[1], f.indices[2], f.material)
                    .with_uvs(uvs)
                    .with_normal(normal)
            })
            .collect();
        Mesh::new(vertices, faces)
    }
}
