use crate::scene::material::PbrMaterial;
use crate::scene::mesh::Mesh;

/// A complete 3D object: one or more meshes plus the materials they index.
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<PbrMaterial>,
}

impl Model {
    pub fn new(meshes: Vec<Mesh>, materials: Vec<PbrMaterial>) -> Self {
        Self { meshes, materials }
    }
}
