use nalgebra::{Point3, Vector2, Vector3};

/// A single vertex in object space.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    /// Texture coordinates, V pointing up.
    pub texcoord: Vector2<f32>,
    /// Tangent for normal mapping. Zero when the mesh carries no UVs;
    /// the PBR shader falls back to the geometric normal in that case.
    pub tangent: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent: Vector3::zeros(),
        }
    }
}
