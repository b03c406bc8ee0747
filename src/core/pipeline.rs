use crate::core::geometry::Vertex;
use crate::scene::material::PbrMaterial;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Per-vertex data that can be linearly combined across a triangle.
/// `Add` and `Mul<f32>` give barycentric interpolation; `Send + Sync`
/// because fragments are shaded in parallel.
pub trait Interpolatable:
    Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

/// The programmable stages of the pipeline. Implementations are invoked
/// concurrently across fragments and must be thread-safe.
pub trait Shader: Send + Sync {
    /// Vertex-stage output, interpolated per fragment.
    type Varying: Interpolatable;

    /// Transforms a vertex into homogeneous clip space and produces the
    /// varying to interpolate across the primitive.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Computes the linear RGB color of a fragment. `material` is `None`
    /// when the mesh references no material; shaders pick a fallback.
    fn fragment(&self, varying: Self::Varying, material: Option<&PbrMaterial>) -> Vector3<f32>;
}
