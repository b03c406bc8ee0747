use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::material::PbrMaterial;
use nalgebra::{Matrix4, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Carries nothing; flat shading needs no per-fragment data.
#[derive(Debug, Clone, Copy)]
pub struct UnlitVarying;

impl Add for UnlitVarying {
    type Output = Self;
    fn add(self, _: Self) -> Self {
        UnlitVarying
    }
}

impl Mul<f32> for UnlitVarying {
    type Output = Self;
    fn mul(self, _: f32) -> Self {
        UnlitVarying
    }
}

impl Interpolatable for UnlitVarying {}

/// Constant-color shader for the light indicator gizmos.
pub struct UnlitShader {
    mvp: Matrix4<f32>,
    color: Vector3<f32>,
}

impl UnlitShader {
    pub fn new(mvp: Matrix4<f32>, color: Vector3<f32>) -> Self {
        Self { mvp, color }
    }
}

impl Shader for UnlitShader {
    type Varying = UnlitVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, UnlitVarying) {
        (self.mvp * vertex.position.to_homogeneous(), UnlitVarying)
    }

    fn fragment(&self, _: UnlitVarying, _: Option<&PbrMaterial>) -> Vector3<f32> {
        self.color
    }
}
