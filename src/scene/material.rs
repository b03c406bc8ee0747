use crate::scene::texture::Texture;
use nalgebra::Vector3;
use std::sync::Arc;

/// Metallic-roughness PBR material. The four optional maps correspond to
/// the shader's `useTexAlbedo` / `useTexNormal` / `useTexMRA` /
/// `useTexEmissive` toggles; the MRA map uses ORM packing (R = occlusion,
/// G = roughness, B = metallic).
#[derive(Debug, Clone)]
pub struct PbrMaterial {
    /// Base color in linear space.
    pub albedo: Vector3<f32>,
    /// 0 = dielectric, 1 = metal.
    pub metallic: f32,
    /// 0 = mirror smooth, 1 = fully rough.
    pub roughness: f32,
    /// Ambient occlusion factor.
    pub ao: f32,
    /// Radiance emitted by the surface, already scaled by intensity.
    pub emissive: Vector3<f32>,

    pub albedo_texture: Option<Arc<Texture>>,
    pub normal_texture: Option<Arc<Texture>>,
    pub mra_texture: Option<Arc<Texture>>,
    pub emissive_texture: Option<Arc<Texture>>,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            metallic: 0.0,
            roughness: 0.5,
            ao: 1.0,
            emissive: Vector3::zeros(),
            albedo_texture: None,
            normal_texture: None,
            mra_texture: None,
            emissive_texture: None,
        }
    }
}
