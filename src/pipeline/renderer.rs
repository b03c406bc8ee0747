use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::scene::material::PbrMaterial;
use crate::scene::mesh::Mesh;
use crate::scene::texture::Texture;
use nalgebra::Vector3;

/// How to fill the background when a frame starts. Priority: texture, then
/// vertical gradient, then solid color.
pub struct ClearOptions<'a> {
    pub color: Vector3<f32>,
    pub gradient: Option<(Vector3<f32>, Vector3<f32>)>,
    pub texture: Option<&'a Texture>,
}

impl Default for ClearOptions<'_> {
    fn default() -> Self {
        Self {
            color: Vector3::zeros(),
            gradient: None,
            texture: None,
        }
    }
}

/// Owns the framebuffer and the rasterizer state; everything drawn in a
/// frame goes through here.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.rasterizer.cull_mode = mode;
    }

    /// Resets depth and paints the background.
    pub fn clear(&mut self, options: &ClearOptions) {
        let width = self.framebuffer.width.max(1) as f32;
        let height = self.framebuffer.height.max(1) as f32;

        self.framebuffer.clear_with(f32::INFINITY, |x, y| {
            if let Some(texture) = options.texture {
                let u = (x as f32 + 0.5) / width;
                let v = 1.0 - (y as f32 + 0.5) / height;
                return texture.sample_color(u, v);
            }
            if let Some((top, bottom)) = options.gradient {
                let t = (y as f32 + 0.5) / height;
                return top * (1.0 - t) + bottom * t;
            }
            options.color
        });
    }

    /// Runs the vertex stage once per vertex, then rasterizes every indexed
    /// triangle of the mesh with the fragment stage.
    pub fn draw_mesh<S: Shader>(&self, shader: &S, mesh: &Mesh, material: Option<&PbrMaterial>) {
        let transformed: Vec<_> = mesh.vertices.iter().map(|v| shader.vertex(v)).collect();

        for tri in mesh.indices.chunks_exact(3) {
            let a = &transformed[tri[0] as usize];
            let b = &transformed[tri[1] as usize];
            let c = &transformed[tri[2] as usize];
            self.rasterizer.draw_triangle(
                &self.framebuffer,
                shader,
                &[a.0, b.0, c.0],
                &[a.1, b.1, c.1],
                material,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use crate::core::pipeline::Interpolatable;
    use nalgebra::Vector4;

    #[derive(Clone, Copy)]
    struct NoVarying;
    impl std::ops::Add for NoVarying {
        type Output = Self;
        fn add(self, _: Self) -> Self {
            NoVarying
        }
    }
    impl std::ops::Mul<f32> for NoVarying {
        type Output = Self;
        fn mul(self, _: f32) -> Self {
            NoVarying
        }
    }
    impl Interpolatable for NoVarying {}

    struct IdentityShader;
    impl Shader for IdentityShader {
        type Varying = NoVarying;
        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, NoVarying) {
            (vertex.position.to_homogeneous(), NoVarying)
        }
        fn fragment(&self, _: NoVarying, _: Option<&PbrMaterial>) -> Vector3<f32> {
            Vector3::new(1.0, 1.0, 1.0)
        }
    }

    #[test]
    fn gradient_clear_interpolates_top_to_bottom() {
        let mut renderer = Renderer::new(4, 4, 1);
        renderer.clear(&ClearOptions {
            gradient: Some((Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0))),
            ..Default::default()
        });
        let top = renderer.framebuffer.resolve_pixel(0, 0).unwrap();
        let bottom = renderer.framebuffer.resolve_pixel(0, 3).unwrap();
        assert!(top.x > bottom.x);
        assert!(bottom.z > top.z);
    }

    #[test]
    fn draw_mesh_touches_covered_pixels() {
        let mut renderer = Renderer::new(8, 8, 1);
        renderer.clear(&ClearOptions::default());
        // Fallback triangle covers the viewport center.
        let mesh = Mesh::fallback_triangle(0);
        renderer.draw_mesh(&IdentityShader, &mesh, None);
        let center = renderer.framebuffer.resolve_pixel(4, 4).unwrap();
        assert_eq!(center, Vector3::new(1.0, 1.0, 1.0));
    }
}
