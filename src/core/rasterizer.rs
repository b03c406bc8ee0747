use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{barycentric, inside_triangle, perspective_correct};
use crate::core::math::transform::{ndc_to_screen, perspective_divide};
use crate::core::pipeline::Shader;
use crate::scene::material::PbrMaterial;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

/// Draws triangles into a `FrameBuffer`: frustum clipping, perspective
/// division, culling, then a parallel per-row fragment loop.
pub struct Rasterizer {
    pub cull_mode: CullMode,
    /// When set, only fragments near triangle edges are shaded. Used for the
    /// wireframe indicator gizmos of disabled lights.
    pub wireframe: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
            wireframe: false,
        }
    }

    /// Rasterizes one triangle given clip-space positions and varyings.
    ///
    /// Clipping is Sutherland–Hodgman against the six W-normalized frustum
    /// planes, done in homogeneous clip space before the divide. The two
    /// vertex lists are swapped between planes to avoid re-allocating.
    pub fn draw_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&PbrMaterial>,
    ) {
        // Clipping a triangle against a box yields at most 9 vertices.
        let mut polygon: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(12);
        let mut scratch: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(12);
        for i in 0..3 {
            polygon.push((clip_coords[i], varyings[i]));
        }

        // (axis, sign) pairs; a point is inside when sign * p[axis] <= p.w.
        const PLANES: [(usize, f32); 6] = [
            (0, 1.0),
            (0, -1.0),
            (1, 1.0),
            (1, -1.0),
            (2, 1.0),
            (2, -1.0),
        ];

        for &(axis, sign) in &PLANES {
            if polygon.is_empty() {
                return;
            }
            Self::clip_against_plane::<S>(&polygon, &mut scratch, axis, sign);
            std::mem::swap(&mut polygon, &mut scratch);
        }

        if polygon.len() < 3 {
            return;
        }

        // Fan-triangulate the convex result.
        let anchor = polygon[0];
        for pair in polygon[1..].windows(2) {
            self.fill_triangle(
                framebuffer,
                shader,
                &[anchor.0, pair[0].0, pair[1].0],
                &[anchor.1, pair[0].1, pair[1].1],
                material,
            );
        }
    }

    fn clip_against_plane<S: Shader>(
        input: &[(Vector4<f32>, S::Varying)],
        output: &mut Vec<(Vector4<f32>, S::Varying)>,
        axis: usize,
        sign: f32,
    ) {
        output.clear();
        let inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

        let mut prev = *input.last().unwrap();
        let mut prev_inside = inside(&prev.0);

        for &curr in input {
            let curr_inside = inside(&curr.0);
            if curr_inside != prev_inside
                && let Some(hit) = Self::intersect_plane::<S>(prev, curr, axis, sign)
            {
                output.push(hit);
            }
            if curr_inside {
                output.push(curr);
            }
            prev = curr;
            prev_inside = curr_inside;
        }
    }

    /// Intersection of edge a->b with the plane sign * p[axis] = p.w,
    /// interpolating position and varying linearly in clip space.
    fn intersect_plane<S: Shader>(
        a: (Vector4<f32>, S::Varying),
        b: (Vector4<f32>, S::Varying),
        axis: usize,
        sign: f32,
    ) -> Option<(Vector4<f32>, S::Varying)> {
        let denom = sign * (b.0[axis] - a.0[axis]) - (b.0.w - a.0.w);
        if denom.abs() < 1e-9 {
            return None;
        }
        let t = (a.0.w - sign * a.0[axis]) / denom;
        if !t.is_finite() {
            return None;
        }
        Some((a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t))
    }

    /// Shades a triangle that is known to lie inside the frustum.
    fn fill_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&PbrMaterial>,
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut clip_w = [0.0f32; 3];
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = perspective_divide(&clip_coords[i]);
            clip_w[i] = clip_coords[i].w;
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // Signed area decides the facing; screen Y grows downward, so CCW
        // geometry comes out negative here.
        let e01 = screen[1] - screen[0];
        let e12 = screen[2] - screen[1];
        let signed_area = e01.x * e12.y - e01.y * e12.x;
        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let min_x = screen.iter().map(|p| p.x).fold(f32::MAX, f32::min).floor() as i32;
        let max_x = screen.iter().map(|p| p.x).fold(f32::MIN, f32::max).ceil() as i32;
        let min_y = screen.iter().map(|p| p.y).fold(f32::MAX, f32::min).floor() as i32;
        let max_y = screen.iter().map(|p| p.y).fold(f32::MIN, f32::max).ceil() as i32;

        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }

        let x0 = min_x.max(0) as usize;
        let x1 = max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let y0 = min_y.max(0) as usize;
        let y1 = max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        // Pixel distance from the edge opposite each vertex is that vertex's
        // barycentric weight times this factor. Lets wireframe lines stay
        // about a pixel wide no matter the triangle size.
        let twice_area = signed_area.abs().max(1e-6);
        let edge_scale = [
            twice_area / (screen[2] - screen[1]).norm().max(1e-6),
            twice_area / (screen[0] - screen[2]).norm().max(1e-6),
            twice_area / (screen[1] - screen[0]).norm().max(1e-6),
        ];

        (y0..=y1).into_par_iter().for_each(|y| {
            for x in x0..=x1 {
                let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric(center, screen[0], screen[1], screen[2]) else {
                    continue;
                };
                if !inside_triangle(bary) {
                    continue;
                }
                if self.wireframe {
                    // Keep only fragments within about a pixel of an edge.
                    let edge_distance = (bary.x * edge_scale[0])
                        .min(bary.y * edge_scale[1])
                        .min(bary.z * edge_scale[2]);
                    if edge_distance > 1.0 {
                        continue;
                    }
                }

                let Some(weights) = perspective_correct(bary, clip_w) else {
                    continue;
                };

                // Depth from clip-space Z, remapped from NDC to [0, 1].
                let z_ndc = weights.x * clip_coords[0].z
                    + weights.y * clip_coords[1].z
                    + weights.z * clip_coords[2].z;
                let depth = z_ndc * 0.5 + 0.5;

                if framebuffer.depth_test_and_update(x, y, depth) {
                    let varying =
                        varyings[0] * weights.x + varyings[1] * weights.y + varyings[2] * weights.z;
                    framebuffer.write_color(x, y, shader.fragment(varying, material));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use crate::core::pipeline::Interpolatable;
    use nalgebra::Vector3;

    #[derive(Clone, Copy)]
    struct Flat;
    impl std::ops::Add for Flat {
        type Output = Self;
        fn add(self, _: Self) -> Self {
            Flat
        }
    }
    impl std::ops::Mul<f32> for Flat {
        type Output = Self;
        fn mul(self, _: f32) -> Self {
            Flat
        }
    }
    impl Interpolatable for Flat {}

    struct WhiteShader;
    impl Shader for WhiteShader {
        type Varying = Flat;
        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Flat) {
            (vertex.position.to_homogeneous(), Flat)
        }
        fn fragment(&self, _: Flat, _: Option<&PbrMaterial>) -> Vector3<f32> {
            Vector3::new(1.0, 1.0, 1.0)
        }
    }

    fn fullscreen_triangle() -> [Vector4<f32>; 3] {
        // CCW in NDC, covers the whole viewport.
        [
            Vector4::new(-3.0, -1.0, 0.0, 1.0),
            Vector4::new(3.0, -1.0, 0.0, 1.0),
            Vector4::new(0.0, 3.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn covers_center_pixel() {
        let fb = FrameBuffer::new(8, 8, 1);
        let raster = Rasterizer::new();
        raster.draw_triangle(&fb, &WhiteShader, &fullscreen_triangle(), &[Flat; 3], None);
        assert_eq!(fb.resolve_pixel(4, 4), Some(Vector3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn back_face_is_culled() {
        let fb = FrameBuffer::new(8, 8, 1);
        let raster = Rasterizer::new();
        let [a, b, c] = fullscreen_triangle();
        // Reversed winding flips the facing.
        raster.draw_triangle(&fb, &WhiteShader, &[a, c, b], &[Flat; 3], None);
        assert_eq!(fb.resolve_pixel(4, 4), Some(Vector3::zeros()));
    }

    #[test]
    fn wireframe_skips_interior() {
        let fb = FrameBuffer::new(64, 64, 1);
        let mut raster = Rasterizer::new();
        raster.wireframe = true;
        raster.draw_triangle(&fb, &WhiteShader, &fullscreen_triangle(), &[Flat; 3], None);
        // Center of a large triangle is far from every edge.
        assert_eq!(fb.resolve_pixel(32, 24), Some(Vector3::zeros()));
    }

    #[test]
    fn triangle_behind_camera_is_clipped_away() {
        let fb = FrameBuffer::new(8, 8, 1);
        let raster = Rasterizer::new();
        let behind = [
            Vector4::new(-1.0, -1.0, 2.0, -1.0),
            Vector4::new(1.0, -1.0, 2.0, -1.0),
            Vector4::new(0.0, 1.0, 2.0, -1.0),
        ];
        raster.draw_triangle(&fb, &WhiteShader, &behind, &[Flat; 3], None);
        assert_eq!(fb.resolve_pixel(4, 4), Some(Vector3::zeros()));
    }
}
