use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};
use std::f32::consts::PI;

/// Indexed triangle geometry. `material_id` points into the owning model's
/// material list.
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material_id: usize,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, material_id: usize) -> Self {
        Self {
            vertices,
            indices,
            material_id,
        }
    }

    /// Single CCW triangle facing +Z; the fallback geometry when a model
    /// fails to load.
    pub fn fallback_triangle(material_id: usize) -> Self {
        let n = Vector3::z();
        let vertices = vec![
            Vertex::new(Point3::new(0.0, 0.5, 0.0), n, Vector2::new(0.5, 1.0)),
            Vertex::new(Point3::new(-0.5, -0.5, 0.0), n, Vector2::new(0.0, 0.0)),
            Vertex::new(Point3::new(0.5, -0.5, 0.0), n, Vector2::new(1.0, 0.0)),
        ];
        Self::new(vertices, vec![0, 1, 2], material_id)
    }

    /// Square ground plane in the XZ plane, centered at the origin, facing
    /// up, viewed-from-above winding CCW.
    pub fn ground_plane(size: f32, material_id: usize) -> Self {
        let half = size / 2.0;
        let n = Vector3::y();
        let mut vertices = Vec::with_capacity(4);
        for (x, z, u, v) in [
            (-half, -half, 0.0, 0.0),
            (-half, half, 0.0, 1.0),
            (half, half, 1.0, 1.0),
            (half, -half, 1.0, 0.0),
        ] {
            let mut vertex = Vertex::new(Point3::new(x, 0.0, z), n, Vector2::new(u, v));
            vertex.tangent = Vector3::x();
            vertices.push(vertex);
        }
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3], material_id)
    }

    /// UV sphere used for the per-light indicator gizmos.
    pub fn uv_sphere(radius: f32, rings: usize, segments: usize, material_id: usize) -> Self {
        let rings = rings.max(3);
        let segments = segments.max(3);

        let mut vertices = Vec::with_capacity((rings + 1) * (segments + 1));
        for ring in 0..=rings {
            let theta = PI * ring as f32 / rings as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            for segment in 0..=segments {
                let phi = 2.0 * PI * segment as f32 / segments as f32;
                let (sin_p, cos_p) = phi.sin_cos();

                let normal = Vector3::new(sin_t * cos_p, cos_t, sin_t * sin_p);
                let mut vertex = Vertex::new(
                    Point3::from(normal * radius),
                    normal,
                    Vector2::new(
                        segment as f32 / segments as f32,
                        1.0 - ring as f32 / rings as f32,
                    ),
                );
                // dP/du direction; degenerate at the poles, which is fine
                // for a gizmo mesh.
                vertex.tangent = Vector3::new(-sin_p, 0.0, cos_p);
                vertices.push(vertex);
            }
        }

        let stride = (segments + 1) as u32;
        let mut indices = Vec::with_capacity(rings * segments * 6);
        for ring in 0..rings as u32 {
            for segment in 0..segments as u32 {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::new(vertices, indices, material_id)
    }
}
