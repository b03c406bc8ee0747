use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric coordinates (alpha, beta, gamma) of `p` with respect to the
/// screen-space triangle (a, b, c). Returns `None` for degenerate triangles.
pub fn barycentric(
    p: Point2<f32>,
    a: Point2<f32>,
    b: Point2<f32>,
    c: Point2<f32>,
) -> Option<Vector3<f32>> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    // 2x signed area of the full triangle
    let area_x2 = ab.x * ac.y - ab.y * ac.x;
    if area_x2.abs() < EPSILON {
        return None;
    }
    let inv = 1.0 / area_x2;

    let beta = (ap.x * ac.y - ap.y * ac.x) * inv;
    let gamma = (ab.x * ap.y - ab.y * ap.x) * inv;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

/// True when barycentric weights lie inside the triangle (with tolerance).
#[inline(always)]
pub fn inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Perspective-correct barycentric weights from screen-space weights and the
/// clip-space w of each vertex. Returns `None` on numerical instability.
pub fn perspective_correct(bary: Vector3<f32>, w: [f32; 3]) -> Option<Vector3<f32>> {
    let inv_w = w.map(|wi| if wi.abs() > EPSILON { 1.0 / wi } else { 1.0 });

    let wa = bary.x * inv_w[0];
    let wb = bary.y * inv_w[1];
    let wc = bary.z * inv_w[2];

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(Vector3::new(wa, wb, wc) / sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barycentric_at_vertices() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let c = Point2::new(0.0, 10.0);

        let at_a = barycentric(a, a, b, c).unwrap();
        assert!((at_a - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);

        let centroid = barycentric(Point2::new(10.0 / 3.0, 10.0 / 3.0), a, b, c).unwrap();
        assert!((centroid - Vector3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)).norm() < 1e-4);
    }

    #[test]
    fn degenerate_triangle_rejected() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(5.0, 5.0);
        assert!(barycentric(a, a, b, b).is_none());
    }

    #[test]
    fn perspective_correct_is_identity_for_equal_w() {
        let bary = Vector3::new(0.25, 0.25, 0.5);
        let corrected = perspective_correct(bary, [2.0, 2.0, 2.0]).unwrap();
        assert!((corrected - bary).norm() < 1e-6);
    }

    #[test]
    fn perspective_correct_weights_toward_near_vertex() {
        // A vertex with smaller w (closer to the camera) gains weight.
        let bary = Vector3::new(0.5, 0.5, 0.0);
        let corrected = perspective_correct(bary, [1.0, 4.0, 1.0]).unwrap();
        assert!(corrected.x > corrected.y);
    }
}
