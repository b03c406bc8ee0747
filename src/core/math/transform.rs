use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

//=================================
// Matrix construction
//=================================
// All matrices are right-handed; the camera looks down -Z in view space.
// Written out by hand rather than delegating to nalgebra so the coordinate
// conventions stay visible in one place.

/// Look-at view matrix: world space -> view space.
#[rustfmt::skip]
pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let z_axis = (eye - target).normalize();
    let x_axis = up.cross(&z_axis).normalize();
    let y_axis = z_axis.cross(&x_axis);

    let rotation = Matrix4::new(
        x_axis.x, x_axis.y, x_axis.z, 0.0,
        y_axis.x, y_axis.y, y_axis.z, 0.0,
        z_axis.x, z_axis.y, z_axis.z, 0.0,
        0.0,      0.0,      0.0,      1.0,
    );

    rotation * translation(&-eye.coords)
}

/// Perspective projection mapping the view frustum to NDC [-1, 1].
#[rustfmt::skip]
pub fn perspective(aspect: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fov_y_rad / 2.0).tan();
    let nf = 1.0 / (near - far);

    Matrix4::new(
        f / aspect, 0.0, 0.0,               0.0,
        0.0,        f,   0.0,               0.0,
        0.0,        0.0, (far + near) * nf, 2.0 * far * near * nf,
        0.0,        0.0, -1.0,              0.0,
    )
}

/// Orthographic projection (right-handed).
#[rustfmt::skip]
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    let rl = 1.0 / (right - left);
    let tb = 1.0 / (top - bottom);
    let nf = 1.0 / (near - far);

    Matrix4::new(
        2.0 * rl, 0.0,      0.0,      -(right + left) * rl,
        0.0,      2.0 * tb, 0.0,      -(top + bottom) * tb,
        0.0,      0.0,      2.0 * nf, (far + near) * nf,
        0.0,      0.0,      0.0,      1.0,
    )
}

#[rustfmt::skip]
pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, offset.x,
        0.0, 1.0, 0.0, offset.y,
        0.0, 0.0, 1.0, offset.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
pub fn scaling(scale: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new(
        scale.x, 0.0,     0.0,     0.0,
        0.0,     scale.y, 0.0,     0.0,
        0.0,     0.0,     scale.z, 0.0,
        0.0,     0.0,     0.0,     1.0,
    )
}

#[rustfmt::skip]
pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
    let (s, c) = angle_rad.sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c,  -s,   0.0,
        0.0, s,   c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
    let (s, c) = angle_rad.sin_cos();
    Matrix4::new(
        c,   0.0, s,   0.0,
        0.0, 1.0, 0.0, 0.0,
       -s,   0.0, c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
    let (s, c) = angle_rad.sin_cos();
    Matrix4::new(
        c,  -s,   0.0, 0.0,
        s,   c,   0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Combined translate * rotate(XYZ, degrees) * scale object transform.
pub fn compose_trs(
    position: &Vector3<f32>,
    rotation_deg: &Vector3<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    translation(position)
        * rotation_x(rotation_deg.x.to_radians())
        * rotation_y(rotation_deg.y.to_radians())
        * rotation_z(rotation_deg.z.to_radians())
        * scaling(scale)
}

//=================================
// Per-vertex stages
//=================================

/// Perspective division: clip space -> NDC.
#[inline]
pub fn perspective_divide(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// Viewport transform: NDC -> screen pixels. Screen +Y points down.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_moves_eye_to_origin() {
        let eye = Point3::new(0.0, 0.0, 5.0);
        let view = look_at(&eye, &Point3::origin(), &Vector3::y());
        let transformed = view * eye.to_homogeneous();
        assert!(transformed.x.abs() < 1e-5);
        assert!(transformed.y.abs() < 1e-5);
        assert!(transformed.z.abs() < 1e-5);
    }

    #[test]
    fn perspective_maps_near_plane_to_minus_one() {
        let proj = perspective(1.0, 90f32.to_radians(), 1.0, 100.0);
        let clip = proj * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!((ndc_z + 1.0).abs() < 1e-4);
    }

    #[test]
    fn ndc_to_screen_flips_y() {
        let top_left = ndc_to_screen(-1.0, 1.0, 800.0, 600.0);
        assert_eq!(top_left, Point2::new(0.0, 0.0));
        let bottom_right = ndc_to_screen(1.0, -1.0, 800.0, 600.0);
        assert_eq!(bottom_right, Point2::new(800.0, 600.0));
    }
}
