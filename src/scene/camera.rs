use crate::core::math::transform;
use nalgebra::{Matrix4, Point3, Vector3};

#[derive(Debug, Clone)]
pub enum Projection {
    Perspective { fov_y_rad: f32, aspect: f32 },
    Orthographic { height: f32, aspect: f32 },
}

/// Free camera: position/target/up plus cached view and projection matrices.
/// Call `update_matrices` after mutating any parameter.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub near: f32,
    pub far: f32,
    pub projection: Projection,

    view: Matrix4<f32>,
    proj: Matrix4<f32>,
}

impl Camera {
    pub fn perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y_rad: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            target,
            up,
            near,
            far,
            projection: Projection::Perspective { fov_y_rad, aspect },
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    pub fn orthographic(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            target,
            up,
            near,
            far,
            projection: Projection::Orthographic { height, aspect },
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    pub fn update_matrices(&mut self) {
        self.view = transform::look_at(&self.position, &self.target, &self.up);
        self.proj = match self.projection {
            Projection::Perspective { fov_y_rad, aspect } => {
                transform::perspective(aspect, fov_y_rad, self.near, self.far)
            }
            Projection::Orthographic { height, aspect } => {
                let half_h = height / 2.0;
                let half_w = half_h * aspect;
                transform::orthographic(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        };
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrices_follow_parameter_changes() {
        let mut camera = Camera::perspective(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            45f32.to_radians(),
            16.0 / 9.0,
            0.1,
            100.0,
        );
        let before = camera.view_matrix();
        camera.position = Point3::new(3.0, 0.0, 5.0);
        // Stale until update_matrices is called.
        assert_eq!(camera.view_matrix(), before);
        camera.update_matrices();
        assert_ne!(camera.view_matrix(), before);
    }
}
