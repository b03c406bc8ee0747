use crate::scene::camera::{Camera, Projection};
use minifb::{Key, MouseButton, MouseMode, Window};
use nalgebra::Vector3;

const MIN_FOV_DEG: f32 = 10.0;
const MAX_FOV_DEG: f32 = 120.0;
const MAX_PITCH: f32 = 1.55; // just shy of straight up/down

/// Free-fly camera controls: WASD to move, Space/Shift for up/down, drag
/// with the left mouse button to look, scroll to zoom the FOV.
pub struct CameraController {
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,
    zoom_speed: f32,
    last_mouse: Option<(f32, f32)>,
}

impl CameraController {
    /// Derives the initial yaw/pitch from where the camera already looks,
    /// so taking control does not snap the view.
    pub fn new(camera: &Camera, speed: f32, sensitivity: f32, zoom_speed: f32) -> Self {
        let forward = (camera.target - camera.position).normalize();
        Self {
            yaw: forward.z.atan2(forward.x),
            pitch: forward.y.asin().clamp(-MAX_PITCH, MAX_PITCH),
            speed,
            sensitivity,
            zoom_speed,
            last_mouse: None,
        }
    }

    fn forward(&self) -> Vector3<f32> {
        Vector3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        )
    }

    /// Applies one frame of input. Returns true when the camera moved and
    /// its matrices were refreshed.
    pub fn update(&mut self, window: &Window, camera: &mut Camera, dt: f32) -> bool {
        let mut changed = false;

        // Mouse look, only while dragging.
        if window.get_mouse_down(MouseButton::Left) {
            if let Some((x, y)) = window.get_mouse_pos(MouseMode::Pass) {
                if let Some((px, py)) = self.last_mouse {
                    let dx = x - px;
                    let dy = y - py;
                    if dx != 0.0 || dy != 0.0 {
                        self.yaw += dx * self.sensitivity;
                        self.pitch =
                            (self.pitch - dy * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
                        changed = true;
                    }
                }
                self.last_mouse = Some((x, y));
            }
        } else {
            self.last_mouse = None;
        }

        let forward = self.forward();
        let right = forward.cross(&Vector3::y()).normalize();

        let mut movement = Vector3::zeros();
        if window.is_key_down(Key::W) {
            movement += forward;
        }
        if window.is_key_down(Key::S) {
            movement -= forward;
        }
        if window.is_key_down(Key::D) {
            movement += right;
        }
        if window.is_key_down(Key::A) {
            movement -= right;
        }
        if window.is_key_down(Key::Space) {
            movement += Vector3::y();
        }
        if window.is_key_down(Key::LeftShift) {
            movement -= Vector3::y();
        }
        if movement.norm() > 0.0 {
            camera.position += movement.normalize() * self.speed * dt;
            changed = true;
        }

        if let Some((_, scroll_y)) = window.get_scroll_wheel()
            && scroll_y != 0.0
            && let Projection::Perspective { fov_y_rad, .. } = &mut camera.projection
        {
            let fov_deg = (fov_y_rad.to_degrees() - scroll_y * self.zoom_speed * 10.0)
                .clamp(MIN_FOV_DEG, MAX_FOV_DEG);
            *fov_y_rad = fov_deg.to_radians();
            changed = true;
        }

        if changed {
            camera.target = camera.position + self.forward();
            camera.update_matrices();
        }
        changed
    }
}
