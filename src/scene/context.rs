use crate::pipeline::program::ShaderProgram;
use crate::scene::camera::Camera;
use crate::scene::light::LightRig;
use crate::scene::scene_object::SceneObject;

/// Everything the render passes need for one scene: the camera, the shader
/// program holding the uniform state, the light registry bound to it, and
/// the objects to draw.
pub struct RenderContext {
    pub camera: Camera,
    pub program: ShaderProgram,
    pub lights: LightRig,
    pub objects: Vec<SceneObject>,
}
