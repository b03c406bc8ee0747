use crate::scene::model::Model;
use nalgebra::Matrix4;

/// A model instance with its world transform.
pub struct SceneObject {
    pub model: Model,
    pub transform: Matrix4<f32>,
}

impl SceneObject {
    pub fn new(model: Model, transform: Matrix4<f32>) -> Self {
        Self { model, transform }
    }
}
