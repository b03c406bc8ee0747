use crate::core::color::Color;
use crate::core::math::transform;
use crate::io::config::{Config, GroundConfig, ObjectConfig};
use crate::io::obj_loader;
use crate::pipeline::program::{ShaderProgram, UniformValue};
use crate::scene::camera::Camera;
use crate::scene::context::RenderContext;
use crate::scene::light::{LightKind, LightRig};
use crate::scene::material::PbrMaterial;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use crate::scene::scene_object::SceneObject;
use crate::scene::texture::Texture;
use crate::scene::utils::normalize_and_center_model;
use log::{info, warn};
use nalgebra::{Matrix4, Point3, Vector3};
use std::sync::Arc;

/// Builds a complete [`RenderContext`] from a parsed config: camera, PBR
/// program with the ambient term latched, the light rig populated in config
/// order, and every object (plus the ground plane) loaded and placed.
pub fn build_context(config: &Config, aspect: f32) -> Result<RenderContext, String> {
    let camera = build_camera(config, aspect)?;

    let mut program = ShaderProgram::pbr();
    let ambient = &config.ambient;
    program.set_by_name(
        "ambientColor",
        UniformValue::Vec3(Vector3::new(
            ambient.color[0] as f32 / 255.0,
            ambient.color[1] as f32 / 255.0,
            ambient.color[2] as f32 / 255.0,
        )),
    );
    program.set_by_name("ambient", UniformValue::Float(ambient.intensity));

    let mut lights = LightRig::new(&mut program);
    for (index, light) in config.lights.iter().enumerate() {
        let kind = parse_light_kind(&light.kind)
            .ok_or_else(|| format!("light {index}: unknown kind '{}'", light.kind))?;
        lights.create(
            kind,
            Vector3::from(light.position),
            Vector3::from(light.target),
            Color::from(light.color),
            light.intensity,
            &mut program,
        );
        if !light.enabled
            && let Some(entry) = lights.light_mut(index)
        {
            entry.enabled = false;
            let entry = *entry;
            LightRig::sync(&mut program, &entry);
        }
    }
    info!("scene has {} light(s)", lights.count());

    let mut objects = Vec::new();
    for object in &config.objects {
        objects.push(build_object(object)?);
    }
    if config.ground.enabled {
        objects.push(build_ground(&config.ground));
    }

    Ok(RenderContext {
        camera,
        program,
        lights,
        objects,
    })
}

fn parse_light_kind(name: &str) -> Option<LightKind> {
    match name.to_ascii_lowercase().as_str() {
        "directional" => Some(LightKind::Directional),
        "point" => Some(LightKind::Point),
        "spot" => Some(LightKind::Spot),
        _ => None,
    }
}

fn build_camera(config: &Config, aspect: f32) -> Result<Camera, String> {
    let cam = &config.camera;
    let position = Point3::from(Vector3::from(cam.position));
    let target = Point3::from(Vector3::from(cam.target));
    let up = Vector3::from(cam.up);

    match cam.projection.to_ascii_lowercase().as_str() {
        "perspective" => Ok(Camera::perspective(
            position,
            target,
            up,
            cam.fov.to_radians(),
            aspect,
            cam.near,
            cam.far,
        )),
        "orthographic" => Ok(Camera::orthographic(
            position,
            target,
            up,
            cam.ortho_height,
            aspect,
            cam.near,
            cam.far,
        )),
        other => Err(format!("unknown projection '{other}'")),
    }
}

fn build_object(config: &ObjectConfig) -> Result<SceneObject, String> {
    let mut model = match obj_loader::load_obj(&config.path) {
        Ok(model) => model,
        Err(e) => {
            // Keep the viewer running with placeholder geometry rather than
            // dying on a bad path. Magenta makes the failure obvious.
            warn!("{e}, substituting fallback triangle");
            let material = PbrMaterial {
                albedo: Vector3::new(1.0, 0.0, 1.0),
                roughness: 1.0,
                ..Default::default()
            };
            Model::new(vec![Mesh::fallback_triangle(0)], vec![material])
        }
    };

    normalize_and_center_model(&mut model);
    apply_overrides(&mut model, config);

    let transform = transform::compose_trs(
        &Vector3::from(config.position),
        &Vector3::from(config.rotation),
        &Vector3::from(config.scale),
    );
    Ok(SceneObject::new(model, transform))
}

/// Config-level material settings win over whatever the MTL provided, and
/// textures are only ever attached from the config.
fn apply_overrides(model: &mut Model, config: &ObjectConfig) {
    let albedo_texture = load_texture(config.albedo_texture.as_deref());
    let normal_texture = load_texture(config.normal_texture.as_deref());
    let mra_texture = load_texture(config.mra_texture.as_deref());
    let emissive_texture = load_texture(config.emissive_texture.as_deref());

    for material in &mut model.materials {
        if let Some(albedo) = config.albedo {
            material.albedo = Vector3::from(albedo);
        }
        if let Some(metallic) = config.metallic {
            material.metallic = metallic;
        }
        if let Some(roughness) = config.roughness {
            material.roughness = roughness;
        }
        if let Some(ao) = config.ao {
            material.ao = ao;
        }
        if let Some(emissive) = config.emissive {
            material.emissive = Vector3::from(emissive) * config.emissive_intensity;
        }
        material.albedo_texture = albedo_texture.clone();
        material.normal_texture = normal_texture.clone();
        material.mra_texture = mra_texture.clone();
        material.emissive_texture = emissive_texture.clone();
    }
}

fn load_texture(path: Option<&str>) -> Option<Arc<Texture>> {
    let path = path?;
    match Texture::load(path) {
        Ok(texture) => Some(Arc::new(texture)),
        Err(e) => {
            warn!("{e}, continuing without it");
            None
        }
    }
}

fn build_ground(config: &GroundConfig) -> SceneObject {
    let material = PbrMaterial {
        albedo: config.albedo.map_or(Vector3::new(0.5, 0.5, 0.5), Vector3::from),
        metallic: config.metallic.unwrap_or(0.0),
        roughness: config.roughness.unwrap_or(0.8),
        ..Default::default()
    };
    let model = Model::new(vec![Mesh::ground_plane(config.size, 0)], vec![material]);
    SceneObject::new(model, Matrix4::identity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::light::MAX_LIGHTS;

    #[test]
    fn default_config_builds_the_four_light_scene() {
        let config = Config::default();
        let context = build_context(&config, 16.0 / 9.0).unwrap();

        assert_eq!(context.lights.count(), 4);
        let colors: Vec<_> = context.lights.lights().iter().map(|l| l.color).collect();
        assert_eq!(colors[0], Color::YELLOW.normalized());
        assert_eq!(colors[1], Color::GREEN.normalized());
        assert_eq!(colors[2], Color::RED.normalized());
        assert_eq!(colors[3], Color::BLUE.normalized());

        // Missing model file falls back to the triangle, plus the ground.
        assert_eq!(context.objects.len(), 2);
    }

    #[test]
    fn extra_configured_lights_are_dropped_at_the_cap() {
        let mut config = Config::default();
        let extra = config.lights[0].clone();
        config.lights.push(extra);
        let context = build_context(&config, 1.0).unwrap();
        assert_eq!(context.lights.count(), MAX_LIGHTS);
    }

    #[test]
    fn unknown_light_kind_is_a_config_error() {
        let mut config = Config::default();
        config.lights[0].kind = "area".to_string();
        assert!(build_context(&config, 1.0).is_err());
    }

    #[test]
    fn disabled_light_in_config_lands_disabled_in_the_shader() {
        let mut config = Config::default();
        config.lights[2].enabled = false;
        let context = build_context(&config, 1.0).unwrap();

        assert!(!context.lights.lights()[2].enabled);
        let program = &context.program;
        assert_eq!(program.int(program.location("lights[2].enabled")), 0);
        assert_eq!(program.int(program.location("lights[1].enabled")), 1);
    }
}
