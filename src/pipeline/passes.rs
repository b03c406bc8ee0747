use crate::core::color::{aces_tone_mapping, linear_to_srgb};
use crate::pipeline::program::{ShaderProgram, UniformValue};
use crate::pipeline::renderer::{ClearOptions, Renderer};
use crate::pipeline::shaders::pbr::PbrShader;
use crate::pipeline::shaders::unlit::UnlitShader;
use crate::scene::context::RenderContext;
use crate::scene::light::LightRig;
use crate::scene::material::PbrMaterial;
use crate::scene::mesh::Mesh;
use nalgebra::{Matrix4, Vector3};
use rayon::prelude::*;

/// Radius and tessellation of the per-light indicator spheres.
const GIZMO_RADIUS: f32 = 0.2;
const GIZMO_SEGMENTS: usize = 8;

/// Renders one complete frame in fixed order: clear, then the scene
/// objects, then one indicator gizmo per light in creation order. The 2D
/// overlay and presentation belong to the caller.
pub fn render_frame(renderer: &mut Renderer, context: &mut RenderContext, clear: &ClearOptions) {
    let RenderContext {
        camera,
        program,
        lights,
        objects,
    } = context;

    program.set_by_name("viewPos", UniformValue::Vec3(camera.position.coords));

    renderer.clear(clear);

    let view = camera.view_matrix();
    let proj = camera.projection_matrix();

    for object in objects.iter() {
        for mesh in &object.model.meshes {
            let material = object.model.materials.get(mesh.material_id);
            set_texture_toggles(program, material);

            let shader = PbrShader::new(program, &object.transform, &view, &proj);
            renderer.draw_mesh(&shader, mesh, material);
        }
    }

    draw_light_gizmos(renderer, lights, &view, &proj);
}

fn set_texture_toggles(program: &mut ShaderProgram, material: Option<&PbrMaterial>) {
    let toggle = |present: bool| UniformValue::Int(present as i32);
    let (albedo, normal, mra, emissive) = match material {
        Some(m) => (
            m.albedo_texture.is_some(),
            m.normal_texture.is_some(),
            m.mra_texture.is_some(),
            m.emissive_texture.is_some(),
        ),
        None => (false, false, false, false),
    };
    program.set_by_name("useTexAlbedo", toggle(albedo));
    program.set_by_name("useTexNormal", toggle(normal));
    program.set_by_name("useTexMRA", toggle(mra));
    program.set_by_name("useTexEmissive", toggle(emissive));
}

/// One small sphere per light, at the light's position and in its color.
/// Enabled lights draw solid; disabled ones draw as wireframe.
fn draw_light_gizmos(
    renderer: &mut Renderer,
    lights: &LightRig,
    view: &Matrix4<f32>,
    proj: &Matrix4<f32>,
) {
    let sphere = Mesh::uv_sphere(GIZMO_RADIUS, GIZMO_SEGMENTS, GIZMO_SEGMENTS, 0);
    let view_proj = proj * view;

    for light in lights.lights() {
        let mvp = view_proj * crate::core::math::transform::translation(&light.position);
        let shader = UnlitShader::new(mvp, light.color.xyz());

        let was_wireframe = renderer.rasterizer.wireframe;
        renderer.rasterizer.wireframe = !light.enabled;
        renderer.draw_mesh(&shader, &sphere, None);
        renderer.rasterizer.wireframe = was_wireframe;
    }
}

/// Resolves the framebuffer into a packed 0xAARRGGBB buffer: exposure,
/// optional ACES tone mapping, then gamma.
pub fn post_process_to_buffer(
    renderer: &Renderer,
    exposure: f32,
    tone_mapping: bool,
) -> Vec<u32> {
    let width = renderer.framebuffer.width;
    let height = renderer.framebuffer.height;

    let mut buffer = vec![0u32; width * height];
    buffer
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let mut color = renderer
                    .framebuffer
                    .resolve_pixel(x, y)
                    .unwrap_or_else(Vector3::zeros)
                    * exposure;
                if tone_mapping {
                    color = aces_tone_mapping(color);
                }
                let srgb = linear_to_srgb(color);

                let r = (srgb.x.clamp(0.0, 1.0) * 255.0) as u32;
                let g = (srgb.y.clamp(0.0, 1.0) * 255.0) as u32;
                let b = (srgb.z.clamp(0.0, 1.0) * 255.0) as u32;
                *out = 0xFF00_0000 | (r << 16) | (g << 8) | b;
            }
        });
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::Config;
    use crate::scene::loader::build_context;

    fn tiny_context() -> RenderContext {
        let mut config = Config::default();
        config.objects.clear(); // skip the OBJ fallback path
        build_context(&config, 1.0).unwrap()
    }

    #[test]
    fn frame_renders_without_panicking_and_fills_background() {
        let mut renderer = Renderer::new(32, 32, 1);
        let mut context = tiny_context();
        render_frame(
            &mut renderer,
            &mut context,
            &ClearOptions {
                color: Vector3::new(0.1, 0.2, 0.3),
                ..Default::default()
            },
        );
        // A corner pixel is background; the ground plane is below the
        // horizon at this camera.
        let corner = renderer.framebuffer.resolve_pixel(0, 0).unwrap();
        assert!((corner - Vector3::new(0.1, 0.2, 0.3)).norm() < 1e-5);
    }

    #[test]
    fn view_pos_follows_the_camera() {
        let mut renderer = Renderer::new(8, 8, 1);
        let mut context = tiny_context();
        render_frame(&mut renderer, &mut context, &ClearOptions::default());
        let pushed = context.program.vec3(context.program.location("viewPos"));
        assert_eq!(pushed, context.camera.position.coords);
    }

    #[test]
    fn post_process_packs_opaque_pixels() {
        let mut renderer = Renderer::new(4, 4, 1);
        renderer.clear(&ClearOptions {
            color: Vector3::new(1.0, 1.0, 1.0),
            ..Default::default()
        });
        let buffer = post_process_to_buffer(&renderer, 1.0, false);
        assert_eq!(buffer.len(), 16);
        for px in buffer {
            assert_eq!(px >> 24, 0xFF);
            assert_eq!(px & 0xFF_FFFF, 0xFF_FFFF);
        }
    }

    #[test]
    fn tone_mapping_compresses_highlights() {
        let mut renderer = Renderer::new(2, 2, 1);
        renderer.clear(&ClearOptions {
            color: Vector3::new(4.0, 4.0, 4.0),
            ..Default::default()
        });
        let raw = post_process_to_buffer(&renderer, 1.0, false);
        let mapped = post_process_to_buffer(&renderer, 1.0, true);
        // Both saturate white-ish, but tone mapping must not exceed clamp.
        assert!(mapped[0] & 0xFF <= raw[0] & 0xFF);
    }
}
