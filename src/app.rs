use crate::core::rasterizer::CullMode;
use crate::io::config::{Config, RenderConfig};
use crate::io::image::save_argb_buffer;
use crate::pipeline::passes::{post_process_to_buffer, render_frame};
use crate::pipeline::renderer::{ClearOptions, Renderer};
use crate::scene::context::RenderContext;
use crate::scene::light::LightRig;
use crate::scene::loader::build_context;
use crate::scene::texture::Texture;
use log::{error, info, warn};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use nalgebra::Vector3;
use std::path::{Path, PathBuf};
use std::time::Instant;

const TITLE: &str = "PBR Viewer";

fn parse_cull_mode(name: &str) -> CullMode {
    match name.to_ascii_lowercase().as_str() {
        "back" => CullMode::Back,
        "front" => CullMode::Front,
        "none" => CullMode::None,
        other => {
            warn!("unknown cull mode '{other}', using back-face culling");
            CullMode::Back
        }
    }
}

fn load_background(render: &RenderConfig) -> Option<Texture> {
    let path = render.background_image.as_deref()?;
    match Texture::load(path) {
        Ok(texture) => Some(texture),
        Err(e) => {
            warn!("{e}, falling back to gradient/color background");
            None
        }
    }
}

fn clear_options<'a>(render: &RenderConfig, texture: Option<&'a Texture>) -> ClearOptions<'a> {
    let gradient = match (render.background_gradient_top, render.background_gradient_bottom) {
        (Some(top), Some(bottom)) => Some((Vector3::from(top), Vector3::from(bottom))),
        _ => None,
    };
    ClearOptions {
        color: render.background_color.map_or(Vector3::zeros(), Vector3::from),
        // A solid color in the config wins over the default gradient.
        gradient: if render.background_color.is_some() {
            None
        } else {
            gradient
        },
        texture,
    }
}

/// Interactive viewer. Keys 1-4 toggle the corresponding light, R reloads
/// the config (keeping the camera pose), Escape quits.
pub fn run_gui(mut config: Config, config_path: Option<PathBuf>) -> Result<(), String> {
    let (width, height) = (config.render.width, config.render.height);
    let aspect = width as f32 / height as f32;

    let mut window = Window::new(TITLE, width, height, WindowOptions::default())
        .map_err(|e| format!("failed to open window: {e}"))?;
    window.set_target_fps(60);

    let mut context = build_context(&config, aspect)?;
    let mut renderer = Renderer::new(width, height, config.render.samples);
    renderer.set_cull_mode(parse_cull_mode(&config.render.cull_mode));
    let mut background = load_background(&config.render);

    let mut controller = crate::ui::input::CameraController::new(
        &context.camera,
        config.camera.speed,
        config.camera.sensitivity,
        config.camera.zoom_speed,
    );

    let mut last_frame = Instant::now();
    let mut fps_window_start = Instant::now();
    let mut frames_in_window = 0u32;

    info!("viewer ready: {width}x{height}, {} light(s)", context.lights.count());

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32().min(0.1);
        last_frame = now;

        controller.update(&window, &mut context.camera, dt);
        handle_light_toggles(&window, &mut context);

        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            match reload(&config_path, aspect, &context) {
                Ok((new_config, new_context)) => {
                    config = new_config;
                    context = new_context;
                    renderer.set_cull_mode(parse_cull_mode(&config.render.cull_mode));
                    background = load_background(&config.render);
                    info!("scene reloaded");
                }
                Err(e) => error!("reload failed: {e}"),
            }
        }

        let clear = clear_options(&config.render, background.as_ref());
        render_frame(&mut renderer, &mut context, &clear);
        let buffer =
            post_process_to_buffer(&renderer, config.render.exposure, config.render.tone_mapping);

        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|e| format!("failed to present frame: {e}"))?;

        frames_in_window += 1;
        let elapsed = fps_window_start.elapsed().as_secs_f32();
        if elapsed >= 0.5 {
            let fps = frames_in_window as f32 / elapsed;
            window.set_title(&format!("{TITLE} - {fps:.0} FPS"));
            fps_window_start = Instant::now();
            frames_in_window = 0;
        }
    }
    Ok(())
}

fn handle_light_toggles(window: &Window, context: &mut RenderContext) {
    const TOGGLES: [Key; 4] = [Key::Key1, Key::Key2, Key::Key3, Key::Key4];
    for (index, key) in TOGGLES.iter().enumerate() {
        if !window.is_key_pressed(*key, KeyRepeat::No) {
            continue;
        }
        if let Some(light) = context.lights.light_mut(index) {
            light.enabled = !light.enabled;
            let light = *light;
            LightRig::sync(&mut context.program, &light);
            info!(
                "light {index} {}",
                if light.enabled { "enabled" } else { "disabled" }
            );
        }
    }
}

/// Re-reads the config and rebuilds the scene, carrying the current camera
/// pose over so the view does not jump.
fn reload(
    config_path: &Option<PathBuf>,
    aspect: f32,
    current: &RenderContext,
) -> Result<(Config, RenderContext), String> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut context = build_context(&config, aspect)?;
    context.camera.position = current.camera.position;
    context.camera.target = current.camera.target;
    context.camera.update_matrices();
    Ok((config, context))
}

/// Headless render: one frame straight to a PNG.
pub fn run_cli(config: Config, output: Option<&Path>) -> Result<(), String> {
    let (width, height) = (config.render.width, config.render.height);
    let aspect = width as f32 / height as f32;

    let mut context = build_context(&config, aspect)?;
    let mut renderer = Renderer::new(width, height, config.render.samples);
    renderer.set_cull_mode(parse_cull_mode(&config.render.cull_mode));
    let background = load_background(&config.render);

    let start = Instant::now();
    let clear = clear_options(&config.render, background.as_ref());
    render_frame(&mut renderer, &mut context, &clear);
    let buffer =
        post_process_to_buffer(&renderer, config.render.exposure, config.render.tone_mapping);
    info!("rendered in {} ms", start.elapsed().as_millis());

    let path = output.unwrap_or_else(|| Path::new(&config.render.output));
    save_argb_buffer(&buffer, width, height, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cull_mode_names_parse() {
        assert_eq!(parse_cull_mode("back"), CullMode::Back);
        assert_eq!(parse_cull_mode("FRONT"), CullMode::Front);
        assert_eq!(parse_cull_mode("none"), CullMode::None);
        assert_eq!(parse_cull_mode("bogus"), CullMode::Back);
    }

    #[test]
    fn explicit_color_overrides_the_gradient() {
        let mut render = RenderConfig::default();
        render.background_color = Some([1.0, 0.0, 0.0]);
        let options = clear_options(&render, None);
        assert!(options.gradient.is_none());
        assert_eq!(options.color, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn headless_render_writes_a_png() {
        let mut config = Config::default();
        config.render.width = 32;
        config.render.height = 32;
        config.render.samples = 1;
        config.objects.clear();
        let path = std::env::temp_dir().join("pbr_viewer_headless_test.png");

        run_cli(config, Some(path.as_path())).unwrap();
        let rendered = image::open(&path).unwrap();
        assert_eq!(rendered.width(), 32);
        std::fs::remove_file(&path).ok();
    }
}
