use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scene description loaded from TOML. Every section has defaults; with no
/// config file at all the viewer shows the classic four-point-light PBR
/// scene (yellow, green, red, blue).
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub ambient: AmbientConfig,
    #[serde(default)]
    pub ground: GroundConfig,
    #[serde(default = "default_lights")]
    pub lights: Vec<LightConfig>,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            ambient: AmbientConfig::default(),
            ground: GroundConfig::default(),
            lights: default_lights(),
            objects: default_objects(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let text = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read config file: {e}"))?;
        toml::from_str(&text).map_err(|e| format!("failed to parse TOML: {e}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    /// Supersampling factor per axis; 2 means 2x2 samples per pixel.
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    #[serde(default = "default_true")]
    pub tone_mapping: bool,
    /// "back", "front" or "none".
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String,
    #[serde(default = "default_output")]
    pub output: String,

    pub background_color: Option<[f32; 3]>,
    #[serde(default = "default_gradient_top")]
    pub background_gradient_top: Option<[f32; 3]>,
    #[serde(default = "default_gradient_bottom")]
    pub background_gradient_bottom: Option<[f32; 3]>,
    #[serde(default)]
    pub background_image: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            samples: default_samples(),
            exposure: default_exposure(),
            tone_mapping: true,
            cull_mode: default_cull_mode(),
            output: default_output(),
            background_color: None,
            background_gradient_top: default_gradient_top(),
            background_gradient_bottom: default_gradient_bottom(),
            background_image: None,
        }
    }
}

fn default_width() -> usize {
    1280
}
fn default_height() -> usize {
    720
}
fn default_samples() -> usize {
    2
}
fn default_exposure() -> f32 {
    1.0
}
fn default_cull_mode() -> String {
    "back".to_string()
}
fn default_output() -> String {
    "render.png".to_string()
}
fn default_gradient_top() -> Option<[f32; 3]> {
    Some([0.15, 0.17, 0.24])
}
fn default_gradient_bottom() -> Option<[f32; 3]> {
    Some([0.03, 0.03, 0.05])
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_cam_position")]
    pub position: [f32; 3],
    #[serde(default = "default_cam_target")]
    pub target: [f32; 3],
    #[serde(default = "default_cam_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// "perspective" or "orthographic".
    #[serde(default = "default_projection")]
    pub projection: String,
    #[serde(default = "default_ortho_height")]
    pub ortho_height: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,

    // Controller feel.
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_cam_position(),
            target: default_cam_target(),
            up: default_cam_up(),
            fov: default_fov(),
            projection: default_projection(),
            ortho_height: default_ortho_height(),
            near: default_near(),
            far: default_far(),
            speed: default_speed(),
            sensitivity: default_sensitivity(),
            zoom_speed: default_zoom_speed(),
        }
    }
}

fn default_cam_position() -> [f32; 3] {
    [2.0, 2.0, 6.0]
}
fn default_cam_target() -> [f32; 3] {
    [0.0, 0.5, 0.0]
}
fn default_cam_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    45.0
}
fn default_projection() -> String {
    "perspective".to_string()
}
fn default_ortho_height() -> f32 {
    10.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    100.0
}
fn default_speed() -> f32 {
    3.0
}
fn default_sensitivity() -> f32 {
    0.004
}
fn default_zoom_speed() -> f32 {
    0.08
}

/// Global ambient term: `ambientColor` and the scalar `ambient` intensity
/// pushed to the shader once at startup.
#[derive(Debug, Deserialize)]
pub struct AmbientConfig {
    #[serde(default = "default_ambient_color")]
    pub color: [u8; 3],
    #[serde(default = "default_ambient_intensity")]
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: default_ambient_color(),
            intensity: default_ambient_intensity(),
        }
    }
}

fn default_ambient_color() -> [u8; 3] {
    [26, 32, 135]
}
fn default_ambient_intensity() -> f32 {
    0.02
}

#[derive(Debug, Deserialize)]
pub struct GroundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ground_size")]
    pub size: f32,
    pub albedo: Option<[f32; 3]>,
    pub metallic: Option<f32>,
    pub roughness: Option<f32>,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: default_ground_size(),
            albedo: Some([0.5, 0.5, 0.5]),
            metallic: Some(0.0),
            roughness: Some(0.8),
        }
    }
}

fn default_ground_size() -> f32 {
    10.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct LightConfig {
    /// "directional", "point" or "spot".
    pub kind: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    /// 8-bit RGBA.
    pub color: [u8; 4],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_intensity() -> f32 {
    1.0
}

fn default_lights() -> Vec<LightConfig> {
    let point = |position: [f32; 3], color: [u8; 4]| LightConfig {
        kind: "point".to_string(),
        position,
        target: [0.0, 0.0, 0.0],
        color,
        intensity: 4.0,
        enabled: true,
    };
    vec![
        point([-1.0, 1.0, -2.0], [255, 255, 0, 255]),
        point([2.0, 1.0, 1.0], [0, 255, 0, 255]),
        point([-2.0, 1.0, 1.0], [255, 0, 0, 255]),
        point([1.0, 1.0, -2.0], [0, 0, 255, 255]),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObjectConfig {
    pub path: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler rotation in degrees, applied X then Y then Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    pub albedo: Option<[f32; 3]>,
    pub metallic: Option<f32>,
    pub roughness: Option<f32>,
    pub ao: Option<f32>,
    pub emissive: Option<[f32; 3]>,
    #[serde(default = "default_emissive_intensity")]
    pub emissive_intensity: f32,

    pub albedo_texture: Option<String>,
    pub normal_texture: Option<String>,
    pub mra_texture: Option<String>,
    pub emissive_texture: Option<String>,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_emissive_intensity() -> f32 {
    1.0
}

fn default_objects() -> Vec<ObjectConfig> {
    vec![ObjectConfig {
        path: "assets/scene.obj".to_string(),
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
        albedo: None,
        metallic: None,
        roughness: None,
        ao: None,
        emissive: None,
        emissive_intensity: 1.0,
        albedo_texture: None,
        normal_texture: None,
        mra_texture: None,
        emissive_texture: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_full_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render.width, 1280);
        assert_eq!(config.lights.len(), 4);
        assert_eq!(config.lights[0].color, [255, 255, 0, 255]);
        assert!(config.ground.enabled);
    }

    #[test]
    fn lights_parse_with_partial_fields() {
        let config: Config = toml::from_str(
            r#"
            [[lights]]
            kind = "directional"
            target = [0.0, -1.0, 0.0]
            color = [255, 255, 255, 255]
            "#,
        )
        .unwrap();
        assert_eq!(config.lights.len(), 1);
        let light = &config.lights[0];
        assert_eq!(light.kind, "directional");
        assert_eq!(light.position, [0.0, 0.0, 0.0]);
        assert_eq!(light.intensity, 1.0);
        assert!(light.enabled);
    }

    #[test]
    fn bad_toml_is_an_error_not_a_panic() {
        let result: Result<Config, _> = toml::from_str("render = 3");
        assert!(result.is_err());
    }
}
