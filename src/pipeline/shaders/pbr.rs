use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::pipeline::program::ShaderProgram;
use crate::scene::light::MAX_LIGHTS;
use crate::scene::material::PbrMaterial;
use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};
use std::f32::consts::PI;
use std::ops::{Add, Mul};

// Wire values of the lights[i].type uniform.
const LIGHT_DIRECTIONAL: i32 = 0;
const LIGHT_POINT: i32 = 1;
const LIGHT_SPOT: i32 = 2;

// Point/spot distance falloff: 1 / (kc + kl*d + kq*d^2).
const ATTENUATION: (f32, f32, f32) = (1.0, 0.09, 0.032);

// Spot cone, cosines of the inner and outer half-angles.
const SPOT_INNER_COS: f32 = 0.94;
const SPOT_OUTER_COS: f32 = 0.86;

/// One light as the fragment stage sees it, decoded from the uniform array.
#[derive(Debug, Clone, Copy)]
struct ShaderLight {
    enabled: bool,
    kind: i32,
    position: Vector3<f32>,
    target: Vector3<f32>,
    color: Vector3<f32>,
    intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PbrVarying {
    pub world_pos: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Vector3<f32>,
    pub texcoord: Vector2<f32>,
}

impl Add for PbrVarying {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            world_pos: self.world_pos + rhs.world_pos,
            normal: self.normal + rhs.normal,
            tangent: self.tangent + rhs.tangent,
            texcoord: self.texcoord + rhs.texcoord,
        }
    }
}

impl Mul<f32> for PbrVarying {
    type Output = Self;
    fn mul(self, s: f32) -> Self {
        Self {
            world_pos: self.world_pos * s,
            normal: self.normal * s,
            tangent: self.tangent * s,
            texcoord: self.texcoord * s,
        }
    }
}

impl Interpolatable for PbrVarying {}

/// Cook-Torrance metallic-roughness shader.
///
/// Construction snapshots the program's uniform state (lights, camera
/// position, ambient term, texture toggles), the same way a GPU latches
/// uniforms at draw-call time; later uniform writes only affect later draws.
pub struct PbrShader {
    mvp: Matrix4<f32>,
    model: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,

    view_pos: Vector3<f32>,
    ambient: Vector3<f32>,
    lights: [ShaderLight; MAX_LIGHTS],
    light_count: usize,

    use_tex_albedo: bool,
    use_tex_normal: bool,
    use_tex_mra: bool,
    use_tex_emissive: bool,
}

impl PbrShader {
    pub fn new(
        program: &ShaderProgram,
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        proj: &Matrix4<f32>,
    ) -> Self {
        let normal_matrix = model
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix3::identity);

        let light_count = (program.int(program.location("numOfLights")).max(0) as usize)
            .min(MAX_LIGHTS);
        let mut lights = [ShaderLight {
            enabled: false,
            kind: LIGHT_DIRECTIONAL,
            position: Vector3::zeros(),
            target: Vector3::zeros(),
            color: Vector3::zeros(),
            intensity: 0.0,
        }; MAX_LIGHTS];
        for (slot, light) in lights.iter_mut().enumerate().take(light_count) {
            let field = |name: &str| program.location(&format!("lights[{slot}].{name}"));
            let color: Vector4<f32> = program.vec4(field("color"));
            *light = ShaderLight {
                enabled: program.int(field("enabled")) != 0,
                kind: program.int(field("type")),
                position: program.vec3(field("position")),
                target: program.vec3(field("target")),
                color: color.xyz(),
                intensity: program.float(field("intensity")),
            };
        }

        let ambient_color = program.vec3(program.location("ambientColor"));
        let ambient_intensity = program.float(program.location("ambient"));

        Self {
            mvp: proj * view * model,
            model: *model,
            normal_matrix,
            view_pos: program.vec3(program.location("viewPos")),
            ambient: ambient_color * ambient_intensity,
            lights,
            light_count,
            use_tex_albedo: program.int(program.location("useTexAlbedo")) != 0,
            use_tex_normal: program.int(program.location("useTexNormal")) != 0,
            use_tex_mra: program.int(program.location("useTexMRA")) != 0,
            use_tex_emissive: program.int(program.location("useTexEmissive")) != 0,
        }
    }

    /// Shading normal: the interpolated geometric normal, perturbed by the
    /// normal map through the TBN basis when one is bound.
    fn shading_normal(&self, varying: &PbrVarying, material: &PbrMaterial) -> Vector3<f32> {
        let n = varying.normal.normalize();
        if !self.use_tex_normal {
            return n;
        }
        let Some(map) = &material.normal_texture else {
            return n;
        };

        let mut t = varying.tangent;
        t -= n * n.dot(&t);
        if t.norm() < 1e-6 {
            return n;
        }
        let t = t.normalize();
        let b = n.cross(&t);

        let sample = map.sample_data(varying.texcoord.x, varying.texcoord.y) * 2.0
            - Vector3::new(1.0, 1.0, 1.0);
        (t * sample.x + b * sample.y + n * sample.z).normalize()
    }

    /// Direction to the light and incoming radiance at `point`. Returns
    /// `None` for fragments the light cannot reach.
    fn incident(
        &self,
        light: &ShaderLight,
        point: &Vector3<f32>,
    ) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let base = light.color * light.intensity;
        match light.kind {
            LIGHT_DIRECTIONAL => {
                let travel = light.target - light.position;
                if travel.norm() < 1e-6 {
                    return None;
                }
                Some((-travel.normalize(), base))
            }
            LIGHT_POINT | LIGHT_SPOT => {
                let to_light = light.position - point;
                let distance = to_light.norm();
                if distance < 1e-6 {
                    return None;
                }
                let l = to_light / distance;

                let (kc, kl, kq) = ATTENUATION;
                let mut radiance = base / (kc + kl * distance + kq * distance * distance);

                if light.kind == LIGHT_SPOT {
                    let axis = (light.target - light.position).normalize();
                    let cos_angle = (-l).dot(&axis);
                    let falloff = ((cos_angle - SPOT_OUTER_COS)
                        / (SPOT_INNER_COS - SPOT_OUTER_COS))
                        .clamp(0.0, 1.0);
                    if falloff <= 0.0 {
                        return None;
                    }
                    radiance *= falloff;
                }
                Some((l, radiance))
            }
            _ => None,
        }
    }
}

impl Shader for PbrShader {
    type Varying = PbrVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, PbrVarying) {
        let clip = self.mvp * vertex.position.to_homogeneous();
        let world = self.model * vertex.position.to_homogeneous();
        let varying = PbrVarying {
            world_pos: world.xyz(),
            normal: self.normal_matrix * vertex.normal,
            tangent: self.normal_matrix * vertex.tangent,
            texcoord: vertex.texcoord,
        };
        (clip, varying)
    }

    fn fragment(&self, varying: PbrVarying, material: Option<&PbrMaterial>) -> Vector3<f32> {
        let fallback = PbrMaterial::default();
        let material = material.unwrap_or(&fallback);
        let (u, v) = (varying.texcoord.x, varying.texcoord.y);

        let mut albedo = material.albedo;
        if self.use_tex_albedo
            && let Some(map) = &material.albedo_texture
        {
            albedo = albedo.component_mul(&map.sample_color(u, v));
        }

        // ORM packing: R = occlusion, G = roughness, B = metallic.
        let (mut ao, mut roughness, mut metallic) =
            (material.ao, material.roughness, material.metallic);
        if self.use_tex_mra
            && let Some(map) = &material.mra_texture
        {
            let mra = map.sample_data(u, v);
            ao *= mra.x;
            roughness *= mra.y;
            metallic *= mra.z;
        }
        let roughness = roughness.clamp(0.04, 1.0);
        let metallic = metallic.clamp(0.0, 1.0);

        let n = self.shading_normal(&varying, material);
        let view = self.view_pos - varying.world_pos;
        if view.norm() < 1e-6 {
            return albedo;
        }
        let v_dir = view.normalize();

        // Base reflectance: 4% for dielectrics, tinted albedo for metals.
        let f0 = Vector3::new(0.04, 0.04, 0.04).lerp(&albedo, metallic);

        let mut radiance_out = Vector3::zeros();
        for light in self.lights.iter().take(self.light_count) {
            if !light.enabled {
                continue;
            }
            let Some((l, radiance)) = self.incident(light, &varying.world_pos) else {
                continue;
            };

            let n_dot_l = n.dot(&l).max(0.0);
            if n_dot_l <= 0.0 {
                continue;
            }
            let h = (v_dir + l).normalize();
            let n_dot_v = n.dot(&v_dir).max(1e-4);

            let d = distribution_ggx(n.dot(&h).max(0.0), roughness);
            let g = geometry_smith(n_dot_v, n_dot_l, roughness);
            let f = fresnel_schlick(h.dot(&v_dir).max(0.0), f0);

            let specular = f * (d * g / (4.0 * n_dot_v * n_dot_l));
            let k_d = (Vector3::new(1.0, 1.0, 1.0) - f) * (1.0 - metallic);
            let diffuse = k_d.component_mul(&albedo) / PI;

            radiance_out += (diffuse + specular).component_mul(&radiance) * n_dot_l;
        }

        let mut color = radiance_out + self.ambient.component_mul(&albedo) * ao;

        let mut emissive = material.emissive;
        if self.use_tex_emissive
            && let Some(map) = &material.emissive_texture
        {
            emissive = emissive.component_mul(&map.sample_color(u, v));
        }
        color += emissive;

        color
    }
}

/// GGX/Trowbridge-Reitz normal distribution.
fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a2 = (roughness * roughness).powi(2);
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom).max(1e-8)
}

fn geometry_schlick_ggx(n_dot_x: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = r * r / 8.0;
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

/// Smith masking-shadowing, split into view and light terms.
fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness)
}

fn fresnel_schlick(cos_theta: f32, f0: Vector3<f32>) -> Vector3<f32> {
    let white = Vector3::new(1.0, 1.0, 1.0);
    f0 + (white - f0) * (1.0 - cos_theta).clamp(0.0, 1.0).powi(5)
}
