use crate::core::color::Color;
use crate::pipeline::program::{ShaderProgram, UniformLocation, UniformValue};
use log::warn;
use nalgebra::{Vector3, Vector4};

/// Hard cap on dynamic lights. The shader's light array has the same bound,
/// and `LightRig::new` pushes it to the `numOfLights` uniform so the shading
/// loop and the registry always agree.
pub const MAX_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

impl LightKind {
    /// Wire value written to the `lights[i].type` uniform.
    pub fn shader_value(self) -> i32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }
}

/// Uniform handles for one light slot, resolved once at creation against
/// `lights[<slot>].<field>` and never reassigned afterwards. Handle validity
/// is therefore tied 1:1 to the slot index.
#[derive(Debug, Clone, Copy, Default)]
struct SlotLocations {
    enabled: UniformLocation,
    kind: UniformLocation,
    position: UniformLocation,
    target: UniformLocation,
    color: UniformLocation,
    intensity: UniformLocation,
}

impl SlotLocations {
    fn resolve(program: &ShaderProgram, slot: usize) -> Self {
        let field = |name: &str| program.location(&format!("lights[{slot}].{name}"));
        Self {
            enabled: field("enabled"),
            kind: field("type"),
            position: field("position"),
            target: field("target"),
            color: field("color"),
            intensity: field("intensity"),
        }
    }
}

/// One dynamic light. Mutating a field has no effect on shading until the
/// owner pushes the record back with [`LightRig::sync`]; there is no dirty
/// tracking.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub kind: LightKind,
    /// Disabled lights are forced off in the shader and drawn as wireframe
    /// indicator gizmos instead of solid ones.
    pub enabled: bool,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    /// Normalized RGBA, each channel the 8-bit input divided by 255.
    pub color: Vector4<f32>,
    pub intensity: f32,
    locations: SlotLocations,
}

impl Light {
    /// The zero-valued record handed out when the registry is full. Its
    /// handles are invalid, so syncing it never touches the shader.
    fn zeroed() -> Self {
        Self {
            kind: LightKind::default(),
            enabled: false,
            position: Vector3::zeros(),
            target: Vector3::zeros(),
            color: Vector4::zeros(),
            intensity: 0.0,
            locations: SlotLocations::default(),
        }
    }
}

/// Fixed-capacity registry of dynamic lights bound to one shader program.
///
/// Slots are assigned in creation order and live as long as the program;
/// lights are never destroyed individually. The registry is deliberately
/// forgiving at the edges: creating past the cap is a logged no-op that
/// returns a disabled record, mirroring the hard array bound on the shader
/// side.
pub struct LightRig {
    lights: Vec<Light>,
}

impl LightRig {
    /// Creates an empty rig and pushes the shader-side loop bound once.
    pub fn new(program: &mut ShaderProgram) -> Self {
        program.set_by_name("numOfLights", UniformValue::Int(MAX_LIGHTS as i32));
        Self {
            lights: Vec::with_capacity(MAX_LIGHTS),
        }
    }

    /// Number of lights created so far.
    pub fn count(&self) -> usize {
        self.lights.len()
    }

    /// Lights in creation order (the render loop draws one indicator gizmo
    /// per entry, in this order).
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    /// Allocates the next slot, resolves its six uniform handles, pushes the
    /// initial state to the shader, and returns the new record (also kept in
    /// the rig). When the rig is full the shader and the count are left
    /// untouched and a zeroed, disabled light comes back instead.
    pub fn create(
        &mut self,
        kind: LightKind,
        position: Vector3<f32>,
        target: Vector3<f32>,
        color: Color,
        intensity: f32,
        program: &mut ShaderProgram,
    ) -> Light {
        if self.lights.len() >= MAX_LIGHTS {
            warn!("light capacity ({MAX_LIGHTS}) reached, extra light ignored");
            return Light::zeroed();
        }

        let slot = self.lights.len();
        let light = Light {
            kind,
            enabled: true,
            position,
            target,
            color: color.normalized(),
            intensity,
            locations: SlotLocations::resolve(program, slot),
        };
        Self::sync(program, &light);
        self.lights.push(light);
        light
    }

    /// Pushes every field of `light` to its cached uniform handles. Safe to
    /// call any number of times; this is the only way mutations made after
    /// creation reach the shader.
    pub fn sync(program: &mut ShaderProgram, light: &Light) {
        let locations = &light.locations;
        program.set_value(locations.enabled, UniformValue::Int(light.enabled as i32));
        program.set_value(locations.kind, UniformValue::Int(light.kind.shader_value()));
        program.set_value(locations.position, UniformValue::Vec3(light.position));
        program.set_value(locations.target, UniformValue::Vec3(light.target));
        program.set_value(locations.color, UniformValue::Vec4(light.color));
        program.set_value(locations.intensity, UniformValue::Float(light.intensity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_at(x: f32, color: Color, program: &mut ShaderProgram, rig: &mut LightRig) -> Light {
        rig.create(
            LightKind::Point,
            Vector3::new(x, 1.0, 0.0),
            Vector3::zeros(),
            color,
            4.0,
            program,
        )
    }

    #[test]
    fn create_assigns_slots_and_normalizes_color() {
        let mut program = ShaderProgram::pbr();
        let mut rig = LightRig::new(&mut program);

        let light = point_at(-1.0, Color::new(255, 128, 0, 255), &mut program, &mut rig);
        assert_eq!(rig.count(), 1);
        assert!(light.enabled);
        assert_eq!(light.color.x, 1.0);
        assert!((light.color.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(light.color.z, 0.0);
        assert_eq!(light.color.w, 1.0);

        // The slot's uniforms hold the pushed state.
        assert_eq!(program.int(program.location("lights[0].enabled")), 1);
        assert_eq!(program.int(program.location("lights[0].type")), 1);
        assert_eq!(
            program.vec3(program.location("lights[0].position")),
            Vector3::new(-1.0, 1.0, 0.0)
        );
        assert_eq!(program.float(program.location("lights[0].intensity")), 4.0);
    }

    #[test]
    fn rig_pushes_num_of_lights_once_at_startup() {
        let mut program = ShaderProgram::pbr();
        let _rig = LightRig::new(&mut program);
        assert_eq!(program.int(program.location("numOfLights")), MAX_LIGHTS as i32);
    }

    #[test]
    fn create_past_capacity_is_a_silent_no_op() {
        let mut program = ShaderProgram::pbr();
        let mut rig = LightRig::new(&mut program);

        for i in 0..MAX_LIGHTS {
            point_at(i as f32, Color::WHITE, &mut program, &mut rig);
        }
        assert_eq!(rig.count(), MAX_LIGHTS);

        let extra = point_at(99.0, Color::RED, &mut program, &mut rig);
        assert_eq!(rig.count(), MAX_LIGHTS);
        assert!(!extra.enabled);
        assert_eq!(extra.intensity, 0.0);
        assert_eq!(extra.color, Vector4::zeros());

        // The last real slot is untouched by the overflowing create.
        assert_eq!(program.int(program.location("lights[3].enabled")), 1);
        assert_eq!(
            program.vec3(program.location("lights[3].position")),
            Vector3::new(3.0, 1.0, 0.0)
        );
    }

    #[test]
    fn syncing_the_overflow_light_never_touches_the_shader() {
        let mut program = ShaderProgram::pbr();
        let mut rig = LightRig::new(&mut program);
        for i in 0..MAX_LIGHTS {
            point_at(i as f32, Color::WHITE, &mut program, &mut rig);
        }

        let mut extra = point_at(99.0, Color::RED, &mut program, &mut rig);
        extra.enabled = true;
        extra.intensity = 100.0;
        LightRig::sync(&mut program, &extra);

        for i in 0..MAX_LIGHTS {
            let loc = program.location(&format!("lights[{i}].intensity"));
            assert_eq!(program.float(loc), 4.0);
        }
    }

    #[test]
    fn sync_propagates_mutations_and_is_idempotent() {
        let mut program = ShaderProgram::pbr();
        let mut rig = LightRig::new(&mut program);
        let mut light = point_at(0.0, Color::GREEN, &mut program, &mut rig);

        light.enabled = false;
        light.position = Vector3::new(5.0, 5.0, 5.0);
        // Not synced yet: the shader still sees the creation state.
        assert_eq!(program.int(program.location("lights[0].enabled")), 1);

        LightRig::sync(&mut program, &light);
        assert_eq!(program.int(program.location("lights[0].enabled")), 0);
        assert_eq!(
            program.vec3(program.location("lights[0].position")),
            Vector3::new(5.0, 5.0, 5.0)
        );

        // Second sync with unchanged fields leaves identical uniform state.
        let before: Vec<_> = ["enabled", "type", "position", "target", "color", "intensity"]
            .iter()
            .map(|f| program.value(program.location(&format!("lights[0].{f}"))))
            .collect();
        LightRig::sync(&mut program, &light);
        let after: Vec<_> = ["enabled", "type", "position", "target", "color", "intensity"]
            .iter()
            .map(|f| program.value(program.location(&format!("lights[0].{f}"))))
            .collect();
        assert_eq!(before, after);
    }
}
