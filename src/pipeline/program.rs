use crate::scene::light::MAX_LIGHTS;
use log::debug;
use nalgebra::{Vector3, Vector4};
use std::collections::HashMap;

/// Opaque handle to a uniform slot of a `ShaderProgram`.
///
/// Resolved by name once (the lookup is the expensive part) and cached by
/// callers for the lifetime of the program. The invalid handle is what a
/// failed lookup returns; writing through it is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(i32);

impl Default for UniformLocation {
    fn default() -> Self {
        Self::INVALID
    }
}

impl UniformLocation {
    pub const INVALID: UniformLocation = UniformLocation(-1);

    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

/// A value latched into a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
}

/// Software stand-in for a compiled shader program: a fixed set of named
/// uniform slots. Shaders read the latched values at draw time; everything
/// else in the renderer talks to the program only through `location` and
/// `set_value`, so the uniform names form a bit-exact protocol — renaming a
/// uniform on either side silently turns the binding into a no-op.
pub struct ShaderProgram {
    locations: HashMap<String, i32>,
    values: Vec<Option<UniformValue>>,
}

impl ShaderProgram {
    pub fn with_uniforms<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut locations = HashMap::new();
        let mut count = 0;
        for name in names {
            locations.entry(name.into()).or_insert_with(|| {
                count += 1;
                count - 1
            });
        }
        Self {
            locations,
            values: vec![None; count as usize],
        }
    }

    /// The PBR program, declaring the uniform contract the light registry
    /// and the shader agree on: `lights[i].<field>` for every slot, the
    /// light count, camera position, ambient term, and per-material texture
    /// toggles.
    pub fn pbr() -> Self {
        let mut names: Vec<String> = Vec::new();
        for i in 0..MAX_LIGHTS {
            for field in ["enabled", "type", "position", "target", "color", "intensity"] {
                names.push(format!("lights[{i}].{field}"));
            }
        }
        for name in [
            "numOfLights",
            "viewPos",
            "ambientColor",
            "ambient",
            "useTexAlbedo",
            "useTexNormal",
            "useTexMRA",
            "useTexEmissive",
        ] {
            names.push(name.to_string());
        }
        Self::with_uniforms(names)
    }

    /// Resolves a uniform name to its location. Unknown names yield the
    /// invalid location; the failure is logged but not reported further.
    pub fn location(&self, name: &str) -> UniformLocation {
        match self.locations.get(name) {
            Some(&idx) => UniformLocation(idx),
            None => {
                debug!("uniform '{name}' is not active in this program");
                UniformLocation::INVALID
            }
        }
    }

    /// Latches a value into a slot. Writes through the invalid location (or
    /// any stale out-of-range handle) are dropped without error.
    pub fn set_value(&mut self, location: UniformLocation, value: UniformValue) {
        if !location.is_valid() {
            return;
        }
        if let Some(slot) = self.values.get_mut(location.0 as usize) {
            *slot = Some(value);
        }
    }

    /// Convenience for `set_value(location(name), ..)`; per-frame callers
    /// should resolve once and reuse the location instead.
    pub fn set_by_name(&mut self, name: &str, value: UniformValue) {
        let location = self.location(name);
        self.set_value(location, value);
    }

    pub fn value(&self, location: UniformLocation) -> Option<UniformValue> {
        if !location.is_valid() {
            return None;
        }
        self.values.get(location.0 as usize).copied().flatten()
    }

    // Typed readback with zero defaults for slots never written. Used by the
    // shaders when latching uniform state at draw time.

    pub fn int(&self, location: UniformLocation) -> i32 {
        match self.value(location) {
            Some(UniformValue::Int(v)) => v,
            _ => 0,
        }
    }

    pub fn float(&self, location: UniformLocation) -> f32 {
        match self.value(location) {
            Some(UniformValue::Float(v)) => v,
            _ => 0.0,
        }
    }

    pub fn vec3(&self, location: UniformLocation) -> Vector3<f32> {
        match self.value(location) {
            Some(UniformValue::Vec3(v)) => v,
            _ => Vector3::zeros(),
        }
    }

    pub fn vec4(&self, location: UniformLocation) -> Vector4<f32> {
        match self.value(location) {
            Some(UniformValue::Vec4(v)) => v,
            _ => Vector4::zeros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve_unknown_names_do_not() {
        let program = ShaderProgram::pbr();
        assert!(program.location("lights[0].enabled").is_valid());
        assert!(program.location("lights[3].intensity").is_valid());
        assert!(program.location("numOfLights").is_valid());
        assert!(program.location("useTexMRA").is_valid());
        // One slot past the fixed array, and a typo'd field.
        assert!(!program.location("lights[4].enabled").is_valid());
        assert!(!program.location("lights[0].colour").is_valid());
    }

    #[test]
    fn write_through_invalid_location_is_a_no_op() {
        let mut program = ShaderProgram::pbr();
        let bogus = program.location("doesNotExist");
        program.set_value(bogus, UniformValue::Float(42.0));
        assert_eq!(program.float(bogus), 0.0);

        let real = program.location("ambient");
        program.set_value(real, UniformValue::Float(0.02));
        assert_eq!(program.float(real), 0.02);
    }

    #[test]
    fn latched_values_read_back() {
        let mut program = ShaderProgram::pbr();
        let pos = program.location("lights[1].position");
        program.set_value(pos, UniformValue::Vec3(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(program.vec3(pos), Vector3::new(1.0, 2.0, 3.0));

        let color = program.location("lights[1].color");
        program.set_value(color, UniformValue::Vec4(Vector4::new(1.0, 1.0, 0.0, 1.0)));
        assert_eq!(program.vec4(color), Vector4::new(1.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn unwritten_slots_read_as_zero() {
        let program = ShaderProgram::pbr();
        assert_eq!(program.int(program.location("lights[2].enabled")), 0);
        assert_eq!(program.vec3(program.location("viewPos")), Vector3::zeros());
    }
}
